pub mod check_log;
pub mod url;
pub mod user;
