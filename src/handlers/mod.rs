pub mod auth_handler;
pub mod log_handler;
pub mod scheduler_handler;
pub mod url_handler;
