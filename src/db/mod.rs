pub mod check_log_repository;
pub mod url_repository;
pub mod user_repository;
