pub mod auth_service;
pub mod checker;
pub mod probe;
pub mod scheduler;
