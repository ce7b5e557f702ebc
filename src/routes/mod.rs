use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth_handler, log_handler, scheduler_handler, url_handler};
use crate::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth_handler::register))
        .route("/login", post(auth_handler::login))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(url_handler::create_url).get(url_handler::list_urls))
        .route(
            "/urls/:id",
            put(url_handler::update_url).delete(url_handler::delete_url),
        )
        .route("/logs/:id", get(log_handler::list_logs))
        .route("/scheduler/disable", post(scheduler_handler::disable_scheduler))
        .route("/scheduler/enable", post(scheduler_handler::enable_scheduler))
        .route("/scheduler/run/:interval", post(scheduler_handler::run_batch_now))
}
