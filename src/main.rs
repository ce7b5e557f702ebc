mod db;
mod handlers;
mod models;
mod routes;
mod services;
mod utils;

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use dotenvy::dotenv;
use sqlx::{migrate::Migrator, mysql::MySqlPoolOptions};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use services::probe;
use services::scheduler::{CheckScheduler, SchedulerConfig};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::MySqlPool,
    pub http: reqwest::Client,
    pub jwt_secret: String,
    pub admin_token: String,
    pub scheduler: Arc<CheckScheduler>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .compact()
        .init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = MySqlPoolOptions::new()
        .max_connections(25)
        .min_connections(5)
        .max_lifetime(Duration::from_secs(5 * 60))
        .connect(&database_url)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations applied. DB is ready.");

    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let admin_token = env::var("SCHEDULER_ADMIN_TOKEN").expect("SCHEDULER_ADMIN_TOKEN must be set");

    let scheduler = Arc::new(CheckScheduler::new(pool.clone(), SchedulerConfig::from_env()));
    // A failure to build the outbound client here is fatal, not retried.
    scheduler.start()?;

    let state = AppState {
        db: pool,
        http: probe::build_client(probe::ON_DEMAND_TIMEOUT)?,
        jwt_secret,
        admin_token,
        scheduler,
    };

    let app = Router::new()
        .nest("/auth", routes::auth_routes())
        .nest("/api", routes::api_routes())
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    tracing::info!("uptrack is listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
