use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::{init_logging, install_panic_hook};
use infrastructure::settings::Settings;
use presentation::AppState;
use server::run_http;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;
    install_panic_hook();

    let pool = create_pool(&settings.database_url, settings.db_max_connections).await?;
    run_migrations(&pool).await?;

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));

    let state = AppState::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresPostRepository::new(pool.clone())),
        Arc::new(PostgresCommentRepository::new(pool)),
        jwt,
        settings.validation_locale,
        settings.http_request_body_limit_bytes,
    );

    info!(locale = ?settings.validation_locale, "application state ready");
    run_http(&settings, state).await
}
