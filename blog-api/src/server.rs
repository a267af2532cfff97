use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::AppState;
use crate::presentation::http::middleware::cors::build_cors_layer;
use crate::presentation::http::middleware::logging::request_logging_middleware;
use crate::presentation::http::middleware::recovery::panic_recovery_middleware;
use crate::presentation::http::openapi::ApiDoc;
use crate::presentation::http::routes;

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let cors = build_cors_layer(&settings.cors_origins)?;
    let app = build_router(state, cors);

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!(addr = %settings.http_addr, "HTTP server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Request path: cors → logging → recovery → (auth) → handler.
pub(crate) fn build_router(state: AppState, cors: CorsLayer) -> Router {
    routes::router(state.clone())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(middleware::from_fn(panic_recovery_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_logging_middleware,
        ))
        .layer(cors)
        .with_state(state)
}
