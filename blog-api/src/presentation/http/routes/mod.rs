use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::system::{healthz, hello, route_not_found};

pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(hello))
        .route("/healthz", get(healthz))
        .nest("/auth", auth::router())
        .nest("/post", posts::router(state.clone()))
        .nest("/comment", comments::router(state))
        .fallback(route_not_found)
}
