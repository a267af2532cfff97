use serde::Serialize;
use utoipa::ToSchema;

use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::response::ApiResponse;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthDto {
    pub(crate) status: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Plain-text greeting", body = String)
    )
)]
pub(crate) async fn hello() -> &'static str {
    "hello world"
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "system",
    responses(
        (status = 200, description = "Envelope; code 0 while the process serves requests", body = HealthDto)
    )
)]
pub(crate) async fn healthz() -> ApiResponse<HealthDto> {
    let health = HealthDto {
        status: "ok".to_string(),
    };
    ApiResponse::success(health, "")
}

/// Envelope for paths no route matches.
pub(crate) async fn route_not_found() -> AppResult<()> {
    Err(AppError::RouteNotFound)
}
