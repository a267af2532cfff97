use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

const MISSING_TOKEN: &str = "missing authorization token";
const INVALID_FORMAT: &str = "invalid token format (expected Bearer <token>)";
const INVALID_TOKEN: &str = "invalid token";
const NOT_LOGGED_IN: &str = "user not logged in";

/// Identity bound by [`jwt_auth_middleware`] from the verified token.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized(NOT_LOGGED_IN))
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized(MISSING_TOKEN))?;
    if auth_header.is_empty() {
        return Err(AppError::Unauthorized(MISSING_TOKEN));
    }

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized(INVALID_FORMAT))?;

    let claims = state.jwt.verify_token(token).map_err(|err| {
        warn!(error = %err, "token verification failed");
        AppError::Unauthorized(INVALID_TOKEN)
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
    });

    Ok(next.run(request).await)
}
