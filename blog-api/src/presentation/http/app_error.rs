use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info};

use crate::domain::error::{DomainError, Resource};
use crate::presentation::http::response::{ApiResponse, ErrorCode};

const SYSTEM_ERROR_MSG: &str = "system error";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Binding or validation failure, already formatted for the client.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("route not found")]
    RouteNotFound,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn code_and_message(&self) -> (ErrorCode, String) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { field, message } => {
                    (ErrorCode::InvalidParameter, format!("{field} {message}"))
                }
                DomainError::NotFound(Resource::Post) => (ErrorCode::PostError, err.to_string()),
                DomainError::NotFound(Resource::Comment) | DomainError::PostMissing => {
                    (ErrorCode::CommentError, err.to_string())
                }
                DomainError::NotFound(Resource::User)
                | DomainError::AlreadyExists(_)
                | DomainError::InvalidCredentials
                | DomainError::PasswordMismatch => (ErrorCode::AuthError, err.to_string()),
                DomainError::Unexpected(_) => (ErrorCode::SystemError, SYSTEM_ERROR_MSG.to_string()),
            },
            AppError::InvalidParameter(msg) => (ErrorCode::InvalidParameter, msg.clone()),
            AppError::Unauthorized(msg) => (ErrorCode::AuthError, (*msg).to_string()),
            AppError::RouteNotFound => (ErrorCode::OtherError, "route not found".to_string()),
            AppError::Internal(_) => (ErrorCode::SystemError, SYSTEM_ERROR_MSG.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = self.code_and_message();
        match &self {
            AppError::Domain(DomainError::Unexpected(detail)) => {
                error!(code = code.as_i32(), %detail, "unexpected domain error");
            }
            AppError::Internal(err) => {
                error!(code = code.as_i32(), error = ?err, "internal error");
            }
            _ => info!(code = code.as_i32(), error = %self, "request failed"),
        }

        ApiResponse::fail(code, msg).into_response()
    }
}
