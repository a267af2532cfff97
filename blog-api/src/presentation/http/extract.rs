use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::validation::{
    LabeledFields, format_validation_errors, invalid_request_message,
};

/// JSON body that has been deserialized and passed its `validator` rules.
///
/// Binding failures and rule violations both reject with `INVALID_PARAMETER`;
/// the message is localized with the locale held in [`AppState`].
#[derive(Debug)]
pub(crate) struct ValidatedJson<T>(pub(crate) T);

impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + LabeledFields + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection, "request body rejected");
                AppError::InvalidParameter(invalid_request_message(state.locale).to_string())
            })?;

        value.validate().map_err(|errors| {
            AppError::InvalidParameter(format_validation_errors(
                &errors,
                T::FIELD_LABELS,
                state.locale,
            ))
        })?;

        Ok(Self(value))
    }
}

/// Numeric `{id}` path segment; a non-numeric segment is an invalid parameter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IdPath(pub(crate) i64);

impl FromRequestParts<AppState> for IdPath {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection, "path parameter rejected");
                AppError::InvalidParameter(invalid_request_message(state.locale).to_string())
            })?;
        Ok(Self(id))
    }
}
