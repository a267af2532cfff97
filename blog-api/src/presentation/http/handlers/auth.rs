use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::infrastructure::settings::Locale;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::ValidatedJson;
use crate::presentation::http::response::ApiResponse;
use crate::presentation::http::validation::{FieldLabel, LabeledFields, required, trimmed};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct RegisterDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "required"), length(min = 3, max = 20))]
    pub(crate) username: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "required"), email)]
    pub(crate) email: String,
    #[validate(custom(function = "required"), length(min = 6))]
    pub(crate) password: String,
    #[validate(
        custom(function = "required"),
        length(min = 6),
        must_match(other = "password")
    )]
    pub(crate) repeat_password: String,
}

impl LabeledFields for RegisterDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[
        FieldLabel::labeled("username", &[(Locale::Zh, "用户名")]),
        FieldLabel::labeled("email", &[(Locale::Zh, "邮箱")]),
        FieldLabel::labeled("password", &[(Locale::Zh, "密码")]),
        FieldLabel::labeled("repeat_password", &[(Locale::Zh, "确认密码")]).matching("password"),
    ];
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct LoginDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "required"), length(min = 3, max = 20))]
    pub(crate) username: String,
    #[validate(custom(function = "required"), length(min = 6))]
    pub(crate) password: String,
}

impl LabeledFields for LoginDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[
        FieldLabel::labeled("username", &[(Locale::Zh, "用户名")]),
        FieldLabel::labeled("password", &[(Locale::Zh, "密码")]),
    ];
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) username: String,
    pub(crate) token: String,
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            username: result.user.username,
            token: result.access_token,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries the session, 1001 invalid input, 2001 username or email taken", body = AuthResponseDto)
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> AppResult<ApiResponse<AuthResponseDto>> {
    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
        repeat_password: dto.repeat_password,
    };

    let result = state.auth_service.register(req).await?;
    Ok(ApiResponse::success(result.into(), "register success"))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries the session, 2001 invalid username or password", body = AuthResponseDto)
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> AppResult<ApiResponse<AuthResponseDto>> {
    let req = LoginRequest {
        username: dto.username,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;
    Ok(ApiResponse::success(result.into(), ""))
}
