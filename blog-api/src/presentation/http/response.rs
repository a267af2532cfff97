use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};

pub(crate) const SUCCESS_CODE: i32 = 0;
const DEFAULT_SUCCESS_MSG: &str = "success";

/// Application-level failure codes carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum ErrorCode {
    InvalidParameter = 1001,
    SystemError = 1002,
    OtherError = 1003,
    AuthError = 2001,
    PostError = 2002,
    CommentError = 2003,
}

impl ErrorCode {
    pub(crate) fn as_i32(self) -> i32 {
        self as i32
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// Uniform `{code, msg, data}` body. HTTP status is always 200; failure is
/// signalled by `code != 0`.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) code: i32,
    pub(crate) msg: String,
    pub(crate) data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn success(data: T, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self {
            code: SUCCESS_CODE,
            msg: if msg.is_empty() {
                DEFAULT_SUCCESS_MSG.to_string()
            } else {
                msg
            },
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub(crate) fn fail(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code: code.as_i32(),
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ApiResponse, ErrorCode};

    #[test]
    fn success_defaults_message() {
        let body = serde_json::to_value(ApiResponse::success(json!({"id": 1}), ""))
            .expect("serializable");
        assert_eq!(body, json!({"code": 0, "msg": "success", "data": {"id": 1}}));
    }

    #[test]
    fn fail_carries_code_and_null_data() {
        let body = serde_json::to_value(ApiResponse::fail(ErrorCode::PostError, "post not found"))
            .expect("serializable");
        assert_eq!(body, json!({"code": 2002, "msg": "post not found", "data": null}));
    }

    #[test]
    fn error_codes_match_taxonomy() {
        let codes = [
            (ErrorCode::InvalidParameter, 1001),
            (ErrorCode::SystemError, 1002),
            (ErrorCode::OtherError, 1003),
            (ErrorCode::AuthError, 2001),
            (ErrorCode::PostError, 2002),
            (ErrorCode::CommentError, 2003),
        ];
        for (code, expected) in codes {
            assert_eq!(code.as_i32(), expected);
        }
    }
}
