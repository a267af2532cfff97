use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::error;

use super::logging::client_ip;
use crate::infrastructure::logging::take_panic_trace;
use crate::presentation::http::response::{ApiResponse, ErrorCode};

const SYSTEM_ERROR_MSG: &str = "system error";

/// Turns a panic anywhere downstream into a `SYSTEM_ERROR` envelope.
pub(crate) async fn panic_recovery_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let (parts, body) = request.into_parts();
    let client = client_ip(&parts);
    let request = Request::from_parts(parts, body);

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let stack = take_panic_trace().unwrap_or_default();
            error!(
                panic = %panic_message(payload.as_ref()),
                method = %method,
                path = %path,
                client_ip = %client,
                stack = %stack,
                "request handler panicked"
            );
            ApiResponse::fail(ErrorCode::SystemError, SYSTEM_ERROR_MSG).into_response()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::{Router, middleware};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{panic_message, panic_recovery_middleware};
    use crate::infrastructure::logging::{
        MAX_STACK_TRACE_BYTES, install_panic_hook, take_panic_trace,
    };
    use crate::presentation::test_support::CapturedLogs;

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    fn app() -> Router {
        Router::new()
            .route("/boom", get(boom))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(panic_recovery_middleware))
    }

    async fn body_text(app: &Router, uri: &str) -> String {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible");
        assert_eq!(response.status(), 200);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn panic_becomes_system_error_and_service_keeps_running() {
        install_panic_hook();
        let (logs, _guard) = CapturedLogs::install();
        let app = app();

        let json: Value = serde_json::from_str(&body_text(&app, "/boom").await).expect("envelope");
        assert_eq!(json["code"], 1002);
        assert_eq!(json["msg"], "system error");
        assert!(json["data"].is_null());

        let panics = logs.events("request handler panicked");
        assert_eq!(panics.len(), 1);
        assert_eq!(panics[0]["panic"], "handler exploded");
        assert_eq!(panics[0]["path"], "/boom");
        let stack = panics[0]["stack"].as_str().expect("stack");
        assert!(!stack.is_empty());
        assert!(stack.len() <= MAX_STACK_TRACE_BYTES);
        assert!(take_panic_trace().is_none(), "middleware consumes the trace");

        assert_eq!(body_text(&app, "/ok").await, "fine");

        let again: Value = serde_json::from_str(&body_text(&app, "/boom").await).expect("envelope");
        assert_eq!(again["code"], 1002);
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
