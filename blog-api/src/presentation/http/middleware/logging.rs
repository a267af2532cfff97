use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use tracing::info;

use crate::infrastructure::logging::truncate_utf8;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

const BODY_PREVIEW_BYTES: usize = 1024;
const TRUNCATED_SUFFIX: &str = "...(truncated)";
const UNKNOWN_CLIENT: &str = "unknown";

/// Request body as read by the logging middleware, available to handlers.
#[derive(Debug, Clone)]
pub(crate) struct BufferedBody(pub(crate) Bytes);

/// Buffers the request body once, hands an identical copy downstream and
/// writes one access line per request.
pub(crate) async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let (mut parts, body) = request.into_parts();

    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();
    let query = parts.uri.query().unwrap_or_default().to_owned();
    let user_agent = header_str(&parts.headers, header::USER_AGENT.as_str())
        .unwrap_or_default()
        .to_owned();
    let client_ip = client_ip(&parts);

    let (response, preview) = match axum::body::to_bytes(body, state.body_limit_bytes).await {
        Ok(bytes) => {
            let preview = body_preview(&bytes);
            parts.extensions.insert(BufferedBody(bytes.clone()));
            let request = Request::from_parts(parts, Body::from(bytes));
            (next.run(request).await, preview)
        }
        Err(err) => {
            let too_large = err.into_inner().downcast_ref::<LengthLimitError>().is_some();
            let msg = if too_large {
                "request body too large"
            } else {
                "request body could not be read"
            };
            (
                AppError::InvalidParameter(msg.to_string()).into_response(),
                String::new(),
            )
        }
    };

    info!(
        status_code = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        client_ip = %client_ip,
        method = %method,
        path = %path,
        user_agent = %user_agent,
        query = %query,
        body = %preview,
        "request completed"
    );

    response
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the peer address.
pub(crate) fn client_ip(parts: &Parts) -> String {
    let forwarded = header_str(&parts.headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    let real_ip = || {
        header_str(&parts.headers, "x-real-ip")
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_owned)
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn body_preview(bytes: &Bytes) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= BODY_PREVIEW_BYTES {
        return text.into_owned();
    }
    let mut preview = truncate_utf8(&text, BODY_PREVIEW_BYTES);
    preview.push_str(TRUNCATED_SUFFIX);
    preview
}
