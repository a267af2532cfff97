use anyhow::{Result, anyhow};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

/// `"*"` anywhere in the list opens the API to every origin.
pub(crate) fn build_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = if origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| anyhow!("invalid CORS origin: {err}"))?;

        CorsLayer::new().allow_origin(origins)
    };

    Ok(layer
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]))
}

#[cfg(test)]
mod tests {
    use super::build_cors_layer;

    #[test]
    fn accepts_wildcard_and_explicit_origins() {
        assert!(build_cors_layer(&["*".to_string()]).is_ok());
        assert!(build_cors_layer(&["http://localhost:8000".to_string()]).is_ok());
    }

    #[test]
    fn rejects_origin_that_is_not_a_header_value() {
        let err = build_cors_layer(&["http://bad\norigin".to_string()]).expect_err("invalid");
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
