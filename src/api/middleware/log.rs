use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for the request id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Middleware that wraps the router to record every request.
///
/// For each inbound request it:
/// - generates a UUID v4 request id, stored in the request extensions and
///   echoed in the response headers
/// - opens a tracing span so all logs within the request carry the id
/// - after the wrapped handler completes, logs the remote address, method,
///   path, response status, and elapsed wall-clock duration
///
/// The response itself is not altered beyond the added header. The remote
/// address comes from axum's ConnectInfo extension and may be absent when the
/// router is driven without a real socket (as in tests).
pub async fn request_log_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    // Store the request id in extensions so handlers can access it
    let mut request = request;
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let start = Instant::now();

    let response = async move {
        let response = next.run(request).await;

        tracing::info!(
            remote_addr = remote_addr.as_deref().unwrap_or("-"),
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await;

    // Add request id to response headers
    let (mut parts, body) = response.into_parts();
    parts.headers.insert(
        REQUEST_ID_HEADER,
        HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("invalid")),
    );

    Response::from_parts(parts, body)
}

/// Extension type for storing the request id in request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    /// Get the request id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt; // For oneshot method

    async fn test_handler(request: Request<Body>) -> impl IntoResponse {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "no-request-id".to_string());

        (StatusCode::OK, request_id)
    }

    fn test_app() -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .layer(middleware::from_fn(request_log_middleware))
    }

    #[tokio::test]
    async fn test_request_id_header_is_set() {
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let header = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_available_in_handler() {
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        let header_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_id = String::from_utf8(body_bytes.to_vec()).unwrap();

        assert_eq!(header_id, body_id);
    }

    #[tokio::test]
    async fn test_request_id_unique_per_request() {
        let mut ids = Vec::new();

        for _ in 0..2 {
            let request = Request::builder()
                .uri("/test")
                .body(Body::empty())
                .unwrap();

            let response = test_app().oneshot(request).await.unwrap();
            ids.push(
                response
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .unwrap()
                    .to_str()
                    .unwrap()
                    .to_string(),
            );
        }

        assert_ne!(ids[0], ids[1]);
    }
}
