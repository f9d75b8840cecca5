use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Per-request log line with method, path, status, and elapsed time.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %uri,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    response
}
