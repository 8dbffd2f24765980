//! One log line per API request.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

/// Liveness checks hit this often; their lines go to `debug`.
const HEALTH_PATH: &str = "/api/health";

/// Logs method, path, status and latency of each request.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();
    if path == HEALTH_PATH {
        debug!(method = %method, path = %path, status, duration_ms, "HTTP request");
    } else {
        info!(method = %method, path = %path, status, duration_ms, "HTTP request");
    }

    response
}
