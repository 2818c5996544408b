//! Request logging middleware

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::observability::Logger;

/// Logs one `HTTP_REQUEST` event per request once the response is ready.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    Logger::info(
        "HTTP_REQUEST",
        &[
            ("method", method.as_str()),
            ("path", &path),
            ("status", response.status().as_str()),
            ("latency_ms", &started.elapsed().as_millis().to_string()),
        ],
    );

    response
}
