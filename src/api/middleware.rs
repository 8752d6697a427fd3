use super::error::ErrorLogged;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, error, warn};

/// Logs every non-success response with how long the request took.
///
/// Responses built from an `ApiError` already carry their own diagnostic
/// line, so they only get a debug line here.
pub async fn log_request_errors(req: Request<Body>, next: Next) -> Response {
    let uri = req.uri().clone();
    let method = req.method().clone();
    let started = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let already_logged = response.extensions().get::<ErrorLogged>().is_some();

    if !already_logged && status.is_client_error() {
        warn!(%method, %uri, %status, elapsed_ms, "Client error");
    } else if !already_logged && status.is_server_error() {
        error!(%method, %uri, %status, elapsed_ms, "Server error");
    } else {
        debug!(%method, %uri, %status, elapsed_ms, "Request served");
    }

    response
}
