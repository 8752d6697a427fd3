use crate::extractor::ExtractError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub const URL_REQUIRED: &str = "URL is required in the request body.";
pub const INVALID_URL: &str = "Invalid URL format.";
pub const RETRIEVE_FAILED: &str = "Failed to retrieve video information.";

/// Response extension marking an error that was already logged
#[derive(Debug, Clone, Copy)]
pub struct ErrorLogged;

/// Errors surfaced by the `/info` handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Extract(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = match self {
            ApiError::Validation(message) => {
                warn!(reason = message, "Rejected info request");
                (status, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Extract(error) => {
                error!(kind = error.kind(), %error, "yt-dlp execution failed");
                let body = json!({
                    "success": false,
                    "error": RETRIEVE_FAILED,
                    "details": error.to_string(),
                });
                (status, Json(body)).into_response()
            }
        };
        response.extensions_mut().insert(ErrorLogged);
        response
    }
}
