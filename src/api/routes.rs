use super::error::{ApiError, INVALID_URL, URL_REQUIRED};
use crate::AppState;
use crate::extractor::VideoInfo;
use axum::extract::Extension;
use axum::response::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const WELCOME: &str =
    "Welcome to the yt-dlp server. Use POST /info with a URL to get video data.";

#[derive(Debug, Default, Deserialize)]
pub struct InfoRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl InfoRequest {
    /// Bodies that are not a JSON object with a string `url` count as carrying no URL.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Presence and `http` prefix only, nothing stricter.
    pub fn validated_url(self) -> Result<String, ApiError> {
        let url = self
            .url
            .filter(|url| !url.is_empty())
            .ok_or(ApiError::Validation(URL_REQUIRED))?;

        if !url.starts_with("http") {
            return Err(ApiError::Validation(INVALID_URL));
        }

        Ok(url)
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    #[serde(flatten)]
    pub info: VideoInfo,
}

pub async fn root() -> &'static str {
    WELCOME
}

#[axum::debug_handler]
pub async fn info(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<InfoResponse>, ApiError> {
    let url = InfoRequest::from_body(&body).validated_url()?;
    info!(%url, "Fetching video info");

    let info = state.ytdlp().fetch_info(&url).await?;
    Ok(Json(InfoResponse {
        success: true,
        info,
    }))
}
