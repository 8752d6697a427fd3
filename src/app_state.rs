use crate::Config;
use crate::extractor::YtDlp;
use std::sync::Arc;
use tracing::info;

/// Immutable per-server state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub ytdlp: Arc<YtDlp>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let ytdlp = YtDlp::from_config(config);
        info!(
            program = ytdlp.program(),
            timeout_ms = config.timeout_ms,
            max_output_bytes = config.max_output_bytes,
            "yt-dlp runner configured"
        );

        Self {
            ytdlp: Arc::new(ytdlp),
        }
    }

    pub fn ytdlp(&self) -> &YtDlp {
        &self.ytdlp
    }
}
