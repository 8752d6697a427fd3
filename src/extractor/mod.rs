pub mod error;
pub mod process;

use crate::Config;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

// Re-exports for convenience
pub use error::ExtractError;
pub use process::{CapturedOutput, run_bounded};

/// The object yt-dlp prints in `--dump-json` mode
pub type VideoDump = serde_json::Map<String, JsonValue>;

/// Handle to the external yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    timeout: Duration,
    max_output: usize,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, timeout: Duration, max_output: usize) -> Self {
        Self {
            program: program.into(),
            timeout,
            max_output,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ytdlp_path.clone(),
            config.timeout(),
            config.max_output_bytes,
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `yt-dlp --dump-json -- <url>`; the separator keeps a URL from being read as a flag.
    fn command(&self, url: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(["--dump-json", "--"]).arg(url);
        command
    }

    /// Run yt-dlp once for `url` and parse what it printed.
    pub async fn dump_json(&self, url: &str) -> Result<VideoDump, ExtractError> {
        debug!(program = %self.program, url, "Running yt-dlp");
        let output = run_bounded(self.command(url), self.timeout, self.max_output).await?;

        if !output.status.success() {
            return Err(ExtractError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| ExtractError::Malformed {
            program: self.program.clone(),
            source,
        })
    }

    pub async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ExtractError> {
        let info = VideoInfo::from_dump(self.dump_json(url).await?)?;
        info!(url, formats_count = info.formats_count, "Video info extracted");
        Ok(info)
    }
}

/// Summary of a dump plus the dump itself.
///
/// Summary fields are copied as-is; a field yt-dlp did not print is left out
/// when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<JsonValue>,
    pub formats_count: usize,
    pub full_data: VideoDump,
}

impl VideoInfo {
    pub fn from_dump(dump: VideoDump) -> Result<Self, ExtractError> {
        let formats_count = dump
            .get("formats")
            .and_then(JsonValue::as_array)
            .map(Vec::len)
            .ok_or(ExtractError::MissingFormats)?;

        Ok(Self {
            title: dump.get("title").cloned(),
            uploader: dump.get("uploader").cloned(),
            duration: dump.get("duration").cloned(),
            view_count: dump.get("view_count").cloned(),
            formats_count,
            full_data: dump,
        })
    }
}
