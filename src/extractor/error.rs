use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Failures of a single metadata extraction run
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while reading {program} output: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}ms", .timeout.as_millis())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} output exceeded {limit} bytes")]
    OutputTooLarge { program: String, limit: usize },

    #[error("Command failed: {program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to parse {program} output as JSON: {source}")]
    Malformed {
        program: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed output: `formats` is missing or not an array")]
    MissingFormats,
}

impl ExtractError {
    /// Short label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Spawn { .. } | ExtractError::Io { .. } | ExtractError::Failed { .. } => {
                "process_execution"
            }
            ExtractError::Timeout { .. } => "process_timeout",
            ExtractError::OutputTooLarge { .. } => "output_too_large",
            ExtractError::Malformed { .. } | ExtractError::MissingFormats => "malformed_output",
        }
    }
}
