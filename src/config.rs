use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure that can be loaded from CLI, config file, or environment
///
/// Example configuration file content
/// # yt-dlp info server configuration
///
/// port = 3000
/// host = "0.0.0.0"
///
/// # External tool
/// ytdlp_path = "/usr/local/bin/yt-dlp"
/// timeout_ms = 20000
/// max_output_bytes = 10485760
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[serde(default)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "LISTEN_HOST", default_value = "0.0.0.0")]
    #[serde(default = "default_host")]
    pub host: String,

    /// yt-dlp executable, looked up in PATH unless absolute
    #[arg(long, env = "YTDLP_PATH", default_value = "yt-dlp")]
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// Wall-clock limit for a single yt-dlp run, in milliseconds
    #[arg(long, default_value_t = 20_000)]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Cap on captured stdout + stderr of a single yt-dlp run
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Configuration file path (overrides default-valued arguments)
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            ytdlp_path: default_ytdlp_path(),
            timeout_ms: default_timeout_ms(),
            max_output_bytes: default_max_output_bytes(),
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> Result<Self> {
        let mut config = Config::parse();

        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence
    fn merge_with_file(mut self, file_config: Config) -> Self {
        // If CLI value is default, use file value
        if self.port == default_port() {
            self.port = file_config.port;
        }
        if self.host == default_host() {
            self.host = file_config.host;
        }
        if self.ytdlp_path == default_ytdlp_path() {
            self.ytdlp_path = file_config.ytdlp_path;
        }
        if self.timeout_ms == default_timeout_ms() {
            self.timeout_ms = file_config.timeout_ms;
        }
        if self.max_output_bytes == default_max_output_bytes() {
            self.max_output_bytes = file_config.max_output_bytes;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.parse::<IpAddr>().is_err() {
            return Err(anyhow::anyhow!("Invalid host address: {}", self.host));
        }
        if self.ytdlp_path.trim().is_empty() {
            return Err(anyhow::anyhow!("yt-dlp path cannot be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than zero"));
        }
        if self.max_output_bytes == 0 {
            return Err(anyhow::anyhow!("Output cap must be greater than zero"));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_output_bytes() -> usize {
    10 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.ytdlp_path, "yt-dlp");
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.max_output_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cli_args_override_defaults() {
        let config =
            Config::parse_from(["ytdlp-info", "--port", "8080", "--host", "127.0.0.1"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn file_values_fill_in_defaults_only() {
        let file_config: Config = toml::from_str(
            r#"
            port = 4000
            ytdlp_path = "/opt/yt-dlp"
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(file_config.max_output_bytes, default_max_output_bytes());

        let cli = Config {
            timeout_ms: 1000,
            ..Default::default()
        };
        let merged = cli.merge_with_file(file_config);
        assert_eq!(merged.port, 4000);
        assert_eq!(merged.ytdlp_path, "/opt/yt-dlp");
        assert_eq!(merged.timeout_ms, 1000);
    }

    #[test]
    fn rejects_invalid_values() {
        let bad_host = Config {
            host: "not-an-ip".into(),
            ..Default::default()
        };
        assert!(bad_host.validate().is_err());

        let empty_path = Config {
            ytdlp_path: " ".into(),
            ..Default::default()
        };
        assert!(empty_path.validate().is_err());

        let zero_timeout = Config {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let zero_cap = Config {
            max_output_bytes: 0,
            ..Default::default()
        };
        assert!(zero_cap.validate().is_err());
    }
}
