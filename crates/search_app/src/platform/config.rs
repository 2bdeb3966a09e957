use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use page_logging::page_info;
use search_engine::{BlobHash, ConnectionSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "search_page.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub server_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub operation_timeout_ms: u64,
    pub blob_hash: BlobHash,
    pub log_destination: LogDestination,
    pub log_level: String,
    /// Search run right after the page is shown.
    pub initial_query: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        let connection = ConnectionSettings::default();
        Self {
            server_url: connection.server_url,
            connect_timeout_ms: millis(connection.connect_timeout),
            request_timeout_ms: millis(connection.request_timeout),
            operation_timeout_ms: millis(connection.operation_timeout),
            blob_hash: connection.blob_hash,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
            initial_query: None,
        }
    }
}

impl PageConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        page_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            server_url: self.server_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            operation_timeout: Duration::from_millis(self.operation_timeout_ms),
            blob_hash: self.blob_hash,
        }
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
