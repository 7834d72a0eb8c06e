//! RON configuration for forge_app.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_core::{GenerationOptions, DEFAULT_BATCH_SIZE};
use forge_engine::ClientSettings;
use forge_logging::forge_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub batch_size: usize,
    pub generation: GenerationOptions,
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub frame_interval_ms: u64,
    /// Delay between loading a plan and starting playback.
    pub playback_delay_seconds: f64,
    pub max_runtime_seconds: Option<f64>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            generation: GenerationOptions::default(),
            endpoint: client.endpoint,
            connect_timeout_ms: client.connect_timeout.as_millis() as u64,
            request_timeout_ms: None,
            frame_interval_ms: 16,
            playback_delay_seconds: 30.0,
            max_runtime_seconds: None,
        }
    }
}

impl ForgeConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// Loads `path`, falling back to defaults when no path is given or the file
/// does not exist.
pub fn load_config(path: Option<&Path>) -> Result<ForgeConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(ForgeConfig::default());
    };
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            forge_info!("No config at {:?}, using defaults", path);
            return Ok(ForgeConfig::default());
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
    forge_info!("Loaded config from {:?}", path);
    Ok(config)
}
