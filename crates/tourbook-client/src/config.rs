//! Client configuration, stored as RON.
//!
//! Default location: `~/.config/tourbook/client.ron`. Every field is
//! optional in the file; missing fields take their defaults.
//!
//! ```ron
//! (
//!     api_url: "https://api.tourbook.example/v1",
//!     timeout_secs: 20,
//!     token_env: "TOURBOOK_TOKEN",
//!     image: (quality: 80, max_width: 1920, max_height: 1080),
//! )
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("RON parse error in {path}: {source}")]
    Ron {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Photo compression limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// JPEG quality, 1–100.
    pub quality: u8,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            quality: 80,
            max_width: 1920,
            max_height: 1080,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the block CRUD API.
    pub api_url: String,
    /// Per-request timeout, enforced by the HTTP transport.
    pub timeout_secs: u64,
    /// Environment variable holding the bearer token.
    pub token_env: String,
    pub image: ImageConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            token_env: "TOURBOOK_TOKEN".to_string(),
            image: ImageConfig::default(),
        }
    }
}

impl ClientConfig {
    /// `~/.config/tourbook/client.ron`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tourbook").join("client.ron"))
    }

    pub fn from_ron(text: &str, path: &Path) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|source| ConfigError::Ron {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing default file yields the defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_ron(&text, &path),
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no client config, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
