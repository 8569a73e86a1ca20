use crate::utils::errors::{Result, UploadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8000/upload-image";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// Everything the validator and the workflow need, supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub image_mime_types: BTreeSet<String>,
    pub max_bytes: u64,
    pub endpoint_url: String,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            image_mime_types: ["image/jpeg", "image/png"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_bytes: DEFAULT_MAX_BYTES,
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            timeout_ms: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl UploadConfig {
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint_url.trim();
        if endpoint.is_empty() {
            return Err(UploadError::Config("endpoint_url must not be empty".to_string()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(UploadError::Config(format!(
                "endpoint_url must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
        if self.image_mime_types.is_empty() {
            return Err(UploadError::Config(
                "image_mime_types must list at least one type".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(UploadError::Config(
                "timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| UploadError::Config(e.to_string()))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| UploadError::Config(e.to_string()))?;
        config.upload.validate()?;
        Ok(config)
    }

    /// Defaults when the file does not exist; a file that exists must load cleanly.
    pub fn load_if_present(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }
}
