//! Client configuration, stored as YAML.
//!
//! ```yaml
//! base_url: http://api.v3.factual.com/
//! host: api.v3.factual.com
//! driver_tag: tabula-rs-v0.1.0
//! key: my-key
//! secret: my-secret
//! debug: false
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://api.v3.factual.com/";

/// Default `Host` header value.
pub const DEFAULT_HOST: &str = "api.v3.factual.com";

/// Library tag sent with every request.
pub const DEFAULT_DRIVER_TAG: &str = concat!("tabula-rs-v", env!("CARGO_PKG_VERSION"));

/// Settings a transport needs to reach and authenticate with the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// API root every request path is joined to.
    pub base_url: String,

    /// `Host` header value.
    pub host: String,

    /// Library identification header value.
    pub driver_tag: String,

    /// OAuth consumer key.
    pub key: String,

    /// OAuth consumer secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Log each request before it is sent.
    pub debug: bool,
}

impl ClientConfig {
    /// Creates a configuration with default endpoints and the given key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Sets the consumer secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Parses configuration from YAML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid configuration YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it does not parse.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), base_url = %config.base_url, "loaded client configuration");
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails and `Error::Io` if the
    /// file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Joins a request path onto `base_url`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            driver_tag: DEFAULT_DRIVER_TAG.to_string(),
            key: String::new(),
            secret: None,
            debug: false,
        }
    }
}
