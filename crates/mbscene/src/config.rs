//! Build configuration read from `build.toml`.

use std::path::Path;

use mbscene_writer::WriterSettings;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Settings for one input-file build. Every field has a default, so an
/// empty file is a valid configuration.
///
/// ```toml
/// [writer]
/// precision = 6
/// error_policy = "best-effort"
/// simulation = "long run"
/// title = "Double pendulum"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Input-file writer settings.
    pub writer: WriterSettings,
}

impl BuildConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ModelError::Config(e.to_string()))
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded build configuration");
        Ok(config)
    }
}
