//! # Keel Core Configuration
//!
//! Reads configuration documents (JSON, and YAML/TOML behind the
//! `yaml-config`/`toml-config` features) into [`Value`] trees, and provides
//! [`FileConfig`], a component that loads a file every time it starts.
//!
//! Registered through [`System::configure`](crate::System::configure),
//! a `FileConfig` becomes the scoped `config` component: each dependent
//! receives the section named after itself, and a restart picks up edits
//! made to the file since the previous start.
pub mod error;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::component::{Completion, Component, Signal};
use crate::value::Value;

pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

fn deserialization_error(
    format: ConfigFormat,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ConfigError {
    ConfigError::Deserialization {
        format: format.extension().to_uppercase(),
        source: Box::new(source),
    }
}

/// Parse a configuration document
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<Value, ConfigError> {
    let document: serde_json::Value = match format {
        ConfigFormat::Json => {
            serde_json::from_str(text).map_err(|e| deserialization_error(format, e))?
        }
        #[cfg(feature = "yaml-config")]
        ConfigFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| deserialization_error(format, e))?
        }
        #[cfg(feature = "toml-config")]
        ConfigFormat::Toml => toml::from_str(text).map_err(|e| deserialization_error(format, e))?,
    };
    Ok(Value::from(document))
}

/// Read and parse a configuration file, picking the format from its extension
pub async fn load_config(path: &Path) -> Result<Value, ConfigError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    load_config_as(path, format).await
}

/// Read and parse a configuration file in a given format
pub async fn load_config_as(path: &Path, format: ConfigFormat) -> Result<Value, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "read_config".to_string(),
            source,
        })?;
    parse_config(&text, format)
}

/// Component whose started value is the content of a configuration file
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
    format: Option<ConfigFormat>,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Use this format regardless of the file extension
    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Value, ConfigError> {
        match self.format {
            Some(format) => load_config_as(&self.path, format).await,
            None => load_config(&self.path).await,
        }
    }
}

#[async_trait]
impl Component for FileConfig {
    async fn start(&self, _dependencies: Value, _completion: Completion<Value>) -> Signal<Value> {
        log::debug!("Loading configuration from {}", self.path.display());
        match self.load().await {
            Ok(value) => Signal::ok(value),
            Err(err) => Signal::err(err),
        }
    }
}
