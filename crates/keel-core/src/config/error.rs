//! # Keel Core Configuration Errors
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or unsupported config format for path: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
