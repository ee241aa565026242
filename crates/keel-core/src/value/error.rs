//! Errors raised while reading or writing nested [`Value`](super::Value) trees.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("Cannot write '{path}': segment '{segment}' does not lead into a map")]
    PathConflict { path: String, segment: String },

    #[error("Failed to decode value: {0}")]
    Decode(#[source] serde_json::Error),
}
