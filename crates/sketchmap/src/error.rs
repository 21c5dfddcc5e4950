//! Error types for SketchMap operations.
//!
//! This module provides the main error type [`SketchError`]. Every pipeline
//! stage returns it, and the session publishes it as a failed outcome instead
//! of letting it escape into rendering.

use std::io;

use thiserror::Error;

use sketchmap_core::style::StyleError;

/// The main error type for SketchMap operations.
#[derive(Debug, Error)]
pub enum SketchError {
    #[error("Unsupported format `{mime}` (accepted: {})", allowed.join(", "))]
    UnsupportedFormat { mime: String, allowed: Vec<String> },

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("No shapes found in the sketch")]
    EmptySketch,

    #[error("Invalid style: {0}")]
    Style(#[from] StyleError),

    #[error("Invalid structured dump: {0}")]
    Dump(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),

    #[error("Pipeline task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SketchError {
    /// Whether the error comes from validating the input payload.
    pub fn is_ingest_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::PayloadTooLarge { .. } | Self::Decode(_)
        )
    }
}
