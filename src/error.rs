//! Error types for raidstat library.

use std::io;
use thiserror::Error;

/// Result type alias for raidstat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for raidstat library.
///
/// The extraction pipeline itself never fails; these errors only surface at
/// its boundaries (building inputs, serializing outputs).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading recognized text.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Recognizer confidence outside `[0, 1]` (or NaN).
    #[error("Invalid confidence: {0} (expected a value between 0 and 1)")]
    InvalidConfidence(f32),

    /// JSON (de)serialization of a stat map failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
