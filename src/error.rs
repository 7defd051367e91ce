//! Error types for the nesting engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the input layer, rule loading, or an internal fault in the packer.
///
/// Unknown materials and pieces too large for their board are not errors: they are
/// reported as data in [`crate::orchestrator::NestingRun`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("piece '{id}' has invalid dimensions {width}x{height}")]
    InvalidDimension { id: String, width: f64, height: f64 },

    #[error("piece '{id}' has a zero quantity")]
    InvalidQuantity { id: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("request expands to {count} pieces, the limit is {max}")]
    TooManyPieces { count: u64, max: u64 },

    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken packer state. Unreachable when pre-filtering is correct.
    #[error("internal error: {0}")]
    Internal(String),
}
