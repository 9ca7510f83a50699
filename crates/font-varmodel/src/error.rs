//! Error types for design space handling.

use font_types::InvalidTag;

/// Result type for design space operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing a design space.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An axis tag is not a valid OpenType tag.
    #[error("Invalid axis tag '{tag}': {source}")]
    InvalidTag { tag: String, source: InvalidTag },

    /// Axis bounds are out of order.
    #[error("Axis '{tag}' must satisfy min <= default <= max, got {min}/{default}/{max}")]
    InvalidAxisRange {
        tag: String,
        min: f64,
        default: f64,
        max: f64,
    },

    /// A canonical location key could not be parsed.
    #[error("Malformed location key '{key}': {message}")]
    MalformedLocationKey { key: String, message: String },
}
