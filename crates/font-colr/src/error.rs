//! Error types for paint compilation.

/// Result type for paint compilation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling paint layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The palette already holds the maximum number of entries.
    #[error("Palette is full: cannot add '{color}' beyond 65535 entries")]
    PaletteFull { color: String },

    /// A palette color could not be parsed.
    #[error("Invalid color '{color}': {message}")]
    InvalidColor { color: String, message: String },

    /// A design-space error from the variation model.
    #[error(transparent)]
    Model(#[from] painter_font_varmodel::Error),
}
