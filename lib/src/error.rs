//! Error types for the analysis engine

use thiserror::Error;

/// Errors produced by frame assembly, filtering, statistics and the
/// collaborator adapters.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A mean was requested over zero elements.
    #[error("Empty input: cannot compute {what} over zero elements")]
    EmptyInput { what: String },

    /// Fewer samples than a statistic needs.
    #[error("Insufficient data for {what}: need at least {required}, found {found}")]
    InsufficientData {
        what: String,
        required: usize,
        found: usize,
    },

    /// Unknown channel name or out-of-range configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl AnalysisError {
    /// Shorthand for a [`AnalysisError::Configuration`] error.
    pub fn config(message: impl Into<String>) -> Self {
        AnalysisError::Configuration(message.into())
    }

    pub fn empty(what: impl Into<String>) -> Self {
        AnalysisError::EmptyInput { what: what.into() }
    }
}
