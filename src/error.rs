//! Error type shared by the widget, its configuration and the host app.

use std::io;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the mention widget.
#[derive(Debug, Error)]
pub enum Error {
    /// Setup-time misconfiguration (bad delimiter, unknown template, no data source).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A data source answered with an item that has no `id`.
    #[error("items need to have an id field at least (item #{index} has none)")]
    InvalidItem {
        /// Position of the offending item in the response.
        index: usize,
    },

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("items parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
