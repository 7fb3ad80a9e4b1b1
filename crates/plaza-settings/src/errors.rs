//! Settings error types.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contained invalid JSON or an invalid shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
