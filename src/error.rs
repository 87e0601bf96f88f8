//! Crate-wide error types.
//!
//! Expected absences (no candidates, no fingerprint match, provider
//! not-found) are ordinary values, not errors; an empty candidate list is
//! the normal "no match" outcome. Errors here cover the things that can
//! genuinely go wrong: a misbehaving metadata provider or a bad config file.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum aggregating all subsystems
//! - Module-specific errors (e.g. [`ProviderError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility

use crate::provider::ProviderError;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error (config loading)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
