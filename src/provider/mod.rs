//! Canonical metadata provider boundary.
//!
//! The identification engine never talks to the network itself; it goes
//! through this trait. Production code wires in a real client elsewhere,
//! tests substitute the mocks below.
//!
//! Expected "no match" outcomes are `Ok` values (`None` / empty vec).
//! [`ProviderError`] is reserved for genuine failures, and callers in this
//! crate catch those per-call and degrade to zero results.

use async_trait::async_trait;

use crate::model::AlbumRelease;

/// Errors from the metadata provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("rate limited - try again later")]
    RateLimited,
}

/// Resolves releases from the canonical catalog.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Text search for releases. An empty `artist` searches by title alone
    /// (used as a fallback when the combined search finds nothing).
    async fn search_releases(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Vec<AlbumRelease>, ProviderError>;

    /// Fetch one release by its stable external ID. `Ok(None)` for an
    /// unknown ID.
    async fn get_release_by_id(&self, id: &str) -> Result<Option<AlbumRelease>, ProviderError>;

    /// All releases containing any of the given recording IDs.
    async fn get_releases_by_recording_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<AlbumRelease>, ProviderError>;
}
