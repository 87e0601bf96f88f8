//! Acoustic fingerprint lookup boundary.
//!
//! Implemented elsewhere (audio decoding and the lookup API are out of
//! scope here). The contract matters more than the mechanics: `lookup`
//! attaches candidate recording IDs to the tracks it can identify and
//! silently leaves the rest untouched: a per-file miss, an unreachable
//! service, or an unfingerprint-able file must never fail the batch.

use async_trait::async_trait;

use crate::model::local::LocalTrack;

/// Looks up acoustic fingerprints for local files.
#[async_trait]
pub trait FingerprintService: Send + Sync {
    /// Attach fingerprint results (hits with confidence >= `min_score`) to
    /// each track that could be identified. Tracks with no match keep
    /// `fingerprint: None`.
    async fn lookup(&self, tracks: &mut [LocalTrack], min_score: f64);
}
