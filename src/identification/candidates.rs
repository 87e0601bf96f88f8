//! Candidate release generation.
//!
//! Two independent sources feed the scorer: the group's own tags (embedded
//! release ID, else a text search on the dominant artist/album) and the
//! fingerprint lookup results. Either source may come up empty (that is
//! normal, not an error), and a provider failure or timeout on one call
//! degrades to zero candidates from that call rather than aborting the
//! group.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::IdentificationConfig;
use crate::model::AlbumRelease;
use crate::model::local::LocalRelease;
use crate::provider::{MetadataProvider, ProviderError};

/// Where a candidate came from; used as a ranking tie-break (an exact
/// tag-sourced ID beats a search or fingerprint hit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateSource {
    /// Consensus embedded release ID, or an explicit caller override.
    TagId,
    /// Text search on the dominant artist/album tags.
    Search,
    /// Acoustic fingerprint recording lookup.
    Fingerprint,
}

/// An unscored candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub release: AlbumRelease,
    pub source: CandidateSource,
}

/// Generates candidates from a metadata provider.
pub struct CandidateGenerator<'a> {
    provider: &'a dyn MetadataProvider,
    config: &'a IdentificationConfig,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(provider: &'a dyn MetadataProvider, config: &'a IdentificationConfig) -> Self {
        Self { provider, config }
    }

    /// Candidates from the group's tags: an explicit override wins
    /// outright, then a consensus embedded release ID, then text search.
    pub async fn from_tags(
        &self,
        group: &LocalRelease,
        override_release: Option<&AlbumRelease>,
    ) -> Vec<Candidate> {
        if let Some(release) = override_release {
            debug!("release {} was forced", release.id);
            return vec![Candidate {
                release: release.clone(),
                source: CandidateSource::TagId,
            }];
        }

        if let Some(id) = group.consensus_release_id() {
            debug!("selecting release from consensus embedded ID [{id}]");
            match self.get_release_by_id(id).await {
                Some(release) => {
                    return vec![Candidate {
                        release,
                        source: CandidateSource::TagId,
                    }];
                }
                None => trace!("consensus ID [{id}] not found, falling back to search"),
            }
        }

        self.from_search(group).await
    }

    /// Text-search candidates on the dominant artist/album tags. For a
    /// compilation the per-file artists are meaningless, so the canonical
    /// various-artists name is searched instead.
    async fn from_search(&self, group: &LocalRelease) -> Vec<Candidate> {
        let artist = if group.is_various_artists {
            "Various Artists".to_string()
        } else {
            group.dominant_artist().unwrap_or("").to_string()
        };
        let album = group.dominant_album().unwrap_or("").to_string();

        if artist.is_empty() || album.is_empty() {
            return Vec::new();
        }

        let mut releases = self.search(&artist, &album).await;

        if releases.is_empty() {
            // last resort: two single-term searches, concatenated
            releases = self.search("", &album).await;
            let by_artist = self.search(&artist, "").await;
            for release in by_artist {
                if !releases.iter().any(|r| r.id == release.id) {
                    releases.push(release);
                }
            }
        }

        releases
            .into_iter()
            .take(self.config.max_search_candidates)
            .map(|release| Candidate {
                release,
                source: CandidateSource::Search,
            })
            .collect()
    }

    /// Candidates from fingerprint hits: resolve the releases owning the
    /// confident recording IDs, keep those sharing enough recordings with
    /// the group, closest track count first.
    pub async fn from_fingerprint(&self, group: &LocalRelease) -> Vec<Candidate> {
        let recording_ids: Vec<String> = group
            .tracks
            .iter()
            .flat_map(|t| t.fingerprint_ids(self.config.fingerprint_threshold))
            .map(str::to_string)
            .collect();

        if recording_ids.is_empty() {
            return Vec::new();
        }

        let releases = match self
            .with_timeout(self.provider.get_releases_by_recording_ids(&recording_ids))
            .await
        {
            Ok(releases) => releases,
            Err(err) => {
                warn!("recording ID resolution failed: {err}");
                return Vec::new();
            }
        };

        let track_count = group.track_count();
        let mut scored: Vec<(AlbumRelease, f64)> = releases
            .into_iter()
            .map(|release| {
                let common = release
                    .tracks
                    .iter()
                    .filter(|t| {
                        recording_ids.iter().any(|id| *id == t.id || t.old_ids.contains(id))
                    })
                    .count();
                let proportion = common as f64 / track_count.max(1) as f64;
                (release, proportion)
            })
            .filter(|(_, proportion)| *proportion > self.config.fingerprint_common_proportion)
            .collect();

        scored.sort_by(|(a, pa), (b, pb)| {
            let da = a.track_count().abs_diff(track_count);
            let db = b.track_count().abs_diff(track_count);
            da.cmp(&db).then(pb.total_cmp(pa))
        });

        scored
            .into_iter()
            .take(self.config.max_fingerprint_candidates)
            .map(|(release, _)| Candidate {
                release,
                source: CandidateSource::Fingerprint,
            })
            .collect()
    }

    /// Merge candidates from all sources, dropping duplicate releases. The
    /// first occurrence wins, so callers pass tag candidates before
    /// fingerprint ones.
    pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut seen: Vec<String> = Vec::new();
        let mut output = Vec::new();
        for candidate in candidates {
            if seen.contains(&candidate.release.id) {
                continue;
            }
            seen.push(candidate.release.id.clone());
            output.push(candidate);
        }
        output
    }

    async fn get_release_by_id(&self, id: &str) -> Option<AlbumRelease> {
        match self.with_timeout(self.provider.get_release_by_id(id)).await {
            Ok(release) => release,
            Err(err) => {
                warn!("release lookup for [{id}] failed: {err}");
                None
            }
        }
    }

    async fn search(&self, artist: &str, album: &str) -> Vec<AlbumRelease> {
        match self
            .with_timeout(self.provider.search_releases(artist, album))
            .await
        {
            Ok(releases) => releases,
            Err(err) => {
                warn!("release search for {artist:?} / {album:?} failed: {err}");
                Vec::new()
            }
        }
    }

    /// Bound a provider call; a timeout counts as a failed call.
    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        match tokio::time::timeout(
            Duration::from_secs(self.config.provider_timeout_secs),
            call,
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Network("provider call timed out".to_string())),
        }
    }
}
