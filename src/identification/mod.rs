//! Release identification: from one group of local files to a ranked list
//! of canonical release candidates.
//!
//! # Flow
//!
//! For each [`LocalRelease`] group:
//! 1. attach fingerprint results, when a fingerprint service is configured
//! 2. generate candidates from tags and fingerprints concurrently
//!    ([`candidates`]), deduplicated by release ID
//! 3. for every candidate, compute the optimal file-to-track mapping and
//!    the release distance ([`scoring`])
//! 4. rank ascending by normalized distance
//!
//! Groups are identified concurrently on a bounded pipeline, each in its
//! own task: one group failing, even panicking, reports that group as
//! unmatched and never disturbs its siblings. An empty candidate list is
//! the normal "no match found" outcome, distinct from any error.

pub mod candidates;
pub mod scoring;

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::IdentificationConfig;
use crate::distance::Distance;
use crate::fingerprint::FingerprintService;
use crate::grouping::TrackGroupingService;
use crate::model::AlbumRelease;
use crate::model::local::{LocalRelease, LocalTrack};
use crate::provider::MetadataProvider;
use self::candidates::{CandidateGenerator, CandidateSource};
use self::scoring::{TrackMapping, album_release_distance, map_release_tracks};

/// Caller-supplied constraints for an identification run (manual import).
#[derive(Debug, Clone, Default)]
pub struct IdentificationOverrides {
    /// Identify against this release only, skipping candidate search.
    pub release: Option<AlbumRelease>,
}

/// One scored hypothesis: a canonical release, the file mapping computed
/// against it, and the aggregate distance it was ranked by.
#[derive(Debug, Clone)]
pub struct CandidateRelease {
    pub release: AlbumRelease,
    pub source: CandidateSource,
    pub mapping: TrackMapping,
    pub distance: Distance,
}

impl CandidateRelease {
    pub fn normalized_distance(&self) -> f64 {
        self.distance.normalized_distance()
    }
}

/// The outcome for one group: its files plus ranked candidates (best
/// first). No candidates means the group is unmatched.
#[derive(Debug, Clone)]
pub struct IdentifiedGroup {
    pub release: LocalRelease,
    pub candidates: Vec<CandidateRelease>,
}

impl IdentifiedGroup {
    fn unmatched(release: LocalRelease) -> Self {
        Self {
            release,
            candidates: Vec::new(),
        }
    }

    /// The best-ranked candidate, if any.
    pub fn best(&self) -> Option<&CandidateRelease> {
        self.candidates.first()
    }

    pub fn is_unmatched(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Identifies local release groups against the canonical catalog.
///
/// Cheap to clone; clones share the underlying provider and fingerprint
/// service.
#[derive(Clone)]
pub struct IdentificationService {
    provider: Arc<dyn MetadataProvider>,
    fingerprinter: Option<Arc<dyn FingerprintService>>,
    config: Arc<IdentificationConfig>,
}

impl IdentificationService {
    pub fn new(provider: Arc<dyn MetadataProvider>, config: IdentificationConfig) -> Self {
        Self {
            provider,
            fingerprinter: None,
            config: Arc::new(config),
        }
    }

    /// Attach a fingerprint service; without one the fingerprint candidate
    /// source silently contributes nothing.
    pub fn with_fingerprinter(mut self, service: Arc<dyn FingerprintService>) -> Self {
        self.fingerprinter = Some(service);
        self
    }

    /// Group `tracks` into probable releases and identify each group.
    ///
    /// `single_release` skips grouping and treats the whole input as one
    /// release (manual import of a known directory). Output order follows
    /// grouping order; completion order between groups is unspecified.
    pub async fn identify(
        &self,
        tracks: Vec<LocalTrack>,
        overrides: IdentificationOverrides,
        single_release: bool,
    ) -> Vec<IdentifiedGroup> {
        let track_count = tracks.len();
        let groups = if single_release {
            let is_va = TrackGroupingService::is_various_artists(&tracks);
            vec![LocalRelease::new(tracks, is_va)]
        } else {
            TrackGroupingService::new().group_tracks(tracks)
        };
        debug!("sorted {} tracks into {} groups", track_count, groups.len());

        let overrides = Arc::new(overrides);
        futures::stream::iter(groups.into_iter().map(|group| {
            let service = self.clone();
            let overrides = Arc::clone(&overrides);
            async move {
                // the group survives a lost task so it can be reported
                // unmatched instead of disappearing from the run
                let fallback = group.clone();
                let task = tokio::spawn(async move {
                    service
                        .identify_release(group, overrides.release.as_ref())
                        .await
                });
                match task.await {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("identification task failed: {err}");
                        IdentifiedGroup::unmatched(fallback)
                    }
                }
            }
        }))
        .buffered(self.config.max_concurrent_groups.max(1))
        .collect()
        .await
    }

    /// Identify one group: candidates from tags and fingerprints, scored
    /// and ranked.
    pub async fn identify_release(
        &self,
        mut group: LocalRelease,
        override_release: Option<&AlbumRelease>,
    ) -> IdentifiedGroup {
        if let Some(fingerprinter) = &self.fingerprinter {
            fingerprinter
                .lookup(&mut group.tracks, self.config.fingerprint_threshold)
                .await;
        }

        let generator = CandidateGenerator::new(self.provider.as_ref(), &self.config);
        // both sources must complete before scoring; either may be empty
        let (tag_candidates, fingerprint_candidates) = futures::join!(
            generator.from_tags(&group, override_release),
            generator.from_fingerprint(&group),
        );

        let mut all = tag_candidates;
        all.extend(fingerprint_candidates);
        let candidates = CandidateGenerator::dedupe(all);

        if candidates.is_empty() {
            debug!("no candidates found for group of {} files", group.track_count());
            return IdentifiedGroup::unmatched(group);
        }

        debug!(
            "matching {} files against {} candidates",
            group.track_count(),
            candidates.len()
        );

        let mut scored: Vec<CandidateRelease> = candidates
            .into_iter()
            .map(|candidate| {
                let mapping = map_release_tracks(&group.tracks, &candidate.release);
                let distance = album_release_distance(&group, &candidate.release, &mapping);
                debug!(
                    "release {} [{} tracks] has distance {:.3}",
                    candidate.release.id,
                    candidate.release.track_count(),
                    distance.normalized_distance()
                );
                CandidateRelease {
                    release: candidate.release,
                    source: candidate.source,
                    mapping,
                    distance,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            a.normalized_distance()
                .total_cmp(&b.normalized_distance())
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.mapping.extra_count().cmp(&b.mapping.extra_count()))
        });

        IdentifiedGroup {
            release: group,
            candidates: scored,
        }
    }
}
