//! Pairwise and release-level distance computation.
//!
//! `track_distance` compares one local file against one canonical track;
//! `map_release_tracks` runs it across the full file × track grid and
//! solves the assignment problem for the best pairing;
//! `album_release_distance` folds the mapping plus the release-level
//! attributes into the final score a candidate is ranked by.

use tracing::trace;

use crate::distance::Distance;
use crate::distance::munkres::Munkres;
use crate::grouping::VARIOUS_ARTIST_MARKERS;
use crate::model::local::{LocalRelease, LocalTrack};
use crate::model::{AlbumRelease, Track};
use crate::text;

/// Release countries preferred when the local tags don't say otherwise.
pub const PREFERRED_COUNTRIES: [&str; 4] =
    ["United States", "United Kingdom", "Europe", "[Worldwide]"];

/// Duration difference ignored entirely, in seconds. Tag-derived durations
/// are routinely a few seconds off.
const DURATION_GRACE_SECS: f64 = 10.0;

/// Duration difference (beyond the grace) that earns the full penalty.
const DURATION_SPAN_SECS: f64 = 30.0;

/// The optimal pairing of local files to canonical tracks.
///
/// Indices refer into the local track list and the release's track list.
/// Every local file and every canonical track lands in exactly one of
/// pairs / `local_extra` / `remote_extra`.
#[derive(Debug, Clone, Default)]
pub struct TrackMapping {
    pub pairs: Vec<MappedPair>,
    /// Local files the release has no track for.
    pub local_extra: Vec<usize>,
    /// Canonical tracks no local file matched.
    pub remote_extra: Vec<usize>,
}

/// One matched (local file, canonical track) pair.
#[derive(Debug, Clone)]
pub struct MappedPair {
    pub local: usize,
    pub remote: usize,
    pub distance: Distance,
}

impl TrackMapping {
    /// Unmatched entries on both sides combined.
    pub fn extra_count(&self) -> usize {
        self.local_extra.len() + self.remote_extra.len()
    }
}

/// Compute the minimum-total-distance pairing of `locals` against the
/// release's tracks.
pub fn map_release_tracks(locals: &[LocalTrack], release: &AlbumRelease) -> TrackMapping {
    let mut distances: Vec<Vec<Distance>> = Vec::with_capacity(locals.len());
    let mut costs: Vec<Vec<f64>> = Vec::with_capacity(locals.len());

    for local in locals {
        let mut dist_row = Vec::with_capacity(release.tracks.len());
        let mut cost_row = Vec::with_capacity(release.tracks.len());
        for track in &release.tracks {
            let dist = track_distance(local, track, release.overall_position(track), false);
            cost_row.push(dist.normalized_distance());
            dist_row.push(dist);
        }
        distances.push(dist_row);
        costs.push(cost_row);
    }

    let solution = Munkres::new(&costs).solve();

    let mut mapping = TrackMapping::default();
    let mut matched_remote = vec![false; release.tracks.len()];
    let mut matched_local = vec![false; locals.len()];

    for (row, col) in solution.pairs {
        trace!(
            "mapped {} to {} (dist {:.3})",
            locals[row].path.display(),
            release.tracks[col].title,
            costs[row][col]
        );
        matched_local[row] = true;
        matched_remote[col] = true;
        mapping.pairs.push(MappedPair {
            local: row,
            remote: col,
            distance: distances[row][col].clone(),
        });
    }

    mapping.local_extra = (0..locals.len()).filter(|&i| !matched_local[i]).collect();
    mapping.remote_extra = (0..release.tracks.len())
        .filter(|&i| !matched_remote[i])
        .collect();

    mapping
}

/// Pairwise distance between one local file and one canonical track.
///
/// `overall_position` is the track's position counting across all media, so
/// local files tagged with absolute numbering on multi-disc releases still
/// compare correctly. Artist comparison only applies per-track on
/// compilations (`include_artist`), and never when the local tag is itself
/// a various-artists marker.
pub fn track_distance(
    local: &LocalTrack,
    remote: &Track,
    overall_position: u32,
    include_artist: bool,
) -> Distance {
    let mut dist = Distance::new();

    if let (Some(local_duration), Some(remote_ms)) = (local.info.duration, remote.duration_ms)
        && remote_ms > 0
    {
        let diff = (local_duration.as_secs_f64() - remote_ms as f64 / 1000.0).abs()
            - DURATION_GRACE_SECS;
        dist.add_ratio("track_length", diff, DURATION_SPAN_SECS);
    }

    // the catalog never carries feature credits in track titles, so a
    // local "(feat. X)" suffix must not count against the match
    let local_title = local
        .info
        .clean_title
        .as_deref()
        .or(local.info.title.as_deref())
        .unwrap_or("");
    dist.add_string("track_title", text::strip_featuring(local_title), &remote.title);

    if include_artist
        && let Some(artist) = local.info.artist_title.as_deref()
        && !artist.trim().is_empty()
        && !is_various_artists_marker(artist)
    {
        dist.add_string("track_artist", artist, &remote.artist_name);
    }

    if let Some(local_number) = local.track_number()
        && remote.number > 0
    {
        // a local number matching the per-medium position is as good as
        // one matching the overall position
        let expected = if local_number == remote.number {
            remote.number
        } else {
            overall_position
        };
        dist.add_number("track_index", local_number as f64, expected as f64);
    }

    if let Some(recording_id) = local.info.recording_id.as_deref()
        && !recording_id.is_empty()
    {
        let mut allowed: Vec<&str> = vec![remote.id.as_str()];
        allowed.extend(remote.old_ids.iter().map(String::as_str));
        dist.add_equality("recording_id", recording_id, &allowed);
    }

    // for fingerprinted files an ID hit trumps any textual evidence
    if let Some(hits) = &local.fingerprint {
        let ids: Vec<&str> = hits.iter().map(|h| h.recording_id.as_str()).collect();
        dist.add_equality("recording_id", &remote.id, &ids);
    }

    dist
}

/// Release-level distance between a local group and a candidate release,
/// folding in the per-track mapping.
pub fn album_release_distance(
    group: &LocalRelease,
    release: &AlbumRelease,
    mapping: &TrackMapping,
) -> Distance {
    let mut dist = Distance::new();

    // a correctly-identified compilation must not be penalized for
    // crediting a different performer per file
    let release_is_va = is_various_artists_marker(&release.album.artist.name);
    if !(release_is_va && group.is_various_artists) {
        let artist = group.dominant_artist().unwrap_or("");
        dist.add_string("artist", artist, &release.album.artist.name);
        trace!("artist: {} vs {}; {}", artist, release.album.artist.name, dist.normalized_distance());
    }

    // compare against the album title: release titles vary per edition and
    // tags rarely track them
    let title = group.dominant_album().unwrap_or("");
    dist.add_string("album", title, &release.album.title);
    trace!("album: {} vs {}; {}", title, release.album.title, dist.normalized_distance());

    if let (Some(local_disambig), Some(release_disambig)) =
        (group.dominant_disambiguation(), release.disambiguation.as_deref())
    {
        dist.add_string("album_disambiguation", local_disambig, release_disambig);
    }

    let disc_count = group.disc_count();
    if disc_count > 0 {
        dist.add_number("media_count", disc_count as f64, release.media.len() as f64);
        trace!("media_count: {} vs {}; {}", disc_count, release.media.len(), dist.normalized_distance());
    }

    if release.media.iter().any(|m| m.format == "Unknown") {
        dist.add("media_format", 1.0);
    }

    // unknown on either side is not evidence of a mismatch
    if let (Some(local_year), Some(release_year)) = (group.dominant_year(), release.effective_year())
    {
        dist.add_number("year", local_year as f64, release_year as f64);
        trace!("year: {} vs {}; {}", local_year, release_year, dist.normalized_distance());
    }

    if !release.country.is_empty() {
        if let Some(country) = group.dominant_country() {
            dist.add_equality("country", country, &release.country);
        } else {
            dist.add_priority_list("country", &release.country, &PREFERRED_COUNTRIES);
        }
    } else {
        // full penalty when the catalog release is missing a country
        dist.add("country", 1.0);
    }

    if let Some(label) = group.dominant_label() {
        dist.add_equality("label", label, &release.label);
    }

    if let Some(release_id) = group.dominant_release_id() {
        let mut allowed: Vec<&str> = vec![release.id.as_str()];
        allowed.extend(release.old_ids.iter().map(String::as_str));
        dist.add_equality("album_id", release_id, &allowed);
    }

    for pair in &mapping.pairs {
        dist.add("tracks", pair.distance.normalized_distance());
    }
    trace!("after track mapping: {}", dist.normalized_distance());

    let track_count = group.track_count();
    for _ in mapping.remote_extra.iter().take(track_count) {
        dist.add("missing_tracks", 1.0);
    }
    for _ in mapping.local_extra.iter().take(track_count) {
        dist.add("unmatched_tracks", 1.0);
    }
    trace!("after extras: {}", dist.normalized_distance());

    dist
}

/// Exact (case-insensitive) match against the compilation markers.
fn is_various_artists_marker(name: &str) -> bool {
    let name = text::normalize(name);
    VARIOUS_ARTIST_MARKERS.contains(&name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{canonical_release, local_track, locals_from_release};

    #[test]
    fn test_identical_track_has_zero_distance() {
        let release = canonical_release("album", 3);
        let locals = locals_from_release(&release);

        for (local, track) in locals.iter().zip(&release.tracks) {
            let dist = track_distance(local, track, release.overall_position(track), true);
            assert_eq!(dist.normalized_distance(), 0.0);
        }
    }

    #[test]
    fn test_feature_credit_does_not_penalize_title() {
        let release = canonical_release("album", 1);
        let mut locals = locals_from_release(&release);
        let plain = track_distance(&locals[0], &release.tracks[0], 1, true);

        let title = locals[0].info.title.clone().unwrap();
        locals[0].info.title = Some(format!("{title} (feat. Somebody)"));
        locals[0].info.clean_title = locals[0].info.title.clone();
        let with_credit = track_distance(&locals[0], &release.tracks[0], 1, true);

        assert_eq!(
            plain.normalized_distance(),
            with_credit.normalized_distance()
        );
    }

    #[test]
    fn test_recording_id_match_trumps_text() {
        let release = canonical_release("album", 1);
        let track = &release.tracks[0];

        let mut local = local_track("/music/x/01.mp3", "completely different", "artist", "album");
        local.info.recording_id = Some(track.id.clone());
        let dist = track_distance(&local, track, 1, false);

        assert_eq!(dist.penalties()["recording_id"].as_slice(), &[0.0]);
    }

    #[test]
    fn test_old_recording_id_still_matches() {
        let mut release = canonical_release("album", 1);
        release.tracks[0].old_ids = vec!["rec-old".to_string()];

        let mut locals = locals_from_release(&release);
        locals[0].info.recording_id = Some("rec-old".to_string());
        let dist = track_distance(&locals[0], &release.tracks[0], 1, false);

        assert_eq!(dist.normalized_distance(), 0.0);
    }

    #[test]
    fn test_va_marker_artist_not_compared() {
        let release = canonical_release("album", 1);
        let mut locals = locals_from_release(&release);
        locals[0].info.artist_title = Some("Various Artists".to_string());

        let dist = track_distance(&locals[0], &release.tracks[0], 1, true);
        assert!(!dist.penalties().contains_key("track_artist"));
    }

    #[test]
    fn test_identical_release_has_zero_album_distance() {
        let release = canonical_release("album", 3);
        let locals = locals_from_release(&release);
        let group = LocalRelease::new(locals, false);

        let mapping = map_release_tracks(&group.tracks, &release);
        assert_eq!(mapping.pairs.len(), 3);
        assert!(mapping.local_extra.is_empty());
        assert!(mapping.remote_extra.is_empty());

        let dist = album_release_distance(&group, &release, &mapping);
        assert_eq!(dist.normalized_distance(), 0.0);
    }

    #[test]
    fn test_mapping_recovers_from_swapped_track_numbers() {
        let release = canonical_release("album", 3);
        let mut locals = locals_from_release(&release);
        // titles are right, numbers are nonsense, and no embedded IDs to
        // fall back on, so the title signal has to win on its own
        for local in &mut locals {
            local.info.recording_id = None;
        }
        locals[0].info.track_numbers = [3].into_iter().collect();
        locals[1].info.track_numbers = [1].into_iter().collect();
        locals[2].info.track_numbers = [2].into_iter().collect();

        let mapping = map_release_tracks(&locals, &release);

        let mut pairs: Vec<(usize, usize)> =
            mapping.pairs.iter().map(|p| (p.local, p.remote)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_missing_file_becomes_remote_extra() {
        let release = canonical_release("album", 3);
        let mut locals = locals_from_release(&release);
        locals.remove(2);

        let mapping = map_release_tracks(&locals, &release);

        assert_eq!(mapping.pairs.len(), 2);
        assert!(mapping.local_extra.is_empty());
        assert_eq!(mapping.remote_extra, vec![2]);
        for pair in &mapping.pairs {
            assert_eq!(pair.distance.normalized_distance(), 0.0);
        }
    }

    #[test]
    fn test_extra_tracks_penalize_release_distance() {
        let release = canonical_release("album", 3);
        let mut locals = locals_from_release(&release);
        locals.remove(2);
        let group = LocalRelease::new(locals, false);

        let mapping = map_release_tracks(&group.tracks, &release);
        let dist = album_release_distance(&group, &release, &mapping);

        assert_eq!(dist.penalties()["missing_tracks"].as_slice(), &[1.0]);
        assert!(dist.normalized_distance() > 0.0);
    }

    #[test]
    fn test_va_release_with_va_group_skips_artist() {
        let mut release = canonical_release("album", 2);
        release.album.artist.name = "Various Artists".to_string();
        let locals = locals_from_release(&release);
        let group = LocalRelease::new(locals, true);

        let mapping = map_release_tracks(&group.tracks, &release);
        let dist = album_release_distance(&group, &release, &mapping);

        assert!(!dist.penalties().contains_key("artist"));
    }

    #[test]
    fn test_absolute_numbering_on_multi_disc_release() {
        let mut release = canonical_release("album", 4);
        release.tracks[2].number = 1;
        release.tracks[2].medium_number = 2;
        release.tracks[3].number = 2;
        release.tracks[3].medium_number = 2;

        let mut locals = locals_from_release(&release);
        // absolute numbering in the tags: 3 and 4 rather than 1 and 2
        locals[2].info.track_numbers = [3].into_iter().collect();
        locals[3].info.track_numbers = [4].into_iter().collect();

        for (local, track) in locals.iter().zip(&release.tracks) {
            let dist = track_distance(local, track, release.overall_position(track), false);
            assert_eq!(dist.penalties()["track_index"].as_slice(), &[0.0]);
        }
    }
}
