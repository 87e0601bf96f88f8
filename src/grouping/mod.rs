//! Partitions a flat pile of scanned files into release-sized groups.
//!
//! Files mostly arrive organized by directory, so that is the first cut:
//! one group per parent directory, with `cd 1` / `disc 2` / `disk 3` style
//! subdirectories collapsed into their parent release. Directory groups
//! that don't look like a single release (mixed albums, mixed artists) fall
//! back to grouping by album tag, then by (artist, album) pair.
//!
//! Along the way each group is classified as single-artist or
//! various-artists; compilations get looser artist checks everywhere
//! downstream.
//!
//! Grouping is a pure function of the scan snapshot: no state, safe to
//! recompute at any time.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::model::local::{LocalRelease, LocalTrack, most_common};
use crate::text;

/// Artist tags that mean "this is a compilation", compared exactly
/// (case-insensitive); "Va Va Voom" is a band, not a marker.
pub const VARIOUS_ARTIST_MARKERS: [&str; 5] = ["", "various artists", "various", "va", "unknown"];

/// Artist-tag agreement threshold for various-artists detection: flagged
/// when more than this fraction of files carry distinct artists.
pub const VA_ARTIST_THRESHOLD: f64 = 0.75;

/// Album-tag agreement threshold for the single-release check.
pub const ALBUM_TAG_THRESHOLD: f64 = 0.25;

/// Artist-tag agreement threshold for the single-release check.
pub const ARTIST_TAG_THRESHOLD: f64 = 0.25;

/// Similarity ratio above which two tag values count as the same entry
/// (absorbs typos and truncated suffixes).
pub const TAG_FUZZ: f64 = 0.9;

/// Matches the first directory of a multi-disc layout, capturing the
/// common root ("Album/cd " out of "Album/cd 1").
static MULTI_DISC_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<root>.*(?:dis[ck]|cd)[\W_]*)\d").expect("multi-disc regex is valid")
});

/// Groups local files into probable releases.
#[derive(Debug, Default)]
pub struct TrackGroupingService;

impl TrackGroupingService {
    pub fn new() -> Self {
        Self
    }

    /// Partition `tracks` into release-sized [`LocalRelease`] groups.
    pub fn group_tracks(&self, tracks: Vec<LocalTrack>) -> Vec<LocalRelease> {
        let mut releases = Vec::new();

        // first attempt, assume grouped by folder
        let mut unprocessed = Vec::new();
        for group in group_by_directory(tracks) {
            if Self::looks_like_single_release(&group) {
                releases.push(into_release(group));
            } else {
                unprocessed.extend(group);
            }
        }

        // anything left over regroups by album tag (picks up VA spread
        // across directories)
        let mut unprocessed2 = Vec::new();
        for (_, group) in group_by_key(unprocessed, |t| {
            t.info.album_title.as_deref().map(text::normalize)
        }) {
            debug!("Falling back to grouping by album tag");
            if Self::looks_like_single_release(&group) {
                releases.push(into_release(group));
            } else {
                unprocessed2.extend(group);
            }
        }

        // final fallback: group by artist+album pair unconditionally
        for (_, group) in group_by_key(unprocessed2, |t| {
            Some((
                t.info.artist_title.as_deref().map(text::normalize),
                t.info.album_title.as_deref().map(text::normalize),
            ))
        }) {
            debug!("Falling back to grouping by album+artist tag");
            releases.push(into_release(group));
        }

        releases
    }

    /// Whether all of `tracks` plausibly belong to one release: no
    /// conflicting embedded release IDs, a dominant album tag, and (unless
    /// the group is a compilation) a dominant artist tag.
    pub fn looks_like_single_release(tracks: &[LocalTrack]) -> bool {
        let distinct_ids = {
            let mut ids: Vec<&str> = tracks
                .iter()
                .filter_map(|t| t.info.release_id.as_deref())
                .filter(|id| !id.is_empty())
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids.len()
        };
        if distinct_ids > 1 {
            trace!("looks_like_single_release: embedded release IDs are not unique");
            return false;
        }

        let albums: Vec<Option<String>> = tracks
            .iter()
            .map(|t| t.info.album_title.as_deref().map(text::normalize))
            .collect();
        if !has_common_entry(&albums, ALBUM_TAG_THRESHOLD, TAG_FUZZ) {
            trace!("looks_like_single_release: no common album tag");
            return false;
        }

        if !Self::is_various_artists(tracks) {
            let artists: Vec<Option<String>> = tracks
                .iter()
                .map(|t| t.info.artist_title.as_deref().map(text::normalize))
                .collect();
            if !has_common_entry(&artists, ARTIST_TAG_THRESHOLD, TAG_FUZZ) {
                trace!("looks_like_single_release: no common artist tag");
                return false;
            }
        }

        true
    }

    /// Whether `tracks` look like a various-artists compilation: the
    /// dominant artist tag is a known marker, or nearly every file credits
    /// a different artist. Untagged (`None`) artists are not markers; a
    /// pile of files with no tags at all is not a compilation.
    pub fn is_various_artists(tracks: &[LocalTrack]) -> bool {
        let artists: Vec<Option<String>> = tracks
            .iter()
            .map(|t| t.info.artist_title.as_deref().map(text::normalize))
            .collect();

        if !has_common_entry(&artists, VA_ARTIST_THRESHOLD, TAG_FUZZ) {
            return true;
        }

        if let Some(Some(dominant)) = most_common(artists.into_iter())
            && VARIOUS_ARTIST_MARKERS.contains(&dominant.as_str())
        {
            return true;
        }

        false
    }
}

fn into_release(tracks: Vec<LocalTrack>) -> LocalRelease {
    let is_va = TrackGroupingService::is_various_artists(&tracks);
    LocalRelease::new(tracks, is_va)
}

/// Group by immediate parent directory, then re-merge consecutive
/// directories that form a multi-disc layout:
///
/// ```text
/// Album/cd 1/01.mp3
/// Album/cd 2/01.mp3
/// ```
///
/// Directories are walked in sorted order; once a directory matches the
/// start of a multi-disc layout, every following sibling matching the same
/// root joins its group.
fn group_by_directory(tracks: Vec<LocalTrack>) -> Vec<Vec<LocalTrack>> {
    let mut by_dir: BTreeMap<PathBuf, Vec<LocalTrack>> = BTreeMap::new();
    for track in tracks {
        let dir = track.path.parent().map(PathBuf::from).unwrap_or_default();
        by_dir.entry(dir).or_default().push(track);
    }

    let mut groups = Vec::new();
    let mut current: Vec<LocalTrack> = Vec::new();
    let mut subdir_re: Option<Regex> = None;

    for (dir, dir_tracks) in by_dir {
        let dir_str = dir.to_string_lossy();

        if let Some(re) = &subdir_re
            && re.is_match(&dir_str)
        {
            // current directory continues the multi-disc set
            current.extend(dir_tracks);
            continue;
        }

        // the previous multi-disc set (if any) is complete
        if !current.is_empty() {
            trace!("directory group of {} files complete", current.len());
            groups.push(std::mem::take(&mut current));
        }

        subdir_re = None;
        current.extend(dir_tracks);

        if let Some(caps) = MULTI_DISC_START.captures(&dir_str) {
            // first directory of a possible multi-disc set; siblings
            // sharing the root with a different number belong to it
            let root = regex::escape(&caps["root"]);
            subdir_re = Some(
                Regex::new(&format!(r"(?i)^{root}\d+$")).expect("escaped multi-disc root is valid"),
            );
        } else {
            groups.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Stable grouping by an arbitrary key, preserving first-seen key order.
fn group_by_key<K: Ord + Clone>(
    tracks: Vec<LocalTrack>,
    key: impl Fn(&LocalTrack) -> Option<K>,
) -> Vec<(Option<K>, Vec<LocalTrack>)> {
    let mut order: Vec<Option<K>> = Vec::new();
    let mut groups: BTreeMap<Option<K>, Vec<LocalTrack>> = BTreeMap::new();
    for track in tracks {
        let k = key(&track);
        if !groups.contains_key(&k) {
            order.push(k.clone());
        }
        groups.entry(k).or_default().push(track);
    }
    order
        .into_iter()
        .filter_map(|k| groups.remove_entry(&k))
        .collect()
}

/// Whether one value (fuzz-merged with its near-duplicates) dominates the
/// input: the most common cluster must cover at least `1 - threshold` of
/// all values, and when more than one distinct value exists the distinct
/// count must stay within `threshold` of the total.
fn has_common_entry(values: &[Option<String>], threshold: f64, fuzz: f64) -> bool {
    if values.is_empty() {
        return true;
    }

    let mut counts: Vec<(&Option<String>, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some(entry) => entry.1 += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = values.len();
    let mut distinct = counts.len();
    let (most_common_value, mut most_common_count) = counts[0];

    // merge groups that are close to the most common value
    for (value, count) in counts.iter().skip(1) {
        if let (Some(a), Some(b)) = (most_common_value, value)
            && !a.is_empty()
            && !b.is_empty()
            && text::similarity(a, b) > fuzz
        {
            distinct -= 1;
            most_common_count += count;
        }
    }

    trace!(
        "distinct {} most_common {} total {}",
        distinct, most_common_count, total
    );

    if distinct > 1
        && (distinct as f64 / total as f64 > threshold
            || (most_common_count as f64) / (total as f64) < 1.0 - threshold)
    {
        return false;
    }

    true
}
