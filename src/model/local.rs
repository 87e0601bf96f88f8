//! Local-side types: files on disk and the tag data parsed out of them.
//!
//! A [`ParsedFileInfo`] is produced by the tag-reading layer and never
//! modified here. Absent tags are `None`; an empty string is a real
//! (if suspicious) tag value and the two are treated differently by the
//! various-artists heuristics.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::time::Duration;

use smallvec::SmallVec;

/// Tag and filename-derived attributes of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFileInfo {
    pub title: Option<String>,
    /// Title with noise stripped by the tag parser (remaster suffixes etc.).
    pub clean_title: Option<String>,
    pub artist_title: Option<String>,
    pub album_title: Option<String>,
    pub disambiguation: Option<String>,
    /// Embedded external release ID, if the file was tagged by a previous
    /// import.
    pub release_id: Option<String>,
    /// Embedded external recording ID.
    pub recording_id: Option<String>,
    /// Track numbers as parsed; usually one entry, occasionally a range.
    pub track_numbers: SmallVec<[u32; 2]>,
    pub disc_number: Option<u32>,
    pub disc_count: Option<u32>,
    pub year: Option<u32>,
    pub country: Option<String>,
    pub label: Option<String>,
    pub duration: Option<Duration>,
}

/// One recording candidate returned by the fingerprint service.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintHit {
    pub recording_id: String,
    /// Lookup confidence in [0, 1].
    pub score: f64,
}

/// One physical file under consideration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTrack {
    pub path: PathBuf,
    pub info: ParsedFileInfo,
    /// Fingerprint lookup results, attached after scan when a fingerprint
    /// service is configured. `None` means not looked up or no match.
    pub fingerprint: Option<Vec<FingerprintHit>>,
}

impl LocalTrack {
    pub fn new(path: impl Into<PathBuf>, info: ParsedFileInfo) -> Self {
        Self {
            path: path.into(),
            info,
            fingerprint: None,
        }
    }

    /// First parsed track number, when one exists and is positive.
    pub fn track_number(&self) -> Option<u32> {
        self.info.track_numbers.first().copied().filter(|&n| n > 0)
    }

    /// Fingerprint recording IDs at or above `min_score`.
    pub fn fingerprint_ids(&self, min_score: f64) -> Vec<&str> {
        self.fingerprint
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|hit| hit.score >= min_score)
            .map(|hit| hit.recording_id.as_str())
            .collect()
    }
}

/// An ordered set of local files believed to form one release. Produced by
/// the grouping service; lives only for the duration of identification.
#[derive(Debug, Clone)]
pub struct LocalRelease {
    pub tracks: Vec<LocalTrack>,
    /// Whether the grouping heuristics classified this as a compilation.
    pub is_various_artists: bool,
}

impl LocalRelease {
    pub fn new(tracks: Vec<LocalTrack>, is_various_artists: bool) -> Self {
        Self {
            tracks,
            is_various_artists,
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Most common artist tag across the group.
    pub fn dominant_artist(&self) -> Option<&str> {
        self.dominant(|t| t.info.artist_title.as_deref())
    }

    /// Most common album tag across the group.
    pub fn dominant_album(&self) -> Option<&str> {
        self.dominant(|t| t.info.album_title.as_deref())
    }

    pub fn dominant_disambiguation(&self) -> Option<&str> {
        self.dominant(|t| t.info.disambiguation.as_deref())
    }

    pub fn dominant_country(&self) -> Option<&str> {
        self.dominant(|t| t.info.country.as_deref())
    }

    pub fn dominant_label(&self) -> Option<&str> {
        self.dominant(|t| t.info.label.as_deref())
    }

    pub fn dominant_release_id(&self) -> Option<&str> {
        self.dominant(|t| t.info.release_id.as_deref())
    }

    pub fn dominant_year(&self) -> Option<u32> {
        most_common(self.tracks.iter().filter_map(|t| t.info.year)).filter(|&y| y > 0)
    }

    /// The embedded release ID all files agree on, if any.
    pub fn consensus_release_id(&self) -> Option<&str> {
        let ids: Vec<&str> = self
            .tracks
            .iter()
            .map(|t| t.info.release_id.as_deref().unwrap_or(""))
            .collect();
        match ids.split_first() {
            Some((first, rest)) if !first.is_empty() && rest.iter().all(|id| id == first) => {
                Some(first)
            }
            _ => None,
        }
    }

    /// Disc count: the most common tagged count, falling back to the
    /// highest disc number seen.
    pub fn disc_count(&self) -> u32 {
        most_common(self.tracks.iter().filter_map(|t| t.info.disc_count))
            .filter(|&c| c > 0)
            .or_else(|| self.tracks.iter().filter_map(|t| t.info.disc_number).max())
            .unwrap_or(0)
    }

    fn dominant<'a>(&'a self, get: impl Fn(&'a LocalTrack) -> Option<&'a str>) -> Option<&'a str> {
        most_common(self.tracks.iter().filter_map(get))
    }
}

/// The most frequent item, ties broken by first occurrence.
pub(crate) fn most_common<T: Eq + Hash + Clone>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (order, item) in items.enumerate() {
        let entry = counts.entry(item).or_insert((0, order));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.0.cmp(&b.1.0).then(b.1.1.cmp(&a.1.1)))
        .map(|(item, _)| item)
}
