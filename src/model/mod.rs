//! Canonical catalog entities.
//!
//! These are the provider-side types: the authoritative artist / album /
//! release / track graph the identification engine matches local files
//! against. They are read-only inputs here: the metadata provider builds
//! them, this crate only compares against them.
//!
//! Every entity carries the stable external ID minted by the provider.
//! Releases and tracks additionally carry the IDs they superseded, so a
//! file tagged before a catalog merge still matches. Those lists are owned
//! by the entity; there are no live cross-references in this graph.
//! parents own children, and anything else is looked up by ID or index.

pub mod local;

/// An artist (or author) as known to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistMetadata {
    /// Stable external ID.
    pub id: String,
    /// Credited name.
    pub name: String,
}

/// An album (or book): the abstract work one or more releases realize.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    /// Stable external ID.
    pub id: String,
    pub title: String,
    pub artist: ArtistMetadata,
    /// Year of first release, when known.
    pub year: Option<u32>,
}

/// One physical medium (disc, cassette side, ...) of a release.
#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    /// 1-based medium number.
    pub number: u32,
    /// Format name as declared by the provider ("CD", "Vinyl", "Unknown").
    pub format: String,
}

/// A canonical track on a release.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable external recording ID.
    pub id: String,
    /// Recording IDs this track absorbed through catalog merges.
    pub old_ids: Vec<String>,
    pub title: String,
    /// Credited performer for this track (differs per track on
    /// compilations).
    pub artist_name: String,
    /// 1-based position on its medium.
    pub number: u32,
    /// 1-based medium this track sits on.
    pub medium_number: u32,
    /// Duration in milliseconds, when the provider knows it.
    pub duration_ms: Option<u64>,
}

/// One specific pressing/edition of an album, with its ordered track list.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRelease {
    /// Stable external release ID.
    pub id: String,
    /// Release IDs this release absorbed through catalog merges.
    pub old_ids: Vec<String>,
    pub title: String,
    /// Provider disambiguation text ("Deluxe Edition", ...).
    pub disambiguation: Option<String>,
    /// Release year of this specific edition.
    pub year: Option<u32>,
    /// Countries this release was issued in.
    pub country: Vec<String>,
    /// Labels this release was issued under.
    pub label: Vec<String>,
    pub media: Vec<Medium>,
    pub album: Album,
    pub tracks: Vec<Track>,
}

impl AlbumRelease {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Overall position of a track across all media: its per-medium number
    /// plus every track on lower-numbered media. Lets a local file tagged
    /// with absolute numbering compare against a multi-disc release.
    pub fn overall_position(&self, track: &Track) -> u32 {
        track.number
            + self
                .tracks
                .iter()
                .filter(|t| t.medium_number < track.medium_number)
                .count() as u32
    }

    /// The effective release year: this edition's, falling back to the
    /// album's first-release year.
    pub fn effective_year(&self) -> Option<u32> {
        self.year.or(self.album.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{canonical_release, canonical_track};

    #[test]
    fn test_overall_position_single_disc() {
        let release = canonical_release("album", 3);
        for (i, track) in release.tracks.iter().enumerate() {
            assert_eq!(release.overall_position(track), i as u32 + 1);
        }
    }

    #[test]
    fn test_overall_position_multi_disc() {
        let mut release = canonical_release("album", 4);
        // move the last two tracks to disc 2, renumbering per disc
        release.tracks[2] = Track {
            number: 1,
            medium_number: 2,
            ..canonical_track("track 3", 3)
        };
        release.tracks[3] = Track {
            number: 2,
            medium_number: 2,
            ..canonical_track("track 4", 4)
        };

        assert_eq!(release.overall_position(&release.tracks[1]), 2);
        assert_eq!(release.overall_position(&release.tracks[2]), 3);
        assert_eq!(release.overall_position(&release.tracks[3]), 4);
    }

    #[test]
    fn test_effective_year_prefers_release() {
        let mut release = canonical_release("album", 1);
        release.year = Some(1999);
        release.album.year = Some(1990);
        assert_eq!(release.effective_year(), Some(1999));

        release.year = None;
        assert_eq!(release.effective_year(), Some(1990));
    }
}
