//! Test fixtures shared across module tests.
//!
//! Factories for local tracks and canonical releases, plus a helper that
//! derives a perfectly-tagged local file set from a canonical release (the
//! "files ripped straight from this release" scenario most identification
//! tests start from).

use std::time::Duration;

use crate::model::local::{LocalTrack, ParsedFileInfo};
use crate::model::{Album, AlbumRelease, ArtistMetadata, Medium, Track};

/// Distinct track titles; single-character edits between titles would let
/// fuzzy matching blur the test cases.
const TRACK_TITLES: [&str; 6] = ["Ashes", "Blackbird", "Cascade", "Driftwood", "Ember", "Falling"];

/// A local track with the given tags and sensible defaults.
pub fn local_track(
    path: impl Into<std::path::PathBuf>,
    title: &str,
    artist: &str,
    album: &str,
) -> LocalTrack {
    LocalTrack::new(
        path,
        ParsedFileInfo {
            title: Some(title.to_string()),
            clean_title: Some(title.to_string()),
            artist_title: Some(artist.to_string()),
            album_title: Some(album.to_string()),
            ..Default::default()
        },
    )
}

/// A local track with no tags at all, as a tagless rip would produce.
pub fn untagged_track(path: impl Into<std::path::PathBuf>) -> LocalTrack {
    LocalTrack::new(path, ParsedFileInfo::default())
}

/// A canonical track with a distinct title and duration per position.
pub fn canonical_track(title: &str, number: u32) -> Track {
    Track {
        id: format!("rec-{number}"),
        old_ids: Vec::new(),
        title: title.to_string(),
        artist_name: "artist".to_string(),
        number,
        medium_number: 1,
        duration_ms: Some((150 + 30 * number as u64) * 1000),
    }
}

/// A single-disc canonical release with `count` tracks.
pub fn canonical_release(title: &str, count: usize) -> AlbumRelease {
    let tracks = (0..count)
        .map(|i| {
            let name = TRACK_TITLES
                .get(i)
                .map(|t| t.to_string())
                .unwrap_or_else(|| format!("Untitled {}", i + 1));
            Track {
                // recording IDs are unique per release
                id: format!("rec-{title}-{}", i + 1),
                ..canonical_track(&name, i as u32 + 1)
            }
        })
        .collect();

    AlbumRelease {
        id: format!("release-{title}"),
        old_ids: Vec::new(),
        title: title.to_string(),
        disambiguation: None,
        year: Some(1990),
        country: vec!["United States".to_string()],
        label: vec!["label".to_string()],
        media: vec![Medium {
            number: 1,
            format: "CD".to_string(),
        }],
        album: Album {
            id: format!("album-{title}"),
            title: title.to_string(),
            artist: ArtistMetadata {
                id: "artist-1".to_string(),
                name: "artist".to_string(),
            },
            year: Some(1990),
        },
        tracks,
    }
}

/// Local files generated directly from a release's own track list: every
/// tag agrees with the catalog, so all distances against the release are
/// zero.
pub fn locals_from_release(release: &AlbumRelease) -> Vec<LocalTrack> {
    release
        .tracks
        .iter()
        .map(|track| {
            let info = ParsedFileInfo {
                title: Some(track.title.clone()),
                clean_title: Some(track.title.clone()),
                artist_title: Some(track.artist_name.clone()),
                album_title: Some(release.album.title.clone()),
                disambiguation: release.disambiguation.clone(),
                release_id: Some(release.id.clone()),
                recording_id: Some(track.id.clone()),
                track_numbers: [release.overall_position(track)].into_iter().collect(),
                disc_number: Some(track.medium_number),
                disc_count: Some(release.media.len() as u32),
                year: release.effective_year(),
                country: release.country.first().cloned(),
                label: release.label.first().cloned(),
                duration: track.duration_ms.map(Duration::from_millis),
            };
            LocalTrack::new(
                format!(
                    "/music/{}/{:02} - {}.mp3",
                    release.album.title, track.number, track.title
                ),
                info,
            )
        })
        .collect()
}
