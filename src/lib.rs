//! trackhound - identification engine for media-library automation.
//!
//! Given a pile of scanned local files (with tag data already parsed by
//! the host application), this crate figures out which canonical catalog
//! release (and which track within it) each file corresponds to:
//!
//! 1. [`grouping`] partitions the files into release-sized groups and
//!    flags various-artists compilations
//! 2. [`identification`] generates candidate releases per group (embedded
//!    IDs, text search, acoustic fingerprints), maps files to tracks with
//!    an optimal assignment ([`distance::munkres`]), and ranks candidates
//!    by a normalized [`distance::Distance`] score
//!
//! The caller supplies the external services as traits
//! ([`provider::MetadataProvider`], [`fingerprint::FingerprintService`])
//! and decides what to do with the ranked candidates; this crate performs
//! no network or file I/O of its own.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use trackhound::{IdentificationConfig, IdentificationService};
//! use trackhound::identification::IdentificationOverrides;
//!
//! let service = IdentificationService::new(provider, IdentificationConfig::default())
//!     .with_fingerprinter(fingerprinter);
//!
//! let groups = service
//!     .identify(scanned_tracks, IdentificationOverrides::default(), false)
//!     .await;
//! for group in groups {
//!     match group.best() {
//!         Some(candidate) => println!("matched {}", candidate.release.title),
//!         None => println!("no candidates found"),
//!     }
//! }
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod fingerprint;
pub mod grouping;
pub mod identification;
pub mod model;
pub mod provider;
pub mod text;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::config::IdentificationConfig;
pub use crate::distance::Distance;
pub use crate::error::{Error, Result};
pub use crate::grouping::TrackGroupingService;
pub use crate::identification::{CandidateRelease, IdentificationService, IdentifiedGroup};
pub use crate::model::local::{LocalRelease, LocalTrack, ParsedFileInfo};
