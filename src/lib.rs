//! GPX track parsing and elevation/grade analysis.
//!
//! Turns raw GPX bytes into a [`GpxFile`] of tracks, segments, and
//! waypoints, then derives per-segment elevation profiles: smoothed
//! elevation, instantaneous grade, ascent/descent totals, normalized color
//! values for gradient/effort rendering, and prominence-filtered
//! peak/valley markers.
//!
//! Parsing never fails hard: unreadable or malformed input degrades to an
//! empty (or partial) file, so callers treat `tracks.is_empty()` as the one
//! "nothing to show" signal. Every function here works on local state only;
//! concurrent loads just call them from separate tasks.

mod colorize;
mod error;
mod extrema;
mod geo_utils;
mod gpx_types;
mod parser;
mod profile;
mod stats;

use std::path::Path;

use log::warn;

pub use colorize::{ColorScale, VisualizationMode, map_values};
pub use extrema::{DEFAULT_MIN_PROMINENCE_M, ExtremumKind, ExtremumMarker, find_extrema};
pub use geo_utils::{cumulative_distances, haversine_distance, polyline_length};
pub use gpx_types::{GpxFile, Track, TrackPoint, TrackSegment, Waypoint};
pub use parser::parse_gpx;
pub use profile::{ProcessedPoint, SegmentProfile};
pub use stats::{TrackStats, track_stats};

/// Parse GPX from raw bytes. Undecodable byte sequences are replaced
/// rather than treated as fatal.
pub fn parse_gpx_bytes(bytes: &[u8], filename: &str) -> GpxFile {
    let xml = String::from_utf8_lossy(bytes);
    parse_gpx(&xml, filename)
}

/// Read and parse a GPX file in one bounded read.
///
/// A missing or unreadable file degrades to an empty [`GpxFile`] carrying
/// the path's file name.
pub fn load_gpx_file(path: &Path) -> GpxFile {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match std::fs::read(path) {
        Ok(bytes) => parse_gpx_bytes(&bytes, &filename),
        Err(err) => {
            warn!("{}: unreadable, returning empty file: {err}", path.display());
            GpxFile::empty(filename)
        }
    }
}
