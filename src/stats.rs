use serde::Serialize;

use crate::geo_utils::polyline_length;
use crate::gpx_types::Track;
use crate::profile::SegmentProfile;

/// Aggregate statistics for one track, computed in a single pass over all
/// of its segments. Recomputed fresh on every request; never cached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackStats {
    /// Sum of great-circle distances between consecutive points, meters.
    pub distance: f64,
    /// Last timestamp minus first timestamp, clamped to non-negative.
    /// Zero when fewer than two points carry timestamps.
    pub duration_secs: f64,
    pub ascent: f64,
    pub descent: f64,
    pub point_count: usize,
}

/// Compute statistics for a track.
///
/// Distance accumulates within each segment only; the gap between two
/// recording sessions is not travelled distance. Ascent/descent come from
/// the smoothed, noise-filtered elevation profile of each segment.
pub fn track_stats(track: &Track) -> TrackStats {
    let mut stats = TrackStats::default();
    let mut first_time = None;
    let mut last_time = None;

    for segment in &track.segments {
        stats.point_count += segment.points.len();
        stats.distance += polyline_length(&segment.points);

        let profile = SegmentProfile::build(&segment.points);
        stats.ascent += profile.ascent;
        stats.descent += profile.descent;

        for point in &segment.points {
            if let Some(t) = point.time {
                if first_time.is_none() {
                    first_time = Some(t);
                }
                last_time = Some(t);
            }
        }
    }

    if let (Some(start), Some(end)) = (first_time, last_time) {
        let secs = (end - start).num_milliseconds() as f64 / 1000.0;
        stats.duration_secs = secs.max(0.0);
    }

    stats
}
