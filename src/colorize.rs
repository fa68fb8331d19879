use serde::{Deserialize, Serialize};

use crate::profile::SegmentProfile;

/// Distance scale for the effort weighting, in meters. A point covering this
/// much ground since the previous sample doubles its grade contribution, so
/// gradual long climbs register alongside steep short ones.
pub const EFFORT_DISTANCE_SCALE_M: f64 = 50.0;

/// Value assigned to every point when a segment has no variation to
/// normalize against (flat elevation, or a single point).
pub const FLAT_SEGMENT_VALUE: f64 = 0.5;

/// How per-point color values are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    /// Pure elevation-based coloring.
    Gradient,
    /// Combined grade-magnitude and distance coloring; direction-invariant.
    Effort,
}

/// Normalized color values for one segment, plus the observed raw range the
/// normalization used. The range is what legend/gradient UI calibrates
/// against.
#[derive(Debug, Clone, Serialize)]
pub struct ColorScale {
    /// One value in [0, 1] per processed point.
    pub values: Vec<f64>,
    pub min_value: f64,
    pub max_value: f64,
    pub mode: VisualizationMode,
}

/// Map a processed segment to normalized color values.
pub fn map_values(profile: &SegmentProfile, mode: VisualizationMode) -> ColorScale {
    let raw: Vec<f64> = match mode {
        VisualizationMode::Gradient => profile.points.iter().map(|p| p.smoothed_ele).collect(),
        VisualizationMode::Effort => {
            let mut prev_distance = 0.0;
            profile
                .points
                .iter()
                .map(|p| {
                    let step = p.distance - prev_distance;
                    prev_distance = p.distance;
                    p.grade.abs() * (1.0 + step / EFFORT_DISTANCE_SCALE_M)
                })
                .collect()
        }
    };

    let min_value = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max_value = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let values = if !min_value.is_finite() || max_value - min_value <= f64::EPSILON {
        // Flat segment: nothing to normalize against.
        vec![FLAT_SEGMENT_VALUE; raw.len()]
    } else {
        let span = max_value - min_value;
        raw.iter().map(|v| (v - min_value) / span).collect()
    };

    ColorScale {
        values,
        min_value: if min_value.is_finite() { min_value } else { 0.0 },
        max_value: if max_value.is_finite() { max_value } else { 0.0 },
        mode,
    }
}
