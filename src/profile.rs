use serde::Serialize;

use crate::geo_utils::cumulative_distances;
use crate::gpx_types::TrackPoint;

/// Moving-average window for elevation smoothing, in samples. Segments
/// shorter than the window are left unsmoothed.
pub const SMOOTHING_WINDOW: usize = 5;

/// Minimum horizontal run for the grade look-back, in meters. Keeps the
/// rise/run denominator away from zero on tightly clustered samples.
pub const MIN_GRADE_RUN_M: f64 = 5.0;

/// Consecutive smoothed-elevation deltas below this are ignored entirely
/// when accumulating ascent/descent. GPS altitude jitters by about this
/// much between adjacent samples.
pub const ELEVATION_NOISE_THRESHOLD_M: f64 = 1.0;

/// One location sample with its derived values. Computed per segment on
/// request; holds no reference back into the parsed model.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedPoint {
    pub lat: f64,
    pub lon: f64,
    /// Raw parsed elevation, meters.
    pub ele: f64,
    /// Window-averaged elevation, meters.
    pub smoothed_ele: f64,
    /// Instantaneous slope as a ratio (rise/run); positive climbs.
    pub grade: f64,
    /// Distance travelled from the segment start, meters.
    pub distance: f64,
}

/// Derived elevation/grade view of one segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentProfile {
    pub points: Vec<ProcessedPoint>,
    pub total_distance: f64,
    pub ascent: f64,
    pub descent: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub min_grade: f64,
    pub max_grade: f64,
}

impl SegmentProfile {
    /// Process one segment's raw points.
    ///
    /// Fewer than 2 points means grade is undefined (treated as zero) and
    /// ascent/descent are zero. An empty segment yields an empty profile.
    pub fn build(points: &[TrackPoint]) -> Self {
        let smoothed = smooth_elevations(points);
        let distances = cumulative_distances(points);
        let grades = compute_grades(&smoothed, &distances);

        let processed: Vec<ProcessedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| ProcessedPoint {
                lat: p.lat,
                lon: p.lon,
                ele: p.ele,
                smoothed_ele: smoothed[i],
                grade: grades[i],
                distance: distances[i],
            })
            .collect();

        let (mut ascent, mut descent) = (0.0, 0.0);
        for pair in smoothed.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > ELEVATION_NOISE_THRESHOLD_M {
                ascent += delta;
            } else if delta < -ELEVATION_NOISE_THRESHOLD_M {
                descent += -delta;
            }
        }

        let min_elevation = smoothed.iter().copied().fold(f64::INFINITY, f64::min);
        let max_elevation = smoothed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_grade = grades.iter().copied().fold(f64::INFINITY, f64::min);
        let max_grade = grades.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            total_distance: distances.last().copied().unwrap_or(0.0),
            points: processed,
            ascent,
            descent,
            min_elevation: if min_elevation.is_finite() { min_elevation } else { 0.0 },
            max_elevation: if max_elevation.is_finite() { max_elevation } else { 0.0 },
            min_grade: if min_grade.is_finite() { min_grade } else { 0.0 },
            max_grade: if max_grade.is_finite() { max_grade } else { 0.0 },
        }
    }
}

/// Centered moving-window average over raw elevations.
///
/// Window edges shrink at the segment boundaries. Segments shorter than
/// [`SMOOTHING_WINDOW`] are returned unchanged so a short climb does not get
/// averaged away.
pub fn smooth_elevations(points: &[TrackPoint]) -> Vec<f64> {
    if points.len() < SMOOTHING_WINDOW {
        return points.iter().map(|p| p.ele).collect();
    }

    let half = SMOOTHING_WINDOW / 2;
    let mut smoothed = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(points.len() - 1);
        let sum: f64 = points[lo..=hi].iter().map(|p| p.ele).sum();
        smoothed.push(sum / (hi - lo + 1) as f64);
    }
    smoothed
}

/// Grade at each point: smoothed rise over horizontal run against a
/// look-back point far enough away that the run is at least
/// [`MIN_GRADE_RUN_M`]. Runs that never reach the minimum (clustered or
/// stationary samples) yield zero.
fn compute_grades(smoothed: &[f64], distances: &[f64]) -> Vec<f64> {
    let n = smoothed.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut grades = Vec::with_capacity(n);
    grades.push(0.0);
    for i in 1..n {
        let mut j = i - 1;
        while j > 0 && distances[i] - distances[j] < MIN_GRADE_RUN_M {
            j -= 1;
        }
        let run = distances[i] - distances[j];
        if run < MIN_GRADE_RUN_M {
            grades.push(0.0);
        } else {
            grades.push((smoothed[i] - smoothed[j]) / run);
        }
    }
    grades
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64, ele: f64) -> TrackPoint {
        let mut p = TrackPoint::new(lat, lon);
        p.ele = ele;
        p
    }

    #[test]
    fn empty_segment() {
        let profile = SegmentProfile::build(&[]);
        assert!(profile.points.is_empty());
        assert_eq!(profile.ascent, 0.0);
        assert_eq!(profile.descent, 0.0);
        assert_eq!(profile.total_distance, 0.0);
    }

    #[test]
    fn single_point_has_zero_grade() {
        let profile = SegmentProfile::build(&[pt(1.0, 1.0, 100.0)]);
        assert_eq!(profile.points.len(), 1);
        assert_eq!(profile.points[0].grade, 0.0);
        assert_eq!(profile.ascent, 0.0);
        assert_eq!(profile.descent, 0.0);
        assert_eq!(profile.min_elevation, 100.0);
        assert_eq!(profile.max_elevation, 100.0);
    }

    #[test]
    fn short_segment_skips_smoothing() {
        // 1.001 degrees of longitude at lat 1 is ~111 m of run.
        let profile = SegmentProfile::build(&[pt(1.0, 1.0, 10.0), pt(1.0, 1.001, 50.0)]);
        assert_eq!(profile.points[0].smoothed_ele, 10.0);
        assert_eq!(profile.points[1].smoothed_ele, 50.0);
        assert!((profile.ascent - 40.0).abs() < 1e-9);
        assert_eq!(profile.descent, 0.0);
    }

    #[test]
    fn climb_has_positive_grade() {
        let profile = SegmentProfile::build(&[pt(1.0, 1.0, 10.0), pt(1.0, 1.001, 50.0)]);
        // ~40 m rise over ~111 m run.
        let grade = profile.points[1].grade;
        assert!(grade > 0.3 && grade < 0.45, "got {grade}");
        assert!(profile.max_grade > 0.0);
    }

    #[test]
    fn descent_has_negative_grade() {
        let profile = SegmentProfile::build(&[pt(1.0, 1.0, 50.0), pt(1.0, 1.001, 10.0)]);
        assert!(profile.points[1].grade < 0.0);
        assert!((profile.descent - 40.0).abs() < 1e-9);
        assert_eq!(profile.ascent, 0.0);
    }

    #[test]
    fn noise_below_threshold_ignored() {
        // 0.5 m wobbles are under the 1 m threshold: neither ascent nor descent.
        let points = vec![
            pt(1.0, 1.000, 100.0),
            pt(1.0, 1.001, 100.5),
            pt(1.0, 1.002, 100.0),
            pt(1.0, 1.003, 100.5),
        ];
        let profile = SegmentProfile::build(&points);
        assert_eq!(profile.ascent, 0.0);
        assert_eq!(profile.descent, 0.0);
    }

    #[test]
    fn smoothing_flattens_spike() {
        // One 30 m spike in a flat 7-point profile gets averaged down.
        let eles = [100.0, 100.0, 100.0, 130.0, 100.0, 100.0, 100.0];
        let points: Vec<TrackPoint> = eles
            .iter()
            .enumerate()
            .map(|(i, &e)| pt(1.0, 1.0 + i as f64 * 0.001, e))
            .collect();
        let smoothed = smooth_elevations(&points);
        assert!(smoothed[3] < 110.0, "spike survived smoothing: {}", smoothed[3]);
    }

    #[test]
    fn clustered_points_yield_zero_grade() {
        // All samples at the same spot: run never reaches the minimum.
        let points = vec![pt(1.0, 1.0, 10.0), pt(1.0, 1.0, 20.0), pt(1.0, 1.0, 30.0)];
        let profile = SegmentProfile::build(&points);
        for p in &profile.points {
            assert_eq!(p.grade, 0.0);
        }
    }

    #[test]
    fn cumulative_distance_carried_through() {
        let points = vec![pt(1.0, 1.0, 0.0), pt(1.0, 1.001, 0.0), pt(1.0, 1.002, 0.0)];
        let profile = SegmentProfile::build(&points);
        assert_eq!(profile.points[0].distance, 0.0);
        assert!(profile.points[1].distance > 0.0);
        assert!((profile.points[2].distance - profile.total_distance).abs() < 1e-9);
    }

    #[test]
    fn ascent_at_least_net_gain_with_filtering() {
        // Net climb with micro-descents inside: filtered descents are
        // dropped, so total ascent >= net gain.
        let eles = [0.0, 10.0, 9.5, 20.0, 19.5, 30.0];
        let points: Vec<TrackPoint> = eles
            .iter()
            .enumerate()
            .map(|(i, &e)| pt(1.0, 1.0 + i as f64 * 0.01, e))
            .collect();
        let profile = SegmentProfile::build(&points);
        let net = profile.points.last().unwrap().smoothed_ele - profile.points[0].smoothed_ele;
        assert!(profile.ascent >= net - 1e-9);
    }
}
