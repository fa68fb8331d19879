use serde::Serialize;

use crate::profile::SegmentProfile;

/// Default minimum prominence for a marker, in meters. Bumps smaller than
/// this never earn a Peak/Valley marker.
pub const DEFAULT_MIN_PROMINENCE_M: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtremumKind {
    Peak,
    Valley,
}

/// A significant local extremum, suitable for map marker placement.
#[derive(Debug, Clone, Serialize)]
pub struct ExtremumMarker {
    /// Index into the segment's processed point sequence.
    pub index: usize,
    pub kind: ExtremumKind,
    /// Smoothed elevation at the extremum, meters.
    pub elevation: f64,
}

/// Find significant local maxima and minima in a processed segment.
///
/// Candidates are interior direction changes of the smoothed elevation;
/// plateaus resolve to their earliest index. Each candidate is then kept
/// only if its prominence against the neighboring candidates (or, at the
/// ends, the segment's boundary elevations) reaches `min_prominence`. A
/// segment with no elevation variation yields no markers.
pub fn find_extrema(profile: &SegmentProfile, min_prominence: f64) -> Vec<ExtremumMarker> {
    let eles: Vec<f64> = profile.points.iter().map(|p| p.smoothed_ele).collect();
    let candidates = collect_candidates(&eles);

    candidates
        .iter()
        .enumerate()
        .filter(|&(i, c)| prominence(c, i, &candidates, &eles) >= min_prominence)
        .map(|(_, c)| c.clone())
        .collect()
}

/// Interior local extrema of the smoothed elevation, in index order.
fn collect_candidates(eles: &[f64]) -> Vec<ExtremumMarker> {
    let mut candidates = Vec::new();
    if eles.len() < 3 {
        return candidates;
    }

    for i in 1..eles.len() - 1 {
        // Earliest index of a plateau is the candidate; later equal samples
        // are not.
        if eles[i] == eles[i - 1] {
            continue;
        }
        // Look past any plateau to the next differing sample.
        let mut j = i + 1;
        while j < eles.len() && eles[j] == eles[i] {
            j += 1;
        }
        if j == eles.len() {
            break;
        }
        if eles[i] > eles[i - 1] && eles[i] > eles[j] {
            candidates.push(ExtremumMarker {
                index: i,
                kind: ExtremumKind::Peak,
                elevation: eles[i],
            });
        } else if eles[i] < eles[i - 1] && eles[i] < eles[j] {
            candidates.push(ExtremumMarker {
                index: i,
                kind: ExtremumKind::Valley,
                elevation: eles[i],
            });
        }
    }
    candidates
}

/// Prominence of one candidate against its neighboring candidates, falling
/// back to the segment's first/last elevations where no neighbor exists.
fn prominence(
    candidate: &ExtremumMarker,
    position: usize,
    candidates: &[ExtremumMarker],
    eles: &[f64],
) -> f64 {
    let left = if position > 0 {
        candidates[position - 1].elevation
    } else {
        eles[0]
    };
    let right = if position + 1 < candidates.len() {
        candidates[position + 1].elevation
    } else {
        *eles.last().unwrap_or(&candidate.elevation)
    };

    match candidate.kind {
        ExtremumKind::Peak => (candidate.elevation - left).min(candidate.elevation - right),
        ExtremumKind::Valley => (left - candidate.elevation).min(right - candidate.elevation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpx_types::TrackPoint;

    fn profile_from(eles: &[f64]) -> SegmentProfile {
        let points: Vec<TrackPoint> = eles
            .iter()
            .enumerate()
            .map(|(i, &e)| {
                let mut p = TrackPoint::new(1.0, 1.0 + i as f64 * 0.001);
                p.ele = e;
                p
            })
            .collect();
        SegmentProfile::build(&points)
    }

    #[test]
    fn single_summit_yields_one_peak_no_valleys() {
        let profile = profile_from(&[0.0, 10.0, 20.0, 30.0, 20.0, 10.0, 0.0]);
        let markers = find_extrema(&profile, DEFAULT_MIN_PROMINENCE_M);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, ExtremumKind::Peak);
        assert_eq!(markers[0].index, 3);
    }

    #[test]
    fn flat_segment_yields_no_markers() {
        let profile = profile_from(&[50.0; 8]);
        assert!(find_extrema(&profile, DEFAULT_MIN_PROMINENCE_M).is_empty());
    }

    #[test]
    fn minor_bumps_filtered_by_prominence() {
        // 2 m wobble never reaches the default 5 m prominence.
        let profile = profile_from(&[100.0, 102.0, 100.0, 102.0, 100.0]);
        assert!(find_extrema(&profile, DEFAULT_MIN_PROMINENCE_M).is_empty());
    }

    #[test]
    fn valley_between_two_summits() {
        let eles = [
            0.0, 20.0, 40.0, 60.0, 80.0, 60.0, 40.0, 20.0, 0.0, 20.0, 40.0, 60.0, 80.0, 60.0,
            40.0, 20.0, 0.0,
        ];
        let profile = profile_from(&eles);
        let markers = find_extrema(&profile, DEFAULT_MIN_PROMINENCE_M);
        let peaks = markers.iter().filter(|m| m.kind == ExtremumKind::Peak).count();
        let valleys = markers.iter().filter(|m| m.kind == ExtremumKind::Valley).count();
        assert_eq!(peaks, 2);
        assert_eq!(valleys, 1);
    }

    #[test]
    fn plateau_resolves_to_earliest_index() {
        // Fewer than the smoothing window, so elevations pass through raw.
        let profile = profile_from(&[0.0, 30.0, 30.0, 0.0]);
        let markers = find_extrema(&profile, DEFAULT_MIN_PROMINENCE_M);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].index, 1);
    }

    #[test]
    fn short_segments_yield_no_markers() {
        assert!(find_extrema(&profile_from(&[]), 5.0).is_empty());
        assert!(find_extrema(&profile_from(&[10.0]), 5.0).is_empty());
        assert!(find_extrema(&profile_from(&[10.0, 20.0]), 5.0).is_empty());
    }
}
