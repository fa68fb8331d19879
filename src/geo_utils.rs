use geo::{Distance, Haversine, Point};

use crate::gpx_types::TrackPoint;

/// Great-circle distance between two track points, in meters.
pub fn haversine_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let p1 = Point::new(a.lon, a.lat);
    let p2 = Point::new(b.lon, b.lat);
    Haversine::distance(p1, p2)
}

/// Cumulative distance along a point sequence, in meters.
///
/// `result[0]` is 0.0 and `result[i]` is the distance travelled from the
/// first point through point `i`. Empty input yields an empty vector.
pub fn cumulative_distances(points: &[TrackPoint]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, pt) in points.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(&points[i - 1], pt);
        }
        cumulative.push(total);
    }
    cumulative
}

/// Total length of a point sequence, in meters.
pub fn polyline_length(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_distance() {
        // London to Paris is roughly 344 km.
        let london = TrackPoint::new(51.5074, -0.1278);
        let paris = TrackPoint::new(48.8566, 2.3522);
        let d = haversine_distance(&london, &paris);
        assert!((d - 344_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = TrackPoint::new(35.0, 139.0);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn cumulative_is_monotonic() {
        let points = vec![
            TrackPoint::new(35.0, 139.0),
            TrackPoint::new(35.001, 139.0),
            TrackPoint::new(35.002, 139.0),
        ];
        let cum = cumulative_distances(&points);
        assert_eq!(cum.len(), 3);
        assert_eq!(cum[0], 0.0);
        assert!(cum[1] > 0.0);
        assert!(cum[2] > cum[1]);
        assert!((cum[2] - polyline_length(&points)).abs() < 1e-9);
    }

    #[test]
    fn empty_and_single() {
        assert!(cumulative_distances(&[]).is_empty());
        let one = [TrackPoint::new(0.0, 0.0)];
        assert_eq!(cumulative_distances(&one), vec![0.0]);
        assert_eq!(polyline_length(&one), 0.0);
    }
}
