//! Geographic utilities: great-circle distance and along-track accumulation.

use crate::TrackPoint;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine formula).
///
/// NaN coordinates propagate as NaN.
///
/// # Example
/// ```
/// use pace_planner::{geo_utils::haversine_distance, TrackPoint};
///
/// let london = TrackPoint::new(51.5074, -0.1278, 0.0);
/// let paris = TrackPoint::new(48.8566, 2.3522, 0.0);
/// let d = haversine_distance(&london, &paris);
/// assert!((d / 1000.0 - 344.0).abs() < 5.0);
/// ```
pub fn haversine_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Cumulative along-track distance for every point, in meters.
///
/// The output is aligned 1:1 with the input: `out[0] == 0.0` and the
/// sequence is monotonically non-decreasing.
pub fn cumulative_distances(points: &[TrackPoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            acc += haversine_distance(&points[i - 1], point);
        }
        out.push(acc);
    }
    out
}

/// Total along-track length of a point sequence in meters.
pub fn polyline_length(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_equator_step() {
        // 0.01 degrees of longitude on the equator is ~1111.95 m
        let a = TrackPoint::new(0.0, 0.0, 0.0);
        let b = TrackPoint::new(0.0, 0.01, 0.0);
        let d = haversine_distance(&a, &b);
        assert!((d - 1111.95).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_haversine_zero_distance() {
        let a = TrackPoint::new(47.0, 8.0, 500.0);
        assert_eq!(haversine_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_haversine_nan_propagates() {
        let a = TrackPoint::new(f64::NAN, 0.0, 0.0);
        let b = TrackPoint::new(0.0, 0.01, 0.0);
        assert!(haversine_distance(&a, &b).is_nan());
    }

    #[test]
    fn test_cumulative_distances() {
        let points = vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.01, 0.0),
            TrackPoint::new(0.0, 0.02, 0.0),
        ];
        let cum = cumulative_distances(&points);
        assert_eq!(cum.len(), 3);
        assert_eq!(cum[0], 0.0);
        assert!(cum[1] < cum[2]);
        assert!((cum[2] - polyline_length(&points)).abs() < 1e-9);
    }
}
