//! Fixed-step track resampling.
//!
//! Rebuilds an irregularly-spaced point sequence as uniform segments by
//! linear interpolation along the cumulative distance. The resampled track
//! is the atomic input of the speed model: every downstream time total is a
//! sum over the segments produced here.

use serde::{Deserialize, Serialize};

use crate::TrackPoint;

/// A point interpolated at a fixed along-track distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampledPoint {
    /// Position in the resampled sequence
    pub index: usize,
    /// Along-track distance from the start in meters
    pub distance_m: f64,
    pub lat: f64,
    pub lon: f64,
    /// Interpolated (conditioned) elevation in meters
    pub elevation: f64,
}

/// The interval between two consecutive resampled points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub length_m: f64,
    pub elevation_delta_m: f64,
    /// Elevation delta over length, as a percentage; 0 for zero length
    pub slope_percent: f64,
}

/// Resample a track at fixed `step_m` intervals.
///
/// Target distances are `0, step, 2*step, ... < total`, plus the exact total
/// distance as a final target, so the last segment may be shorter than
/// `step_m`. The bracketing original-point pair for each target is located
/// by a forward-advancing pointer over the cumulative distances (a single
/// linear-time merge pass, never re-scanning from the start), and latitude,
/// longitude and elevation are interpolated by the fractional position
/// between the bracketing points. A zero-length bracket interpolates at
/// fraction 0.
///
/// `points` and `cumulative` must be aligned 1:1 with at least 2 entries.
pub fn resample_points(
    points: &[TrackPoint],
    cumulative: &[f64],
    step_m: f64,
) -> Vec<ResampledPoint> {
    debug_assert_eq!(points.len(), cumulative.len());
    debug_assert!(points.len() >= 2);

    let total = *cumulative.last().unwrap_or(&0.0);

    let mut targets: Vec<f64> = Vec::new();
    let mut k = 0usize;
    loop {
        let d = k as f64 * step_m;
        if d >= total {
            break;
        }
        targets.push(d);
        k += 1;
    }
    targets.push(total);

    let mut out = Vec::with_capacity(targets.len());
    let mut seg = 0usize;
    for (index, &target) in targets.iter().enumerate() {
        while seg < cumulative.len() - 2 && cumulative[seg + 1] < target {
            seg += 1;
        }
        let d0 = cumulative[seg];
        let d1 = cumulative[seg + 1];
        let span = d1 - d0;
        let frac = if span > 0.0 { (target - d0) / span } else { 0.0 };

        let a = &points[seg];
        let b = &points[seg + 1];
        out.push(ResampledPoint {
            index,
            distance_m: target,
            lat: a.lat + (b.lat - a.lat) * frac,
            lon: a.lon + (b.lon - a.lon) * frac,
            elevation: a.elevation + (b.elevation - a.elevation) * frac,
        });
    }
    out
}

/// Build the segment list between consecutive resampled points.
pub fn segments_between(resampled: &[ResampledPoint]) -> Vec<Segment> {
    resampled
        .windows(2)
        .map(|w| {
            let length_m = w[1].distance_m - w[0].distance_m;
            let elevation_delta_m = w[1].elevation - w[0].elevation;
            let slope_percent = if length_m > 0.0 {
                elevation_delta_m / length_m * 100.0
            } else {
                0.0
            };
            Segment {
                length_m,
                elevation_delta_m,
                slope_percent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::cumulative_distances;

    fn equator_track(count: usize, lon_step: f64) -> (Vec<TrackPoint>, Vec<f64>) {
        let points: Vec<TrackPoint> = (0..count)
            .map(|i| TrackPoint::new(0.0, i as f64 * lon_step, 100.0 + i as f64))
            .collect();
        let cum = cumulative_distances(&points);
        (points, cum)
    }

    #[test]
    fn test_last_point_hits_total_exactly() {
        let (points, cum) = equator_track(10, 0.001);
        let total = *cum.last().unwrap();
        let resampled = resample_points(&points, &cum, 250.0);
        assert_eq!(resampled.last().unwrap().distance_m, total);
        assert_eq!(resampled[0].distance_m, 0.0);
    }

    #[test]
    fn test_segment_lengths_sum_to_total() {
        let (points, cum) = equator_track(50, 0.001);
        let total = *cum.last().unwrap();
        let resampled = resample_points(&points, &cum, 250.0);
        let segments = segments_between(&resampled);
        let sum: f64 = segments.iter().map(|s| s.length_m).sum();
        assert!((sum - total).abs() < 1e-6);
    }

    #[test]
    fn test_distances_strictly_increase() {
        let (points, cum) = equator_track(30, 0.001);
        let resampled = resample_points(&points, &cum, 100.0);
        for w in resampled.windows(2) {
            assert!(w[1].distance_m > w[0].distance_m);
        }
    }

    #[test]
    fn test_elevation_interpolates_between_brackets() {
        // Two points 1111.95 m apart, elevation 0 -> 100.
        let points = vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.01, 100.0),
        ];
        let cum = cumulative_distances(&points);
        let resampled = resample_points(&points, &cum, 250.0);
        // Targets: 0, 250, 500, 750, 1000, total.
        assert_eq!(resampled.len(), 6);
        let mid = &resampled[2];
        let expected = 500.0 / cum[1] * 100.0;
        assert!((mid.elevation - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_bracket_uses_fraction_zero() {
        // Duplicate point produces a zero-length original segment.
        let points = vec![
            TrackPoint::new(0.0, 0.0, 50.0),
            TrackPoint::new(0.0, 0.0, 60.0),
            TrackPoint::new(0.0, 0.01, 70.0),
        ];
        let cum = cumulative_distances(&points);
        let resampled = resample_points(&points, &cum, 2000.0);
        // Only targets 0 and total; the first bracket has zero span.
        assert_eq!(resampled[0].elevation, 50.0);
        assert_eq!(resampled.last().unwrap().elevation, 70.0);
    }

    #[test]
    fn test_zero_length_segment_has_zero_slope() {
        let a = ResampledPoint {
            index: 0,
            distance_m: 100.0,
            lat: 0.0,
            lon: 0.0,
            elevation: 10.0,
        };
        let b = ResampledPoint {
            index: 1,
            distance_m: 100.0,
            lat: 0.0,
            lon: 0.0,
            elevation: 20.0,
        };
        let segments = segments_between(&[a, b]);
        assert_eq!(segments[0].slope_percent, 0.0);
    }
}
