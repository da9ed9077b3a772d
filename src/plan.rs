//! Pacing plan computation.
//!
//! `compute_pacing` is the single entry point of the engine: a pure function
//! from (track points, target time, plan configuration) to a
//! [`PacingResult`]. Every invocation validates its inputs, conditions the
//! elevation profile, resamples the track, calibrates the flat speed and
//! rebuilds all aggregates from scratch; nothing is cached or mutated in
//! place, so concurrent invocations are independent.

use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    elevation_gain_loss, kilometer_summaries, segment_details, stage_summaries, KilometerSummary,
    SegmentDetail, StageSummary,
};
use crate::calibrate::{feasible_window, find_flat_speed_for_target_time, moving_time_for_flat_speed};
use crate::elevation::{fill_missing_elevation, smooth_elevation};
use crate::error::{PacingError, Result};
use crate::format::parse_duration;
use crate::geo_utils::cumulative_distances;
use crate::resample::{resample_points, segments_between};
use crate::{PlanConfig, TrackPoint};

/// Minimum usable track points.
pub const MIN_TRACK_POINTS: usize = 2;

/// Distance, elevation and time totals of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTotals {
    pub distance_km: f64,
    /// All-points D+ over the raw (unsmoothed) elevations
    pub ascent_m: f64,
    /// All-points D- over the raw (unsmoothed) elevations
    pub descent_m: f64,
    /// Sum of the rounded per-segment seconds
    pub moving_time_s: u64,
    /// Checkpoint stops plus rest periods
    pub stop_time_s: u64,
    pub total_time_s: u64,
    pub target_time_s: u64,
}

/// Outcome of the flat-speed calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    pub flat_speed_kmh: f64,
    pub flat_pace_s_per_km: f64,
    /// Continuous (unrounded) moving time at the calibrated speed
    pub modeled_moving_time_s: f64,
}

/// The full pacing plan: totals, calibration, and the ordered stage,
/// per-kilometer and per-segment tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingResult {
    pub totals: PlanTotals,
    pub calibration: Calibration,
    pub stages: Vec<StageSummary>,
    pub kilometers: Vec<KilometerSummary>,
    pub segments: Vec<SegmentDetail>,
}

/// Compute a pacing plan for a recorded track.
///
/// # Arguments
/// * `points` - Recorded track, at least 2 points; missing elevations are
///   the NaN sentinel
/// * `target_time` - Total target time as `HH:MM` or `HH:MM:SS`
/// * `config` - Profile, caution, stops and tuning parameters
///
/// # Errors
/// Fails without a partial result on malformed input, out-of-range
/// parameters, or a target the calibration bounds cannot bracket.
pub fn compute_pacing(
    points: &[TrackPoint],
    target_time: &str,
    config: &PlanConfig,
) -> Result<PacingResult> {
    if points.len() < MIN_TRACK_POINTS {
        return Err(PacingError::InsufficientPoints {
            point_count: points.len(),
            minimum_required: MIN_TRACK_POINTS,
        });
    }
    let target_time_s = parse_duration(target_time)?;
    validate_config(config)?;

    let raw_elevations: Vec<f64> = points.iter().map(|p| p.elevation).collect();
    let filled = fill_missing_elevation(&raw_elevations);

    let cumulative = cumulative_distances(points);
    let total_m = *cumulative.last().expect("length checked above");
    if !(total_m > 0.0) {
        return Err(PacingError::InvalidParameter {
            message: "track has zero length".to_string(),
        });
    }
    let total_km = total_m / 1000.0;

    for checkpoint in &config.checkpoints {
        if checkpoint.position_km >= total_km {
            return Err(PacingError::InvalidParameter {
                message: format!(
                    "checkpoint at {:.3} km is at or beyond the track end ({:.3} km)",
                    checkpoint.position_km, total_km
                ),
            });
        }
    }

    let checkpoint_stop_s: u64 = config
        .checkpoints
        .iter()
        .map(|c| (c.stop_minutes * 60.0).round() as u64)
        .sum();
    let stop_time_s = checkpoint_stop_s + config.rest.total_seconds();
    if stop_time_s >= target_time_s {
        return Err(PacingError::InvalidParameter {
            message: format!(
                "total stop time {}s meets or exceeds the target time {}s",
                stop_time_s, target_time_s
            ),
        });
    }
    let target_moving_s = (target_time_s - stop_time_s) as f64;

    let smoothed = smooth_elevation(&filled, config.smoothing_window);
    let conditioned: Vec<TrackPoint> = points
        .iter()
        .zip(&smoothed)
        .map(|(p, &elevation)| TrackPoint::new(p.lat, p.lon, elevation))
        .collect();

    let resampled = resample_points(&conditioned, &cumulative, config.resample_step_m);
    let segments = segments_between(&resampled);

    let (fastest_s, slowest_s) = feasible_window(&segments, config.profile, config.caution);
    if target_moving_s < fastest_s || target_moving_s > slowest_s {
        return Err(PacingError::InfeasibleTarget {
            target_s: target_moving_s,
            fastest_s,
            slowest_s,
        });
    }

    let flat_speed_kmh =
        find_flat_speed_for_target_time(&segments, target_moving_s, config.profile, config.caution);
    let modeled_moving_time_s =
        moving_time_for_flat_speed(&segments, flat_speed_kmh, config.profile, config.caution);

    let details = segment_details(
        &resampled,
        &segments,
        flat_speed_kmh,
        config.profile,
        config.caution,
    );
    let kilometers = kilometer_summaries(&details);
    let stages = stage_summaries(&details, &filled, &cumulative, &config.checkpoints, total_km);

    let (ascent_m, descent_m) = elevation_gain_loss(&filled);
    let moving_time_s: u64 = details.iter().map(|d| d.time_s).sum();

    info!(
        "pacing plan: {:.2} km, {} segments, {} stages, flat speed {:.2} km/h",
        total_km,
        details.len(),
        stages.len(),
        flat_speed_kmh
    );

    Ok(PacingResult {
        totals: PlanTotals {
            distance_km: total_km,
            ascent_m,
            descent_m,
            moving_time_s,
            stop_time_s,
            total_time_s: moving_time_s + stop_time_s,
            target_time_s,
        },
        calibration: Calibration {
            flat_speed_kmh,
            flat_pace_s_per_km: 3600.0 / flat_speed_kmh,
            modeled_moving_time_s,
        },
        stages,
        kilometers,
        segments: details,
    })
}

/// Evaluate several target/configuration scenarios over one track in
/// parallel.
///
/// Each scenario is an independent `compute_pacing` call; the engine reads
/// no shared state, so the results are identical to running them serially.
#[cfg(feature = "parallel")]
pub fn compute_pacing_batch(
    points: &[TrackPoint],
    scenarios: &[(String, PlanConfig)],
) -> Vec<Result<PacingResult>> {
    scenarios
        .par_iter()
        .map(|(target_time, config)| compute_pacing(points, target_time, config))
        .collect()
}

fn validate_config(config: &PlanConfig) -> Result<()> {
    if !config.caution.is_finite() || !(0.0..=1.0).contains(&config.caution) {
        return Err(PacingError::InvalidParameter {
            message: format!("caution {} is outside [0, 1]", config.caution),
        });
    }
    if config.smoothing_window < 1 || config.smoothing_window % 2 == 0 {
        return Err(PacingError::InvalidParameter {
            message: format!(
                "smoothing window {} must be an odd integer >= 1",
                config.smoothing_window
            ),
        });
    }
    if !config.resample_step_m.is_finite() || config.resample_step_m <= 0.0 {
        return Err(PacingError::InvalidParameter {
            message: format!("resample step {} m must be positive", config.resample_step_m),
        });
    }
    if !config.rest.minutes_each.is_finite() || config.rest.minutes_each < 0.0 {
        return Err(PacingError::InvalidParameter {
            message: "rest period minutes must be non-negative".to_string(),
        });
    }
    for checkpoint in &config.checkpoints {
        if !checkpoint.position_km.is_finite() || checkpoint.position_km <= 0.0 {
            return Err(PacingError::InvalidParameter {
                message: format!(
                    "checkpoint position {} km must be positive",
                    checkpoint.position_km
                ),
            });
        }
        if !checkpoint.stop_minutes.is_finite() || checkpoint.stop_minutes < 0.0 {
            return Err(PacingError::InvalidParameter {
                message: format!(
                    "checkpoint stop of {} minutes must be non-negative",
                    checkpoint.stop_minutes
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Checkpoint, RunnerProfile};

    fn flat_course() -> Vec<TrackPoint> {
        // ~5.6 km along the equator, mild rolls.
        (0..51)
            .map(|i| TrackPoint::new(0.0, i as f64 * 0.001, 100.0 + (i % 5) as f64))
            .collect()
    }

    #[test]
    fn test_rejects_single_point() {
        let points = vec![TrackPoint::new(0.0, 0.0, 0.0)];
        let err = compute_pacing(&points, "01:00", &PlanConfig::default()).unwrap_err();
        assert!(matches!(err, PacingError::InsufficientPoints { point_count: 1, .. }));
    }

    #[test]
    fn test_rejects_even_smoothing_window() {
        let config = PlanConfig {
            smoothing_window: 2,
            ..PlanConfig::default()
        };
        let err = compute_pacing(&flat_course(), "01:00", &config).unwrap_err();
        assert!(matches!(err, PacingError::InvalidParameter { .. }));
        assert!(err.to_string().contains("smoothing window"));
    }

    #[test]
    fn test_rejects_caution_out_of_range() {
        let config = PlanConfig {
            caution: 1.5,
            ..PlanConfig::default()
        };
        assert!(compute_pacing(&flat_course(), "01:00", &config).is_err());
    }

    #[test]
    fn test_rejects_non_positive_resample_step() {
        let config = PlanConfig {
            resample_step_m: 0.0,
            ..PlanConfig::default()
        };
        assert!(compute_pacing(&flat_course(), "01:00", &config).is_err());
    }

    #[test]
    fn test_rejects_zero_length_track() {
        let points = vec![TrackPoint::new(10.0, 10.0, 5.0); 4];
        let err = compute_pacing(&points, "01:00", &PlanConfig::default()).unwrap_err();
        assert!(err.to_string().contains("zero length"));
    }

    #[test]
    fn test_rejects_checkpoint_beyond_track_end() {
        let config = PlanConfig {
            checkpoints: vec![Checkpoint::new(50.0, 5.0)],
            ..PlanConfig::default()
        };
        let err = compute_pacing(&flat_course(), "01:00", &config).unwrap_err();
        assert!(err.to_string().contains("beyond the track end"));
    }

    #[test]
    fn test_rejects_stop_time_exceeding_target() {
        let config = PlanConfig {
            checkpoints: vec![Checkpoint::new(2.0, 45.0), Checkpoint::new(4.0, 30.0)],
            ..PlanConfig::default()
        };
        let err = compute_pacing(&flat_course(), "01:00", &config).unwrap_err();
        assert!(matches!(err, PacingError::InvalidParameter { .. }));
        assert!(err.to_string().contains("stop time"));
    }

    #[test]
    fn test_infeasible_target_is_rejected() {
        // ~1112 m with 100 m of gain. A one hour target implies a flat
        // speed far below the 3 km/h floor, so the calibrator refuses
        // instead of clamping to a boundary.
        let points = vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.01, 100.0),
        ];
        let config = PlanConfig {
            profile: RunnerProfile::Trained,
            caution: 0.5,
            ..PlanConfig::default()
        };
        let err = compute_pacing(&points, "01:00:00", &config).unwrap_err();
        match err {
            PacingError::InfeasibleTarget { target_s, slowest_s, .. } => {
                assert_eq!(target_s, 3600.0);
                assert!(slowest_s < target_s);
            }
            other => panic!("expected InfeasibleTarget, got {}", other),
        }
    }

    #[test]
    fn test_two_point_track_distance() {
        let points = vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(0.0, 0.01, 100.0),
        ];
        // A 20 minute target is feasible on this course.
        let plan = compute_pacing(&points, "00:20", &PlanConfig::default()).unwrap();
        assert!((plan.totals.distance_km - 1.1119).abs() < 0.001);
    }

    #[test]
    fn test_calibration_matches_target_moving_time() {
        let plan = compute_pacing(&flat_course(), "00:45", &PlanConfig::default()).unwrap();
        assert!((plan.calibration.modeled_moving_time_s - 2700.0).abs() < 1e-3);
        assert!(plan.calibration.flat_speed_kmh > 3.0);
        assert!(plan.calibration.flat_speed_kmh < 25.0);
    }

    #[test]
    fn test_totals_are_consistent() {
        let config = PlanConfig {
            checkpoints: vec![Checkpoint::new(2.0, 5.0)],
            ..PlanConfig::default()
        };
        let plan = compute_pacing(&flat_course(), "01:00", &config).unwrap();
        let segment_sum: u64 = plan.segments.iter().map(|s| s.time_s).sum();
        assert_eq!(plan.totals.moving_time_s, segment_sum);
        assert_eq!(plan.totals.stop_time_s, 300);
        assert_eq!(
            plan.totals.total_time_s,
            plan.totals.moving_time_s + plan.totals.stop_time_s
        );
    }
}
