//! # Pace Planner
//!
//! Terrain-aware pacing plans for long-distance runs, computed from a
//! recorded GPS track.
//!
//! Given a route, a target finish time, a runner profile and the planned
//! rest stops, the engine produces a segment-by-segment speed plan that
//! respects terrain slope and sums to the target time:
//!
//! 1. Elevation conditioning (gap fill + moving-average smoothing)
//! 2. Distance accumulation and fixed-step resampling
//! 3. A piecewise slope-to-speed model
//! 4. Bisection calibration of the one free parameter, the flat-ground speed
//! 5. Aggregation into per-segment, per-kilometer and per-stage tables
//!
//! The engine is a pure function: no global state, no I/O, independently
//! reentrant per invocation.
//!
//! ## Features
//!
//! - **`parallel`** - Batch scenario evaluation with rayon
//! - **`gpx`** - GPX track extraction
//! - **`persistence`** - Named plan-input store on SQLite
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use pace_planner::{compute_pacing, PlanConfig, TrackPoint};
//!
//! let points = vec![
//!     TrackPoint::new(45.0, 6.0, 1200.0),
//!     TrackPoint::new(45.0, 6.01, 1210.0),
//!     TrackPoint::new(45.0, 6.02, 1195.0),
//! ];
//!
//! let plan = compute_pacing(&points, "00:12", &PlanConfig::default()).unwrap();
//! assert!(plan.calibration.flat_speed_kmh > 0.0);
//! assert_eq!(plan.totals.target_time_s, 720);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{PacingError, Result};

// Geographic utilities (haversine, cumulative distance)
pub mod geo_utils;

// Elevation conditioning (gap fill, smoothing)
pub mod elevation;

// Fixed-step resampling and segment construction
pub mod resample;
pub use resample::{ResampledPoint, Segment};

// Slope-dependent speed model
pub mod speed_model;
pub use speed_model::{speed_for_slope, RunnerProfile};

// Flat-speed calibration
pub mod calibrate;
pub use calibrate::{
    find_flat_speed_for_target_time, moving_time_for_flat_speed, BISECTION_ITERATIONS,
    SPEED_MAX_KMH, SPEED_MIN_KMH,
};

// Aggregation into kilometer and stage tables
pub mod aggregate;
pub use aggregate::{KilometerSummary, SegmentDetail, StageSummary};

// Plan computation entry point
pub mod plan;
#[cfg(feature = "parallel")]
pub use plan::compute_pacing_batch;
pub use plan::{compute_pacing, Calibration, PacingResult, PlanTotals};

// Time and pace presentation helpers
pub mod format;

// GPX extraction collaborator
#[cfg(feature = "gpx")]
pub mod gpx_input;
#[cfg(feature = "gpx")]
pub use gpx_input::{track_points_from_file, track_points_from_reader};

// Named plan-input persistence collaborator
#[cfg(feature = "persistence")]
pub mod store;
#[cfg(feature = "persistence")]
pub use store::{PlanStore, SavedPlan};

// ============================================================================
// Core Types
// ============================================================================

/// A recorded track point: geodetic position plus altitude in meters.
///
/// A missing or invalid elevation is represented as NaN and resolved by the
/// conditioning pass before any computation uses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(lat: f64, lon: f64, elevation: f64) -> Self {
        Self {
            lat,
            lon,
            elevation,
        }
    }

    /// Create a track point with a missing elevation.
    pub fn without_elevation(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: f64::NAN,
        }
    }
}

/// A fixed-distance point where a timed stop occurs (aid station).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position_km: f64,
    pub stop_minutes: f64,
}

impl Checkpoint {
    pub fn new(position_km: f64, stop_minutes: f64) -> Self {
        Self {
            position_km,
            stop_minutes,
        }
    }
}

/// Aggregate rest time added once to the total, not tied to a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RestPeriods {
    pub count: u32,
    pub minutes_each: f64,
}

impl RestPeriods {
    pub fn new(count: u32, minutes_each: f64) -> Self {
        Self {
            count,
            minutes_each,
        }
    }

    /// Total rest time in whole seconds.
    pub fn total_seconds(&self) -> u64 {
        (self.count as f64 * self.minutes_each * 60.0).round() as u64
    }
}

/// Configuration for a pacing plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Runner fitness profile
    pub profile: RunnerProfile,
    /// 0 (optimistic) to 1 (conservative); selects a point inside the capped
    /// steep-grade speed ranges
    pub caution: f64,
    /// Planned aid-station stops
    pub checkpoints: Vec<Checkpoint>,
    /// Positionless aggregate rest time
    pub rest: RestPeriods,
    /// Fixed resampling interval in meters
    pub resample_step_m: f64,
    /// Centered moving-average window for elevation smoothing; odd, 1 = off
    pub smoothing_window: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            profile: RunnerProfile::Standard,
            caution: 0.5,
            checkpoints: Vec::new(),
            rest: RestPeriods::default(),
            resample_step_m: 250.0,
            smoothing_window: 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlanConfig::default();
        assert_eq!(config.resample_step_m, 250.0);
        assert_eq!(config.smoothing_window, 9);
        assert_eq!(config.caution, 0.5);
        assert!(config.checkpoints.is_empty());
    }

    #[test]
    fn test_missing_elevation_sentinel() {
        let point = TrackPoint::without_elevation(46.0, 7.0);
        assert!(point.elevation.is_nan());
    }

    #[test]
    fn test_rest_periods_total() {
        assert_eq!(RestPeriods::new(3, 2.5).total_seconds(), 450);
        assert_eq!(RestPeriods::default().total_seconds(), 0);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = PlanConfig {
            profile: RunnerProfile::Trained,
            caution: 0.2,
            checkpoints: vec![Checkpoint::new(12.5, 10.0)],
            rest: RestPeriods::new(2, 5.0),
            resample_step_m: 200.0,
            smoothing_window: 7,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"trained\""));
        let back: PlanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.checkpoints, config.checkpoints);
        assert_eq!(back.smoothing_window, 7);
    }
}
