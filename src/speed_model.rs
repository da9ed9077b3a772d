//! Slope-dependent speed model.
//!
//! A pure, deterministic, piecewise mapping from segment slope to running
//! speed. Near-flat and moderate grades scale the calibrated flat speed;
//! steep grades switch to capped speed ranges where the flat speed no longer
//! matters and the caution factor picks a point inside the range. The
//! brackets are discontinuous at their edges on purpose; calibration and all
//! downstream totals depend on the exact shape of this function.
//!
//! | slope %            | speed (km/h)                          |
//! |--------------------|---------------------------------------|
//! | [-1, 1]            | flat                                  |
//! | (1, 12]            | flat / (1 + 0.04*slope)               |
//! | (12, 15]           | 5.45..6.00 trained, 4.62..5.45 std    |
//! | (15, 20]           | 4.80..5.45 trained, 4.00..4.62 std    |
//! | (20, inf)          | 4.00..4.62 trained, 3.33..4.00 std    |
//! | [-3, -1)           | flat / (1 - 0.02*|slope|)             |
//! | [-4, -3)           | flat / ((1 - 0.02*|slope|) * 1.05)    |
//! | [-6, -4)           | flat / ((1 - 0.02*|slope|) * 1.10)    |
//! | [-8, -6)           | 5.45..6.67                            |
//! | [-12, -8)          | 4.62..6.00                            |
//! | (-inf, -12)        | 4.00..5.45                            |
//!
//! Ranges read as `slow..fast`; caution 0 picks the fast bound, caution 1
//! the slow bound.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PacingError;

/// Runner fitness profile, selecting the steep-grade speed ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerProfile {
    Trained,
    Standard,
}

impl RunnerProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerProfile::Trained => "trained",
            RunnerProfile::Standard => "standard",
        }
    }
}

impl FromStr for RunnerProfile {
    type Err = PacingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trained" => Ok(RunnerProfile::Trained),
            "standard" => Ok(RunnerProfile::Standard),
            other => Err(PacingError::InvalidParameter {
                message: format!("unknown profile '{}', expected trained or standard", other),
            }),
        }
    }
}

/// Pick a speed inside `[min_kmh, max_kmh]` by caution factor.
///
/// Caution 0 yields the fast bound, caution 1 the slow bound, linearly in
/// between.
fn range_pick(min_kmh: f64, max_kmh: f64, caution: f64) -> f64 {
    max_kmh - caution * (max_kmh - min_kmh)
}

/// Speed in km/h for a segment of the given slope.
///
/// # Arguments
/// * `slope_percent` - Segment slope (elevation delta over length, percent)
/// * `flat_kmh` - Calibrated flat-ground speed in km/h
/// * `profile` - Runner fitness profile
/// * `caution` - 0 (optimistic) to 1 (conservative), applied inside capped
///   ranges only
///
/// # Example
/// ```
/// use pace_planner::{speed_for_slope, RunnerProfile};
///
/// // Flat ground returns the flat speed unchanged.
/// let v = speed_for_slope(0.0, 10.0, RunnerProfile::Trained, 0.5);
/// assert_eq!(v, 10.0);
/// ```
pub fn speed_for_slope(
    slope_percent: f64,
    flat_kmh: f64,
    profile: RunnerProfile,
    caution: f64,
) -> f64 {
    if (-1.0..=1.0).contains(&slope_percent) {
        return flat_kmh;
    }

    if slope_percent > 1.0 {
        return if slope_percent <= 12.0 {
            flat_kmh / (1.0 + 0.04 * slope_percent)
        } else if slope_percent <= 15.0 {
            match profile {
                RunnerProfile::Trained => range_pick(5.45, 6.00, caution),
                RunnerProfile::Standard => range_pick(4.62, 5.45, caution),
            }
        } else if slope_percent <= 20.0 {
            match profile {
                RunnerProfile::Trained => range_pick(4.80, 5.45, caution),
                RunnerProfile::Standard => range_pick(4.00, 4.62, caution),
            }
        } else {
            match profile {
                RunnerProfile::Trained => range_pick(4.00, 4.62, caution),
                RunnerProfile::Standard => range_pick(3.33, 4.00, caution),
            }
        };
    }

    let grade = slope_percent.abs();
    if slope_percent >= -3.0 {
        flat_kmh / (1.0 - 0.02 * grade)
    } else if slope_percent >= -4.0 {
        flat_kmh / ((1.0 - 0.02 * grade) * 1.05)
    } else if slope_percent >= -6.0 {
        flat_kmh / ((1.0 - 0.02 * grade) * 1.10)
    } else if slope_percent >= -8.0 {
        range_pick(5.45, 6.67, caution)
    } else if slope_percent >= -12.0 {
        range_pick(4.62, 6.00, caution)
    } else {
        range_pick(4.00, 5.45, caution)
    }
}
