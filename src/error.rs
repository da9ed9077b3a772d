//! Unified error handling for the pace-planner library.
//!
//! Every failure of a single `compute_pacing` call is terminal: there is no
//! partial or degraded plan. Each variant names the violated precondition so
//! a caller can surface the message verbatim.

use std::fmt;

/// Unified error type for pacing-plan operations.
#[derive(Debug, Clone)]
pub enum PacingError {
    /// Track has too few usable points for planning
    InsufficientPoints {
        point_count: usize,
        minimum_required: usize,
    },
    /// Track input could not be parsed
    TrackParse { message: String },
    /// Target time string is not HH:MM or HH:MM:SS
    TimeFormat { input: String, message: String },
    /// An input parameter is out of its valid range
    InvalidParameter { message: String },
    /// Calibration bounds cannot bracket the requested moving time
    InfeasibleTarget {
        target_s: f64,
        fastest_s: f64,
        slowest_s: f64,
    },
    /// Persistence/storage error
    Store { message: String },
}

impl fmt::Display for PacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacingError::InsufficientPoints {
                point_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "track has {} points, minimum {} required",
                    point_count, minimum_required
                )
            }
            PacingError::TrackParse { message } => {
                write!(f, "failed to parse track: {}", message)
            }
            PacingError::TimeFormat { input, message } => {
                write!(f, "invalid time '{}': {}", input, message)
            }
            PacingError::InvalidParameter { message } => {
                write!(f, "invalid parameter: {}", message)
            }
            PacingError::InfeasibleTarget {
                target_s,
                fastest_s,
                slowest_s,
            } => {
                write!(
                    f,
                    "target moving time {:.0}s is outside the achievable window [{:.0}s, {:.0}s] \
                     for the calibration speed bounds",
                    target_s, fastest_s, slowest_s
                )
            }
            PacingError::Store { message } => {
                write!(f, "plan store error: {}", message)
            }
        }
    }
}

impl std::error::Error for PacingError {}

/// Result type alias for pace-planner operations.
pub type Result<T> = std::result::Result<T, PacingError>;
