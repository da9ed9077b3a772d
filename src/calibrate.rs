//! Flat-speed calibration by fixed-iteration bisection.
//!
//! Total moving time is a weakly decreasing function of flat speed: raising
//! the flat speed never adds time anywhere (capped steep brackets are
//! flat-speed-independent, everything else scales). The calibrator exploits
//! that monotonicity with a plain bisection over the speed bounds, run for a
//! fixed number of iterations with no early exit and no convergence check.

use log::debug;

use crate::resample::Segment;
use crate::speed_model::{speed_for_slope, RunnerProfile};

/// Lower calibration bound in km/h.
pub const SPEED_MIN_KMH: f64 = 3.0;
/// Upper calibration bound in km/h.
pub const SPEED_MAX_KMH: f64 = 25.0;
/// Bisection steps; the final bracket width is (max-min) / 2^iterations.
pub const BISECTION_ITERATIONS: u32 = 40;

/// Total modeled moving time in seconds for a candidate flat speed.
///
/// Sums `(length_km / speed) * 3600` over the segments. Returns
/// `f64::INFINITY` immediately if any segment resolves to a non-finite or
/// non-positive speed; callers must treat infinity as "this flat speed is
/// infeasible", not as a numeric error.
pub fn moving_time_for_flat_speed(
    segments: &[Segment],
    flat_kmh: f64,
    profile: RunnerProfile,
    caution: f64,
) -> f64 {
    let mut total = 0.0;
    for segment in segments {
        let speed = speed_for_slope(segment.slope_percent, flat_kmh, profile, caution);
        if !speed.is_finite() || speed <= 0.0 {
            return f64::INFINITY;
        }
        total += segment.length_m / 1000.0 / speed * 3600.0;
    }
    total
}

/// Moving times at the calibration bounds: `(fastest, slowest)` seconds.
///
/// The fastest achievable time is the one at [`SPEED_MAX_KMH`], the slowest
/// at [`SPEED_MIN_KMH`]. A target outside `[fastest, slowest]` cannot be
/// bracketed and should be rejected before bisecting.
pub fn feasible_window(
    segments: &[Segment],
    profile: RunnerProfile,
    caution: f64,
) -> (f64, f64) {
    let fastest = moving_time_for_flat_speed(segments, SPEED_MAX_KMH, profile, caution);
    let slowest = moving_time_for_flat_speed(segments, SPEED_MIN_KMH, profile, caution);
    (fastest, slowest)
}

/// Find the flat speed whose total moving time matches the target.
///
/// Runs [`find_flat_speed_with_bounds`] over the default bounds of
/// [`SPEED_MIN_KMH`]..[`SPEED_MAX_KMH`] for [`BISECTION_ITERATIONS`] steps.
/// Only meaningful when the target lies inside the [`feasible_window`]; the
/// [`crate::compute_pacing`] entry point rejects infeasible targets before
/// calling this.
pub fn find_flat_speed_for_target_time(
    segments: &[Segment],
    target_s: f64,
    profile: RunnerProfile,
    caution: f64,
) -> f64 {
    find_flat_speed_with_bounds(
        segments,
        target_s,
        profile,
        caution,
        (SPEED_MIN_KMH, SPEED_MAX_KMH),
        BISECTION_ITERATIONS,
    )
}

/// Bisection with explicit bounds and iteration count.
///
/// At each step the midpoint speed is evaluated; a modeled time above the
/// target means the candidate is too slow (raise the lower bound), otherwise
/// the upper bound comes down. The midpoint of the final bracket is returned
/// after exactly `iterations` steps.
pub fn find_flat_speed_with_bounds(
    segments: &[Segment],
    target_s: f64,
    profile: RunnerProfile,
    caution: f64,
    bounds: (f64, f64),
    iterations: u32,
) -> f64 {
    let (mut lo, mut hi) = bounds;
    for _ in 0..iterations {
        let mid = (lo + hi) / 2.0;
        let time = moving_time_for_flat_speed(segments, mid, profile, caution);
        if time > target_s {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let flat = (lo + hi) / 2.0;
    debug!(
        "calibrated flat speed {:.4} km/h for target {:.0}s over {} segments",
        flat,
        target_s,
        segments.len()
    );
    flat
}
