//! Segment detail and aggregation: per-kilometer buckets and checkpoint
//! stages.
//!
//! Aggregation works on display-rounded per-segment seconds so every table
//! row sums exactly to its parent. Average pace at any level is total time
//! over total distance, never an average of per-segment paces.
//!
//! Two independent gain/loss families are produced on purpose: the
//! all-points totals over the raw (unsmoothed) elevations, and per-stage
//! totals recomputed from the raw points inside each stage window. Neither
//! is required to agree with the smoothed-segment deltas.

use serde::{Deserialize, Serialize};

use crate::resample::{ResampledPoint, Segment};
use crate::speed_model::{speed_for_slope, RunnerProfile};
use crate::Checkpoint;

/// Checkpoint positions closer than this are merged into one stage boundary.
pub const BOUNDARY_DEDUP_KM: f64 = 0.001;
/// A checkpoint attaches its stop time to a stage ending within this range.
pub const CHECKPOINT_MATCH_KM: f64 = 0.1;

/// One fixed-length segment with its modeled speed and time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDetail {
    pub index: usize,
    pub start_km: f64,
    pub end_km: f64,
    pub length_m: f64,
    pub elevation_delta_m: f64,
    pub slope_percent: f64,
    pub speed_kmh: f64,
    pub pace_s_per_km: f64,
    /// Unrounded modeled time in seconds
    pub exact_time_s: f64,
    /// Display time, rounded to the nearest whole second; aggregates sum this
    pub time_s: u64,
}

/// Summary of the segments whose midpoint falls inside one kilometer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KilometerSummary {
    /// Zero-based kilometer bucket, covering `[km, km + 1)`
    pub km_index: usize,
    pub distance_m: f64,
    pub time_s: u64,
    pub gain_m: f64,
    pub loss_m: f64,
    /// Distance-weighted average slope over the bucket
    pub avg_slope_percent: f64,
    pub pace_s_per_km: f64,
}

/// The course interval between two consecutive stage boundaries.
///
/// Gain and loss are recomputed from the raw points inside the stage window,
/// independently of the segment model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub index: usize,
    pub start_km: f64,
    pub end_km: f64,
    pub distance_km: f64,
    pub gain_m: f64,
    pub loss_m: f64,
    pub moving_time_s: u64,
    pub stop_time_s: u64,
    pub pace_s_per_km: f64,
}

/// Cumulative gain and loss over an elevation sequence.
///
/// Gain sums the positive deltas, loss the absolute negative deltas; flat
/// deltas contribute to neither.
pub fn elevation_gain_loss(elevations: &[f64]) -> (f64, f64) {
    let mut gain = 0.0;
    let mut loss = 0.0;
    for w in elevations.windows(2) {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            gain += delta;
        } else if delta < 0.0 {
            loss += -delta;
        }
    }
    (gain, loss)
}

/// Resolve every segment against the calibrated flat speed.
pub fn segment_details(
    resampled: &[ResampledPoint],
    segments: &[Segment],
    flat_kmh: f64,
    profile: RunnerProfile,
    caution: f64,
) -> Vec<SegmentDetail> {
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let speed_kmh = speed_for_slope(segment.slope_percent, flat_kmh, profile, caution);
            let exact_time_s = segment.length_m / 1000.0 / speed_kmh * 3600.0;
            SegmentDetail {
                index,
                start_km: resampled[index].distance_m / 1000.0,
                end_km: resampled[index + 1].distance_m / 1000.0,
                length_m: segment.length_m,
                elevation_delta_m: segment.elevation_delta_m,
                slope_percent: segment.slope_percent,
                speed_kmh,
                pace_s_per_km: 3600.0 / speed_kmh,
                exact_time_s,
                time_s: exact_time_s.round() as u64,
            }
        })
        .collect()
}

/// Group segments into kilometer buckets by their midpoint distance.
pub fn kilometer_summaries(details: &[SegmentDetail]) -> Vec<KilometerSummary> {
    let mut out: Vec<KilometerSummary> = Vec::new();
    let mut slope_weights: Vec<f64> = Vec::new();

    for detail in details {
        let mid_km = (detail.start_km + detail.end_km) / 2.0;
        let bucket = mid_km.floor() as usize;

        // Midpoints ascend, so a new bucket always opens at the back.
        let reuse = out.last().map(|k| k.km_index) == Some(bucket);
        if !reuse {
            out.push(KilometerSummary {
                km_index: bucket,
                distance_m: 0.0,
                time_s: 0,
                gain_m: 0.0,
                loss_m: 0.0,
                avg_slope_percent: 0.0,
                pace_s_per_km: 0.0,
            });
            slope_weights.push(0.0);
        }

        let summary = out.last_mut().expect("bucket pushed above");
        summary.distance_m += detail.length_m;
        summary.time_s += detail.time_s;
        if detail.elevation_delta_m > 0.0 {
            summary.gain_m += detail.elevation_delta_m;
        } else if detail.elevation_delta_m < 0.0 {
            summary.loss_m += -detail.elevation_delta_m;
        }
        *slope_weights.last_mut().expect("aligned with buckets") +=
            detail.slope_percent * detail.length_m;
    }

    for (summary, weight) in out.iter_mut().zip(slope_weights) {
        if summary.distance_m > 0.0 {
            summary.avg_slope_percent = weight / summary.distance_m;
            summary.pace_s_per_km = summary.time_s as f64 / (summary.distance_m / 1000.0);
        }
    }
    out
}

/// Sorted stage boundaries: 0, the checkpoint positions, the total distance.
///
/// Positions within [`BOUNDARY_DEDUP_KM`] of the previous boundary are
/// merged away; the final boundary always equals the total distance exactly.
pub fn stage_boundaries(checkpoints: &[Checkpoint], total_km: f64) -> Vec<f64> {
    let mut positions: Vec<f64> = checkpoints.iter().map(|c| c.position_km).collect();
    positions.sort_by(|a, b| a.partial_cmp(b).expect("positions validated finite"));

    let mut bounds = vec![0.0];
    for position in positions {
        if position - bounds.last().expect("non-empty") > BOUNDARY_DEDUP_KM {
            bounds.push(position);
        }
    }
    if total_km - bounds.last().expect("non-empty") > BOUNDARY_DEDUP_KM || bounds.len() == 1 {
        bounds.push(total_km);
    } else {
        *bounds.last_mut().expect("non-empty") = total_km;
    }
    bounds
}

/// Build the stage list from checkpoint boundaries.
///
/// # Arguments
/// * `details` - Resolved segments; each contributes its rounded time to the
///   stage holding its midpoint
/// * `raw_elevations` - Filled but unsmoothed elevations, aligned with
///   `cumulative`
/// * `cumulative` - Cumulative distances of the original points in meters
/// * `checkpoints` - Planned stops; order does not matter
/// * `total_km` - Total track distance
pub fn stage_summaries(
    details: &[SegmentDetail],
    raw_elevations: &[f64],
    cumulative: &[f64],
    checkpoints: &[Checkpoint],
    total_km: f64,
) -> Vec<StageSummary> {
    let bounds = stage_boundaries(checkpoints, total_km);
    let count = bounds.len() - 1;

    let mut stages: Vec<StageSummary> = bounds
        .windows(2)
        .enumerate()
        .map(|(index, w)| StageSummary {
            index,
            start_km: w[0],
            end_km: w[1],
            distance_km: w[1] - w[0],
            gain_m: 0.0,
            loss_m: 0.0,
            moving_time_s: 0,
            stop_time_s: 0,
            pace_s_per_km: 0.0,
        })
        .collect();

    // Moving time from contained segments, midpoint rule, single merge pass.
    let mut stage_idx = 0usize;
    for detail in details {
        let mid_km = (detail.start_km + detail.end_km) / 2.0;
        while stage_idx < count - 1 && mid_km >= bounds[stage_idx + 1] {
            stage_idx += 1;
        }
        stages[stage_idx].moving_time_s += detail.time_s;
    }

    // Raw gain/loss recomputed per stage window, inclusive on both ends.
    for (index, stage) in stages.iter_mut().enumerate() {
        let start_m = bounds[index] * 1000.0;
        let end_m = bounds[index + 1] * 1000.0;
        let mut prev: Option<f64> = None;
        for (i, &distance_m) in cumulative.iter().enumerate() {
            if distance_m < start_m {
                continue;
            }
            if distance_m > end_m {
                break;
            }
            let elevation = raw_elevations[i];
            if let Some(previous) = prev {
                let delta = elevation - previous;
                if delta > 0.0 {
                    stage.gain_m += delta;
                } else if delta < 0.0 {
                    stage.loss_m += -delta;
                }
            }
            prev = Some(elevation);
        }
    }

    // Each checkpoint attaches its stop to the nearest stage end, at most
    // once, and only within the match tolerance.
    for checkpoint in checkpoints {
        let mut best: Option<(usize, f64)> = None;
        for (index, stage) in stages.iter().enumerate() {
            let distance = (checkpoint.position_km - stage.end_km).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        if let Some((index, distance)) = best {
            if distance <= CHECKPOINT_MATCH_KM {
                stages[index].stop_time_s += (checkpoint.stop_minutes * 60.0).round() as u64;
            }
        }
    }

    for stage in stages.iter_mut() {
        if stage.distance_km > 0.0 {
            stage.pace_s_per_km = stage.moving_time_s as f64 / stage.distance_km;
        }
    }
    stages
}
