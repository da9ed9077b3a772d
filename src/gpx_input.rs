//! GPX track extraction.
//!
//! The engine is indifferent to where its points come from; this
//! collaborator turns a GPX document into the flat point sequence the
//! engine consumes. Multiple tracks and segments are concatenated in
//! document order, nothing more.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{PacingError, Result};
use crate::plan::MIN_TRACK_POINTS;
use crate::TrackPoint;

/// Extract track points from a GPX document.
///
/// Missing `<ele>` values become the NaN sentinel for the conditioning
/// pass.
pub fn track_points_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<TrackPoint>> {
    let document = gpx::read(BufReader::new(reader)).map_err(|e| PacingError::TrackParse {
        message: e.to_string(),
    })?;

    let mut points = Vec::new();
    for track in &document.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let position = waypoint.point();
                points.push(TrackPoint {
                    lat: position.y(),
                    lon: position.x(),
                    elevation: waypoint.elevation.unwrap_or(f64::NAN),
                });
            }
        }
    }

    if points.len() < MIN_TRACK_POINTS {
        return Err(PacingError::InsufficientPoints {
            point_count: points.len(),
            minimum_required: MIN_TRACK_POINTS,
        });
    }
    Ok(points)
}

/// Extract track points from a GPX file on disk.
pub fn track_points_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TrackPoint>> {
    let file = File::open(path.as_ref()).map_err(|e| PacingError::TrackParse {
        message: format!("{}: {}", path.as_ref().display(), e),
    })?;
    track_points_from_reader(file)
}
