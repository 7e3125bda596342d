// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-point validation of a location line against the shape's end faces

use crate::error::{Error, Result};
use crate::tolerance::Tolerances;
use crate::types::Segment;
use crate::vector::{centroid, distance_to_line};
use nalgebra::Point3;

/// Offset of the vertex cluster at one end of `location` from the location line.
///
/// The cluster is every vertex within the end slab (a fraction of the line
/// length, at least the linear tolerance) around that end.
pub fn end_offset(
    vertices: &[Point3<f64>],
    location: &Segment,
    end: &Point3<f64>,
    tol: &Tolerances,
) -> Result<f64> {
    let dir = location.direction().ok_or(Error::DegenerateSpan {
        axis: "location",
        span: 0.0,
    })?;
    let slab = (location.length() * tol.end_slice_fraction).max(tol.linear);

    let cluster: Vec<Point3<f64>> = vertices
        .iter()
        .filter(|v| (*v - end).dot(&dir).abs() <= slab)
        .copied()
        .collect();
    let center =
        centroid(&cluster).ok_or_else(|| Error::insufficient("no vertices at location end"))?;

    distance_to_line(&center, &location.start, &dir)
        .ok_or_else(|| Error::insufficient("degenerate location line"))
}

/// Both ends of `location` must sit on the centre of the geometry found there.
///
/// Catches elbows and other bent shapes whose bounding-box axis misses the
/// real connection points.
pub fn validate_end_points(vertices: &[Point3<f64>], location: &Segment, tol: &Tolerances) -> Result<()> {
    let allowed = (location.length() * tol.end_offset_fraction).max(tol.linear);
    for end in [location.start, location.end] {
        let offset = end_offset(vertices, location, &end, tol)?;
        if offset > allowed {
            tracing::debug!(offset, allowed, "location end off axis");
            return Err(Error::EndPointMismatch { offset, allowed });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(x: f64, cy: f64, radius: f64) -> Vec<Point3<f64>> {
        (0..12)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / 12.0;
                Point3::new(x, cy + radius * t.cos(), radius * t.sin())
            })
            .collect()
    }

    #[test]
    fn test_straight_pipe_passes() {
        let tol = Tolerances::default();
        let mut vertices = ring(0.0, 0.0, 20.0);
        vertices.extend(ring(1000.0, 0.0, 20.0));
        let location = Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1000.0, 0.0, 0.0));
        assert!(validate_end_points(&vertices, &location, &tol).is_ok());
    }

    #[test]
    fn test_offset_end_fails() {
        let tol = Tolerances::default();
        let mut vertices = ring(0.0, 0.0, 20.0);
        vertices.extend(ring(1000.0, 200.0, 20.0));
        // Bounding-box axis of the two rings
        let location = Segment::new(Point3::new(0.0, 100.0, 0.0), Point3::new(1000.0, 100.0, 0.0));
        let err = validate_end_points(&vertices, &location, &tol).unwrap_err();
        match err {
            Error::EndPointMismatch { offset, allowed } => {
                assert!((offset - 100.0).abs() < 1e-9);
                assert!((allowed - 30.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
