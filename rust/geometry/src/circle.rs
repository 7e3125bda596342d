// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circle and cylinder detection on simplified boundary polygons
//!
//! Two radial bands are checked: one at the polygon vertices and a wider one
//! at edge midpoints. A finely tessellated circle passes both; a polygon whose
//! corners happen to sit on a circle but whose edges sag far inside it only
//! passes the first, which is reported as [`Circularity::Ambiguous`].

use crate::tolerance::{Tolerances, NORMALIZE_EPSILON};
use nalgebra::Point3;

/// Result of [`classify_circle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Circularity {
    /// Definitely not a circle
    NotCircle,
    /// Vertices are on a circle but the edges are too coarse to tell
    Ambiguous,
    /// Definitely a (tessellated) circle
    Circle,
}

impl Circularity {
    #[inline]
    pub fn is_circle(self) -> bool {
        self == Circularity::Circle
    }

    /// Circle or ambiguous: worth a second look as a round section
    #[inline]
    pub fn is_round_candidate(self) -> bool {
        self != Circularity::NotCircle
    }
}

/// Classify an ordered closed polygon as a circle around `center`.
pub fn classify_circle(
    points: &[Point3<f64>],
    center: Option<&Point3<f64>>,
    tol: &Tolerances,
) -> Circularity {
    let center = match center {
        Some(c) if points.len() >= 4 => c,
        _ => return Circularity::NotCircle,
    };

    let radius = (points[0] - center).norm();
    if radius <= tol.linear {
        return Circularity::NotCircle;
    }

    let vertex_band = tol.vertex_band(radius);
    if points
        .iter()
        .any(|p| ((p - center).norm() - radius).abs() > vertex_band)
    {
        return Circularity::NotCircle;
    }

    // Squares and rectangles put every corner on one circle
    if points.len() < tol.min_circle_vertices {
        return Circularity::NotCircle;
    }

    let midpoint_band = tol.midpoint_band(radius);
    let n = points.len();
    let sagging = (0..n).any(|i| {
        let mid = nalgebra::center(&points[i], &points[(i + 1) % n]);
        ((mid - center).norm() - radius).abs() > midpoint_band
    });

    if sagging {
        Circularity::Ambiguous
    } else {
        Circularity::Circle
    }
}

/// Center of the circle through three points, `None` when they are collinear
pub fn circumcenter(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Point3<f64>> {
    let ac = a - c;
    let bc = b - c;
    let axb = ac.cross(&bc);
    let denom = 2.0 * axb.norm_squared();
    if denom < NORMALIZE_EPSILON * NORMALIZE_EPSILON {
        return None;
    }
    let numer = (bc * ac.norm_squared() - ac * bc.norm_squared()).cross(&axb);
    Some(c + numer / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn ring(n: usize, radius: f64) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                Point3::new(radius * t.cos(), radius * t.sin(), 0.0)
            })
            .collect()
    }

    #[test]
    fn test_tessellated_circle_is_circle() {
        let tol = Tolerances::default();
        for n in [12, 16, 32, 64] {
            let points = ring(n, 50.0);
            assert_eq!(
                classify_circle(&points, Some(&Point3::origin()), &tol),
                Circularity::Circle,
                "n = {}",
                n
            );
        }
    }

    #[test]
    fn test_perturbed_vertex_is_not_circle() {
        let tol = Tolerances::default();
        let mut points = ring(16, 50.0);
        points[5] = Point3::from(points[5].coords * 1.12);
        assert_eq!(
            classify_circle(&points, Some(&Point3::origin()), &tol),
            Circularity::NotCircle
        );
    }

    #[test]
    fn test_missing_center_or_too_few_points() {
        let tol = Tolerances::default();
        let points = ring(16, 50.0);
        assert_eq!(classify_circle(&points, None, &tol), Circularity::NotCircle);
        assert_eq!(
            classify_circle(&points[..3], Some(&Point3::origin()), &tol),
            Circularity::NotCircle
        );
    }

    #[test]
    fn test_rectangle_is_not_circle() {
        let tol = Tolerances::default();
        let rect = vec![
            Point3::new(-100.0, -50.0, 0.0),
            Point3::new(100.0, -50.0, 0.0),
            Point3::new(100.0, 50.0, 0.0),
            Point3::new(-100.0, 50.0, 0.0),
        ];
        assert_eq!(
            classify_circle(&rect, Some(&Point3::origin()), &tol),
            Circularity::NotCircle
        );
    }

    #[test]
    fn test_sparse_arc_is_ambiguous() {
        // Six vertices on a circle, bunched so that one edge spans half the circle
        let tol = Tolerances::default();
        let angles: [f64; 6] = [0.0, 30.0, 60.0, 90.0, 120.0, 180.0];
        let points: Vec<Point3<f64>> = angles
            .iter()
            .map(|deg| {
                let t = deg.to_radians();
                Point3::new(50.0 * t.cos(), 50.0 * t.sin(), 0.0)
            })
            .collect();
        assert_eq!(
            classify_circle(&points, Some(&Point3::origin()), &tol),
            Circularity::Ambiguous
        );
    }

    #[test]
    fn test_circumcenter() {
        let center = circumcenter(
            &Point3::new(5.0, 0.0, 3.0),
            &Point3::new(0.0, 5.0, 3.0),
            &Point3::new(-5.0, 0.0, 3.0),
        )
        .unwrap();
        assert_relative_eq!(center, Point3::new(0.0, 0.0, 3.0), epsilon = 1e-9);

        assert!(circumcenter(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
            &Point3::new(2.0, 2.0, 2.0)
        )
        .is_none());
    }
}
