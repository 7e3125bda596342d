// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Principal and secondary direction discovery

use crate::circle::{classify_circle, Circularity};
use crate::plane::Plane;
use crate::tolerance::{Tolerances, NORMALIZE_EPSILON};
use crate::types::FaceDescriptor;
use crate::vector::{is_parallel, is_perpendicular};
use nalgebra::{Point2, Point3, Vector3};

/// Principal direction from face normals.
///
/// The parallel face pair with the largest combined area wins; failing that,
/// the cross product of the largest perpendicular pair.
pub fn principal_direction(faces: &[FaceDescriptor], tol: &Tolerances) -> Option<Vector3<f64>> {
    let mut best_parallel: Option<(f64, Vector3<f64>)> = None;
    let mut best_perpendicular: Option<(f64, Vector3<f64>)> = None;

    for (i, a) in faces.iter().enumerate() {
        for b in &faces[i + 1..] {
            let combined = a.area + b.area;
            if is_parallel(&a.plane.normal, &b.plane.normal, tol) {
                if best_parallel.map_or(true, |(area, _)| combined > area) {
                    best_parallel = Some((combined, a.plane.normal));
                }
            } else if is_perpendicular(&a.plane.normal, &b.plane.normal, tol) {
                let axis = a.plane.normal.cross(&b.plane.normal);
                if let Some(axis) = axis.try_normalize(NORMALIZE_EPSILON) {
                    if best_perpendicular.map_or(true, |(area, _)| combined > area) {
                        best_perpendicular = Some((combined, axis));
                    }
                }
            }
        }
    }

    best_parallel
        .or(best_perpendicular)
        .and_then(|(_, dir)| dir.try_normalize(NORMALIZE_EPSILON))
}

/// One way of deriving the first in-plane axis from a cross-section polygon
pub type SecondaryStrategy = fn(&[Point3<f64>], &Plane, &Tolerances) -> Option<Vector3<f64>>;

/// Tried in order; the first strategy returning a direction wins
pub const SECONDARY_STRATEGIES: &[(&str, SecondaryStrategy)] = &[
    ("parallel_edges", parallel_edge_direction),
    ("radial", radial_direction),
    ("longest_edge", longest_edge_direction),
];

/// First in-plane axis of a cross-section polygon, kept perpendicular to the plane normal
pub fn secondary_direction(
    polygon: &[Point3<f64>],
    plane: &Plane,
    tol: &Tolerances,
) -> Option<Vector3<f64>> {
    SECONDARY_STRATEGIES.iter().find_map(|(name, strategy)| {
        let dir = strategy(polygon, plane, tol)?;
        let in_plane = dir - plane.normal * dir.dot(&plane.normal);
        let dir = in_plane.try_normalize(NORMALIZE_EPSILON)?;
        tracing::trace!(strategy = name, ?dir, "secondary direction");
        Some(dir)
    })
}

fn edges(polygon: &[Point3<f64>]) -> impl Iterator<Item = (Vector3<f64>, f64)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| {
        let v = polygon[(i + 1) % n] - polygon[i];
        (v, v.norm())
    })
}

/// Direction shared by the parallel edge pair with the largest combined length
pub fn parallel_edge_direction(
    polygon: &[Point3<f64>],
    _plane: &Plane,
    tol: &Tolerances,
) -> Option<Vector3<f64>> {
    let edges: Vec<(Vector3<f64>, f64)> = edges(polygon).collect();
    let mut best: Option<(f64, Vector3<f64>)> = None;

    for (i, (a, len_a)) in edges.iter().enumerate() {
        for (b, len_b) in &edges[i + 1..] {
            if !is_parallel(a, b, tol) {
                continue;
            }
            let combined = len_a + len_b;
            if best.map_or(true, |(len, _)| combined > len) {
                best = Some((combined, *a));
            }
        }
    }

    best.map(|(_, dir)| dir)
}

/// Bounding-box center of a planar polygon, in world coordinates
pub fn section_center(polygon: &[Point3<f64>], plane: &Plane) -> Option<Point3<f64>> {
    let basis = plane.basis();
    let mut iter = polygon.iter().map(|p| plane.to_local(p, &basis));
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(min, max), q| (min.inf(&q), max.sup(&q)));
    let mid = Point2::from((min.coords + max.coords) * 0.5);
    Some(plane.to_world(&mid, &basis))
}

/// Radial direction through the first vertex when the polygon is a circle
/// (odd tessellations have no parallel edges)
pub fn radial_direction(
    polygon: &[Point3<f64>],
    plane: &Plane,
    tol: &Tolerances,
) -> Option<Vector3<f64>> {
    if polygon.len() <= tol.min_circle_vertices {
        return None;
    }
    let center = section_center(polygon, plane)?;
    match classify_circle(polygon, Some(&center), tol) {
        Circularity::Circle => Some(polygon[0] - center),
        _ => None,
    }
}

/// Direction of the longest edge
pub fn longest_edge_direction(
    polygon: &[Point3<f64>],
    _plane: &Plane,
    _tol: &Tolerances,
) -> Option<Vector3<f64>> {
    edges(polygon)
        .filter(|(_, len)| *len > NORMALIZE_EPSILON)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn face(normal: Vector3<f64>, area: f64) -> FaceDescriptor {
        FaceDescriptor::new(Plane::new(Point3::origin(), normal).unwrap(), area, 4)
    }

    fn z_plane() -> Plane {
        Plane::new(Point3::origin(), Vector3::z()).unwrap()
    }

    #[test]
    fn test_principal_prefers_largest_parallel_pair() {
        let tol = Tolerances::default();
        let faces = vec![
            face(Vector3::x(), 10.0),
            face(-Vector3::x(), 10.0),
            face(Vector3::z(), 40.0),
            face(-Vector3::z(), 40.0),
            face(Vector3::y(), 20.0),
            face(-Vector3::y(), 20.0),
        ];
        let dir = principal_direction(&faces, &tol).unwrap();
        assert_relative_eq!(dir, Vector3::z());
    }

    #[test]
    fn test_principal_falls_back_to_perpendicular_pair() {
        let tol = Tolerances::default();
        let faces = vec![face(Vector3::x(), 10.0), face(Vector3::y(), 10.0)];
        let dir = principal_direction(&faces, &tol).unwrap();
        assert_relative_eq!(dir, Vector3::z());
    }

    #[test]
    fn test_principal_none_without_pairs() {
        let tol = Tolerances::default();
        assert!(principal_direction(&[], &tol).is_none());
        let faces = vec![face(Vector3::x(), 10.0), face(Vector3::new(1.0, 1.0, 0.0), 10.0)];
        assert!(principal_direction(&faces, &tol).is_none());
    }

    #[test]
    fn test_secondary_uses_long_edges_of_rectangle() {
        let tol = Tolerances::default();
        let rect = vec![
            Point3::new(-100.0, -50.0, 0.0),
            Point3::new(100.0, -50.0, 0.0),
            Point3::new(100.0, 50.0, 0.0),
            Point3::new(-100.0, 50.0, 0.0),
        ];
        let dir = secondary_direction(&rect, &z_plane(), &tol).unwrap();
        assert_relative_eq!(dir.x.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_secondary_radial_for_odd_circle() {
        let tol = Tolerances::default();
        let polygon: Vec<Point3<f64>> = (0..15)
            .map(|i| {
                let t = TAU * i as f64 / 15.0;
                Point3::new(40.0 * t.cos(), 40.0 * t.sin(), 0.0)
            })
            .collect();
        assert!(parallel_edge_direction(&polygon, &z_plane(), &tol).is_none());
        let dir = secondary_direction(&polygon, &z_plane(), &tol).unwrap();
        // First vertex sits on +X; the box center is only slightly off the circle center
        assert!(dir.x > 0.99);
    }
}
