// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-aware point and direction predicates
//!
//! Every predicate takes the tolerance explicitly so the solver and its
//! callers classify the same pair of directions the same way.

use crate::tolerance::{Tolerances, NORMALIZE_EPSILON};
use nalgebra::{Point3, Vector3};

/// World up axis used for vertical/horizontal decisions
pub const WORLD_UP: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// Two points are equal within `tol`
#[inline]
pub fn is_equal(a: &Point3<f64>, b: &Point3<f64>, tol: f64) -> bool {
    (a - b).norm() <= tol
}

/// Two directions are parallel (same or opposite sense) within the angular tolerance.
/// Zero-length input is never parallel to anything.
#[inline]
pub fn is_parallel(u: &Vector3<f64>, v: &Vector3<f64>, tol: &Tolerances) -> bool {
    match (u.try_normalize(NORMALIZE_EPSILON), v.try_normalize(NORMALIZE_EPSILON)) {
        (Some(u), Some(v)) => u.dot(&v).abs() >= tol.parallel_cos(),
        _ => false,
    }
}

/// Two directions point the same way within the angular tolerance
#[inline]
pub fn is_codirectional(u: &Vector3<f64>, v: &Vector3<f64>, tol: &Tolerances) -> bool {
    match (u.try_normalize(NORMALIZE_EPSILON), v.try_normalize(NORMALIZE_EPSILON)) {
        (Some(u), Some(v)) => u.dot(&v) >= tol.parallel_cos(),
        _ => false,
    }
}

/// Two directions are perpendicular within the angular tolerance
#[inline]
pub fn is_perpendicular(u: &Vector3<f64>, v: &Vector3<f64>, tol: &Tolerances) -> bool {
    match (u.try_normalize(NORMALIZE_EPSILON), v.try_normalize(NORMALIZE_EPSILON)) {
        (Some(u), Some(v)) => u.dot(&v).abs() <= tol.perpendicular_sin(),
        _ => false,
    }
}

/// Angle between a direction and the vertical axis, folded into `[0, π/2]`
pub fn angle_to_vertical(v: &Vector3<f64>) -> Option<f64> {
    let v = v.try_normalize(NORMALIZE_EPSILON)?;
    Some(v.dot(&WORLD_UP).abs().min(1.0).acos())
}

/// Arithmetic mean of a point set
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Distance from `point` to the infinite line through `origin` along `direction`
pub fn distance_to_line(
    point: &Point3<f64>,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Option<f64> {
    let d = direction.try_normalize(NORMALIZE_EPSILON)?;
    let rel = point - origin;
    Some((rel - d * rel.dot(&d)).norm())
}

/// Smallest and largest projection of `points` onto `direction`, measured from `origin`.
/// Returns `(min, max, index_of_min, index_of_max)`.
pub fn extent_along(
    points: &[Point3<f64>],
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Option<(f64, f64, usize, usize)> {
    let mut iter = points.iter().enumerate();
    let (_, first) = iter.next()?;
    let t0 = (first - origin).dot(direction);
    let (mut min, mut max, mut min_idx, mut max_idx) = (t0, t0, 0, 0);
    for (i, p) in iter {
        let t = (p - origin).dot(direction);
        if t < min {
            min = t;
            min_idx = i;
        }
        if t > max {
            max = t;
            max_idx = i;
        }
    }
    Some((min, max, min_idx, max_idx))
}

/// Area of a planar polygon via Newell's method
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    newell_vector(points).norm() * 0.5
}

/// Un-normalized Newell vector of a polygon loop (length = 2 × area)
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    if n < 3 {
        return normal;
    }
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}
