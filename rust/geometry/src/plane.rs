// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planes with a stable in-plane basis

use crate::tolerance::NORMALIZE_EPSILON;
use crate::vector::newell_vector;
use nalgebra::{Point2, Point3, Vector3};

/// Plane through `origin` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// Point on the plane
    pub origin: Point3<f64>,
    /// Unit normal
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing `normal`. Returns `None` for a zero-length normal.
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let normal = normal.try_normalize(NORMALIZE_EPSILON)?;
        Some(Self { origin, normal })
    }

    /// Plane through three points (normal follows `(b - a) × (c - a)`)
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        Self::new(*a, (b - a).cross(&(c - a)))
    }

    /// Best-fit plane of a polygon loop: Newell normal through the loop centroid
    pub fn from_loop(points: &[Point3<f64>]) -> Option<Self> {
        let origin = crate::vector::centroid(points)?;
        Self::new(origin, newell_vector(points))
    }

    /// Signed distance from `point`; positive on the side the normal points to
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Orthogonal projection of `point` onto the plane
    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Same plane, opposite normal
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    /// Same normal, moved to pass through `origin`
    pub fn through(&self, origin: Point3<f64>) -> Self {
        Self {
            origin,
            normal: self.normal,
        }
    }

    /// Orthonormal in-plane axes `(u, v)` with `u × v = normal`.
    ///
    /// `u` is derived from the world axis least parallel to the normal so the
    /// basis is deterministic for a given normal.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal;
        let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());

        let reference = if ax <= ay && ax <= az {
            Vector3::new(1.0, 0.0, 0.0)
        } else if ay <= az {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let v = n.cross(&reference).normalize();
        let u = v.cross(&n).normalize();
        (u, v)
    }

    /// Plane-local 2D coordinates of `point` (its projection, measured from `origin`)
    pub fn to_local(&self, point: &Point3<f64>, basis: &(Vector3<f64>, Vector3<f64>)) -> Point2<f64> {
        let rel = point - self.origin;
        Point2::new(rel.dot(&basis.0), rel.dot(&basis.1))
    }

    /// World position of plane-local coordinates
    pub fn to_world(&self, local: &Point2<f64>, basis: &(Vector3<f64>, Vector3<f64>)) -> Point3<f64> {
        self.origin + basis.0 * local.x + basis.1 * local.y
    }

    /// Both planes have parallel normals and coincide within `linear`
    pub fn is_coplanar(&self, other: &Plane, linear: f64, parallel_cos: f64) -> bool {
        self.normal.dot(&other.normal).abs() >= parallel_cos
            && self.signed_distance(&other.origin).abs() <= linear
    }
}

/// `point - normal * dot(point - origin, normal)`
#[inline]
pub fn project_onto_plane(plane: &Plane, point: &Point3<f64>) -> Point3<f64> {
    plane.project(point)
}

/// `dot(point - origin, normal)`
#[inline]
pub fn signed_distance(plane: &Plane, point: &Point3<f64>) -> f64 {
    plane.signed_distance(point)
}
