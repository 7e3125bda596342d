// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-space clipping of planar faces
//!
//! Sutherland-Hodgman against a single plane; the kept side is the one the
//! plane normal points to.

use crate::plane::Plane;
use crate::types::PlanarFace;
use nalgebra::Point3;

/// Polygon clipping result
#[derive(Debug, Clone, PartialEq)]
pub enum ClipResult {
    /// Polygon is completely in front (keep it)
    AllFront(Vec<Point3<f64>>),
    /// Polygon is completely behind (discard it)
    AllBehind,
    /// Polygon crosses the plane - returns the front part
    Split(Vec<Point3<f64>>),
}

impl ClipResult {
    /// Front part of the polygon, if any
    pub fn into_front(self) -> Option<Vec<Point3<f64>>> {
        match self {
            ClipResult::AllFront(points) | ClipResult::Split(points) => Some(points),
            ClipResult::AllBehind => None,
        }
    }
}

/// Half-space clipping processor
#[derive(Debug, Clone, Copy)]
pub struct ClippingProcessor {
    /// Epsilon for floating point comparisons
    pub epsilon: f64,
}

impl ClippingProcessor {
    pub fn new() -> Self {
        Self { epsilon: 1e-6 }
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Clip a closed polygon against a plane, keeping the front side.
    /// Points within epsilon of the plane count as in front.
    pub fn clip_polygon(&self, polygon: &[Point3<f64>], plane: &Plane) -> ClipResult {
        if polygon.is_empty() {
            return ClipResult::AllBehind;
        }

        let distances: Vec<f64> = polygon.iter().map(|p| plane.signed_distance(p)).collect();
        let front = |d: f64| d >= -self.epsilon;

        let front_count = distances.iter().filter(|d| front(**d)).count();
        if front_count == polygon.len() {
            return ClipResult::AllFront(polygon.to_vec());
        }
        if front_count == 0 {
            return ClipResult::AllBehind;
        }

        let n = polygon.len();
        let mut clipped = Vec::with_capacity(n + 2);
        for i in 0..n {
            let j = (i + 1) % n;
            let (a, b) = (&polygon[i], &polygon[j]);
            let (da, db) = (distances[i], distances[j]);

            if front(da) {
                clipped.push(*a);
            }
            // Edge crosses the plane strictly: add the intersection
            if (da > self.epsilon && db < -self.epsilon) || (da < -self.epsilon && db > self.epsilon) {
                let t = da / (da - db);
                clipped.push(a + (b - a) * t);
            }
        }

        if clipped.len() < 3 {
            return ClipResult::AllBehind;
        }
        ClipResult::Split(clipped)
    }

    /// Clip a planar face, keeping its plane. `None` when nothing is in front.
    pub fn clip_face(&self, face: &PlanarFace, plane: &Plane) -> Option<PlanarFace> {
        let boundary = self.clip_polygon(&face.boundary, plane).into_front()?;
        Some(PlanarFace::with_plane(face.plane, boundary))
    }
}

impl Default for ClippingProcessor {
    fn default() -> Self {
        Self::new()
    }
}
