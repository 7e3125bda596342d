// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-set reduction
//!
//! Turns an arbitrary vertex cloud into the ordered boundary polygon of its
//! projection onto a plane: project, merge duplicates, convex hull,
//! Douglas-Peucker, re-embed, then fold collinear runs into single corners.

use crate::hull::{convex_hull_2d, simplify_ring};
use crate::plane::Plane;
use crate::tolerance::{Tolerances, NORMALIZE_EPSILON};
use nalgebra::{Point2, Point3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

type CellKey = (i64, i64, i64);

/// Uniform hash grid for "is there already a point within `tol`" queries
pub struct PointGrid {
    cell: f64,
    tol: f64,
    cells: FxHashMap<CellKey, SmallVec<[Point3<f64>; 4]>>,
}

impl PointGrid {
    /// Create a grid whose cell edge equals the query radius
    pub fn new(tol: f64) -> Self {
        let tol = tol.max(NORMALIZE_EPSILON);
        Self {
            cell: tol,
            tol,
            cells: FxHashMap::default(),
        }
    }

    #[inline]
    fn key(&self, p: &Point3<f64>) -> CellKey {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
            (p.z / self.cell).floor() as i64,
        )
    }

    /// Is some stored point within the tolerance of `p`?
    pub fn contains_near(&self, p: &Point3<f64>) -> bool {
        let (kx, ky, kz) = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.cells.get(&(kx + dx, ky + dy, kz + dz)) {
                        if bucket.iter().any(|q| (q - p).norm() <= self.tol) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Insert `p` unless a point within tolerance is already stored.
    /// Returns `true` when inserted.
    pub fn insert(&mut self, p: Point3<f64>) -> bool {
        if self.contains_near(&p) {
            return false;
        }
        let key = self.key(&p);
        self.cells.entry(key).or_default().push(p);
        true
    }
}

/// Merge near-duplicate points, keeping the first of each cluster in input order
pub fn merge_near_duplicates(points: &[Point3<f64>], tol: f64) -> Vec<Point3<f64>> {
    let mut grid = PointGrid::new(tol);
    points
        .iter()
        .filter(|p| grid.insert(**p))
        .copied()
        .collect()
}

/// Reduce `points` to the ordered boundary polygon of their projection onto `plane`.
///
/// The result is counter-clockwise about the plane normal. Fewer than four
/// points means the projection carries too little shape for axis work.
pub fn simplify_boundary(plane: &Plane, points: &[Point3<f64>], tol: &Tolerances) -> Vec<Point3<f64>> {
    let basis = plane.basis();

    // Plane-local coordinates, embedded at z = 0 for the duplicate merge
    let local: Vec<Point3<f64>> = points
        .iter()
        .map(|p| {
            let q = plane.to_local(p, &basis);
            Point3::new(q.x, q.y, 0.0)
        })
        .collect();

    let unique: Vec<Point2<f64>> = merge_near_duplicates(&local, tol.linear)
        .into_iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect();

    let hull = convex_hull_2d(&unique);
    let simplified = simplify_ring(&hull, tol.linear);

    let world: Vec<Point3<f64>> = simplified
        .iter()
        .map(|q| plane.to_world(q, &basis))
        .collect();

    merge_collinear(&world, tol)
}

/// Drop vertices of a closed polygon whose incoming and outgoing edges are
/// parallel (either sense), and vertices that repeat their predecessor.
///
/// Runs until stable, so back-and-forth spikes left by clipping collapse too.
pub fn merge_collinear(polygon: &[Point3<f64>], tol: &Tolerances) -> Vec<Point3<f64>> {
    let mut current = polygon.to_vec();
    let cos = tol.parallel_cos();

    loop {
        let n = current.len();
        if n < 3 {
            return current;
        }

        let mut removed = None;
        for i in 0..n {
            let prev = current[(i + n - 1) % n];
            let here = current[i];
            let next = current[(i + 1) % n];

            let incoming = (here - prev).try_normalize(NORMALIZE_EPSILON);
            let outgoing = (next - here).try_normalize(NORMALIZE_EPSILON);

            let redundant = match (incoming, outgoing) {
                (Some(a), Some(b)) => a.dot(&b).abs() >= cos,
                // Zero-length edge on either side
                _ => true,
            };
            if redundant || (here - prev).norm() <= tol.linear {
                removed = Some(i);
                break;
            }
        }

        match removed {
            Some(i) => {
                current.remove(i);
            }
            None => return current,
        }
    }
}
