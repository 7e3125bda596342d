// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! Adapter from indexed triangle soups (mesh exports, tessellated IFC
//! representations) to the vertex cloud and face descriptors the solver reads.

use crate::plane::Plane;
use crate::tolerance::{Tolerances, NORMALIZE_EPSILON};
use crate::types::{Aabb, FaceDescriptor};
use crate::vector::is_codirectional;
use nalgebra::{Isometry3, Point3, Vector3};
use rustc_hash::FxHashSet;
use std::f64::consts::TAU;

/// Triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[position.x, position.y, position.z]);
        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }
        let vertex_offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn vertex(&self, index: u32) -> Option<Point3<f64>> {
        let i = index as usize * 3;
        let xyz = self.positions.get(i..i + 3)?;
        Some(Point3::new(xyz[0], xyz[1], xyz[2]))
    }

    /// All vertex positions
    pub fn vertices(&self) -> Vec<Point3<f64>> {
        self.positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect()
    }

    /// Triangles as corner positions; triangles with out-of-range indices are skipped
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |t| {
            Some([self.vertex(t[0])?, self.vertex(t[1])?, self.vertex(t[2])?])
        })
    }

    /// One polygon per triangle, for the cylinder end-cap search
    pub fn triangle_polygons(&self) -> Vec<Vec<Point3<f64>>> {
        self.triangles().map(|t| t.to_vec()).collect()
    }

    /// Get bounding box
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices())
    }

    /// Rigidly transformed copy
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Mesh {
        let mut positions = Vec::with_capacity(self.positions.len());
        for c in self.positions.chunks_exact(3) {
            let p = transform.transform_point(&Point3::new(c[0], c[1], c[2]));
            positions.extend_from_slice(&[p.x, p.y, p.z]);
        }
        Mesh {
            positions,
            indices: self.indices.clone(),
        }
    }

    /// Group coplanar, equally oriented triangles into planar faces.
    ///
    /// Grouping is greedy in triangle order, so the result is deterministic.
    pub fn face_descriptors(&self, tol: &Tolerances) -> Vec<FaceDescriptor> {
        struct Group {
            plane: Plane,
            area: f64,
            vertices: FxHashSet<u32>,
        }

        let mut groups: Vec<Group> = Vec::new();

        for t in self.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (self.vertex(t[0]), self.vertex(t[1]), self.vertex(t[2])) else {
                continue;
            };
            let cross: Vector3<f64> = (b - a).cross(&(c - a));
            let area = cross.norm() * 0.5;
            let Some(normal) = cross.try_normalize(NORMALIZE_EPSILON) else {
                continue;
            };

            let existing = groups.iter_mut().find(|g| {
                is_codirectional(&g.plane.normal, &normal, tol)
                    && g.plane.signed_distance(&a).abs() <= tol.linear
            });
            match existing {
                Some(group) => {
                    group.area += area;
                    group.vertices.extend(t.iter().copied());
                }
                None => groups.push(Group {
                    plane: Plane { origin: a, normal },
                    area,
                    vertices: t.iter().copied().collect(),
                }),
            }
        }

        groups
            .into_iter()
            .map(|g| FaceDescriptor::new(g.plane, g.area, g.vertices.len()))
            .collect()
    }

    /// Axis-aligned box with outward-facing triangles
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Mesh {
        let mut mesh = Mesh::with_capacity(8, 36);

        let v0 = mesh.add_vertex(Point3::new(min.x, min.y, min.z));
        let v1 = mesh.add_vertex(Point3::new(max.x, min.y, min.z));
        let v2 = mesh.add_vertex(Point3::new(max.x, max.y, min.z));
        let v3 = mesh.add_vertex(Point3::new(min.x, max.y, min.z));
        let v4 = mesh.add_vertex(Point3::new(min.x, min.y, max.z));
        let v5 = mesh.add_vertex(Point3::new(max.x, min.y, max.z));
        let v6 = mesh.add_vertex(Point3::new(max.x, max.y, max.z));
        let v7 = mesh.add_vertex(Point3::new(min.x, max.y, max.z));

        // -Z
        mesh.add_triangle(v0, v2, v1);
        mesh.add_triangle(v0, v3, v2);
        // +Z
        mesh.add_triangle(v4, v5, v6);
        mesh.add_triangle(v4, v6, v7);
        // -X
        mesh.add_triangle(v0, v4, v7);
        mesh.add_triangle(v0, v7, v3);
        // +X
        mesh.add_triangle(v1, v2, v6);
        mesh.add_triangle(v1, v6, v5);
        // -Y
        mesh.add_triangle(v0, v1, v5);
        mesh.add_triangle(v0, v5, v4);
        // +Y
        mesh.add_triangle(v3, v7, v6);
        mesh.add_triangle(v3, v6, v2);

        mesh
    }

    /// Closed prism approximating a cylinder, centred on `center`.
    ///
    /// The first ring vertex sits on the first in-plane axis of the cap plane.
    /// Returns an empty mesh for a zero axis or fewer than three segments.
    pub fn cylinder(
        center: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        length: f64,
        segments: usize,
    ) -> Mesh {
        let Some(cap) = Plane::new(center, axis) else {
            return Mesh::new();
        };
        if segments < 3 {
            return Mesh::new();
        }

        let (u, v) = cap.basis();
        let half = cap.normal * (length * 0.5);
        let n = segments as u32;
        let mut mesh = Mesh::with_capacity(segments * 2, segments * 12);

        for offset in [-half, half] {
            for k in 0..segments {
                let t = TAU * k as f64 / segments as f64;
                mesh.add_vertex(center + offset + u * (radius * t.cos()) + v * (radius * t.sin()));
            }
        }

        for k in 0..n {
            let s0 = k;
            let s1 = (k + 1) % n;
            mesh.add_triangle(s0, s1, n + s1);
            mesh.add_triangle(s0, n + s1, n + s0);
        }

        // Caps as fans from the first ring vertex
        for k in 1..n - 1 {
            mesh.add_triangle(0, k + 1, k);
            mesh.add_triangle(n, n + k, n + k + 1);
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn test_cuboid_faces() {
        let tol = Tolerances::default();
        let mesh = Mesh::cuboid(Point3::new(-100.0, -50.0, -25.0), Point3::new(100.0, 50.0, 25.0));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);

        let faces = mesh.face_descriptors(&tol);
        assert_eq!(faces.len(), 6);
        let total: f64 = faces.iter().map(|f| f.area).sum();
        assert_relative_eq!(total, 2.0 * (200.0 * 100.0 + 200.0 * 50.0 + 100.0 * 50.0), epsilon = 1e-6);
        assert!(faces.iter().all(|f| f.edge_loop_vertex_count == 4));

        // Outward normals: every face plane has the box centre behind it
        for face in &faces {
            assert!(face.plane.signed_distance(&Point3::origin()) < 0.0);
        }
    }

    #[test]
    fn test_cylinder_faces() {
        let tol = Tolerances::default();
        let mesh = Mesh::cylinder(Point3::origin(), Vector3::x(), 50.0, 1000.0, 16);
        assert_eq!(mesh.vertex_count(), 32);
        assert_eq!(mesh.triangle_count(), 32 + 28);

        let faces = mesh.face_descriptors(&tol);
        assert_eq!(faces.len(), 18);
        let caps: Vec<&FaceDescriptor> = faces
            .iter()
            .filter(|f| f.plane.normal.x.abs() > 0.999)
            .collect();
        assert_eq!(caps.len(), 2);
        for cap in caps {
            assert_eq!(cap.edge_loop_vertex_count, 16);
            assert!(cap.plane.signed_distance(&Point3::origin()) < 0.0);
        }

        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.size().x, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.size().y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_cylinder_is_empty() {
        assert!(Mesh::cylinder(Point3::origin(), Vector3::zeros(), 1.0, 1.0, 8).is_empty());
        assert!(Mesh::cylinder(Point3::origin(), Vector3::z(), 1.0, 1.0, 2).is_empty());
    }

    #[test]
    fn test_transformed_keeps_topology() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let iso = Isometry3::from_parts(
            Translation3::new(10.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        );
        let moved = mesh.transformed(&iso);
        assert_eq!(moved.indices, mesh.indices);
        let bounds = moved.bounds().unwrap();
        assert_relative_eq!(bounds.size(), Vector3::new(2.0, 1.0, 3.0), epsilon = 1e-9);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Mesh::cuboid(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        a.merge(&b);
        assert_eq!(a.vertex_count(), 16);
        assert_eq!(a.triangle_count(), 24);
        assert_eq!(*a.indices.iter().max().unwrap(), 15);
    }
}
