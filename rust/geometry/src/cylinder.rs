// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cylinder centerline from end caps
//!
//! Works on B-rep faces and on tessellated meshes alike: every face (or mesh
//! triangle) proposes a plane, and a plane is an end cap when the vertices
//! lying on it form a circle.

use crate::circle::{circumcenter, classify_circle};
use crate::error::{Error, Result};
use crate::plane::Plane;
use crate::reduction::{merge_near_duplicates, simplify_boundary};
use crate::tolerance::Tolerances;
use crate::types::{PlanarFace, Segment};
use nalgebra::Point3;

/// Plane and circle center through three well-spread points of `points`.
///
/// Starts from the first point, takes the farthest point from it, then the
/// point whose distances to those two are closest to equal.
pub fn find_plane(points: &[Point3<f64>], tol: &Tolerances) -> Option<(Plane, Point3<f64>)> {
    let seed = *points.first()?;
    let far = *points
        .iter()
        .max_by(|a, b| (*a - seed).norm().total_cmp(&(*b - seed).norm()))?;
    if (far - seed).norm() <= tol.linear {
        return None;
    }

    let third = *points
        .iter()
        .filter(|p| (*p - seed).norm() > tol.linear && (*p - far).norm() > tol.linear)
        .min_by(|a, b| {
            let spread = |p: &Point3<f64>| ((p - seed).norm() - (p - far).norm()).abs();
            spread(a).total_cmp(&spread(b))
        })?;

    let plane = Plane::from_points(&seed, &far, &third)?;
    let center = circumcenter(&seed, &far, &third)?;
    Some((plane, center))
}

/// Circular end cap found on a candidate plane
#[derive(Debug, Clone, Copy)]
struct EndCap {
    plane: Plane,
    center: Point3<f64>,
    ring_points: usize,
}

fn end_cap(plane: &Plane, vertices: &[Point3<f64>], tol: &Tolerances) -> Option<EndCap> {
    let on_plane: Vec<Point3<f64>> = vertices
        .iter()
        .filter(|v| plane.signed_distance(v).abs() <= tol.linear)
        .copied()
        .collect();
    let ring = merge_near_duplicates(&on_plane, tol.linear);
    if ring.len() < tol.min_circle_vertices {
        return None;
    }

    let boundary = simplify_boundary(plane, &ring, tol);
    let (_, center) = find_plane(&boundary, tol)?;
    if !classify_circle(&boundary, Some(&center), tol).is_circle() {
        return None;
    }
    Some(EndCap {
        plane: *plane,
        center: plane.project(&center),
        ring_points: ring.len(),
    })
}

/// Centerline of a cylindrical solid, running between its two end caps.
///
/// `planar_faces` are B-rep faces; `mesh_faces` are loose polygons (usually
/// triangles) whose planes are fitted with [`find_plane`]. With a single cap the
/// opposite end is the farthest vertex along the cap normal.
pub fn cylinder_centerline(
    vertices: &[Point3<f64>],
    planar_faces: &[PlanarFace],
    mesh_faces: &[Vec<Point3<f64>>],
    tol: &Tolerances,
) -> Result<Segment> {
    if vertices.len() < tol.min_circle_vertices {
        return Err(Error::insufficient(format!(
            "{} vertices cannot form a cylinder",
            vertices.len()
        )));
    }

    let parallel_cos = tol.parallel_cos();
    let mut planes: Vec<Plane> = Vec::new();
    let proposed = planar_faces
        .iter()
        .map(|f| Some(f.plane))
        .chain(mesh_faces.iter().map(|f| find_plane(f, tol).map(|(plane, _)| plane)));
    for plane in proposed.flatten() {
        if !planes
            .iter()
            .any(|p| p.is_coplanar(&plane, tol.linear, parallel_cos))
        {
            planes.push(plane);
        }
    }

    let caps: Vec<EndCap> = planes
        .iter()
        .filter_map(|p| end_cap(p, vertices, tol))
        .collect();
    tracing::trace!(planes = planes.len(), caps = caps.len(), "end cap search");

    let mut best: Option<(usize, EndCap, EndCap)> = None;
    for (i, a) in caps.iter().enumerate() {
        for b in &caps[i + 1..] {
            if a.plane.normal.dot(&b.plane.normal).abs() < parallel_cos
                || a.plane.is_coplanar(&b.plane, tol.linear, parallel_cos)
            {
                continue;
            }
            let score = a.ring_points + b.ring_points;
            if best.map_or(true, |(s, _, _)| score > s) {
                best = Some((score, *a, *b));
            }
        }
    }

    let (first, second) = match (best, caps.first()) {
        (Some((_, a, b)), _) => (a, b),
        (None, Some(cap)) => {
            let far = vertices
                .iter()
                .max_by(|p, q| {
                    cap.plane
                        .signed_distance(p)
                        .abs()
                        .total_cmp(&cap.plane.signed_distance(q).abs())
                })
                .copied()
                .unwrap_or(cap.center);
            let opposite = EndCap {
                plane: cap.plane.through(far),
                center: cap.center,
                ring_points: 0,
            };
            (*cap, opposite)
        }
        (None, None) => {
            tracing::debug!(vertices = vertices.len(), "no circular end cap");
            return Err(Error::NoCylindricalCandidate);
        }
    };

    let shared = nalgebra::center(&first.center, &second.center);
    let a = first.plane.project(&shared);
    let b = second.plane.project(&shared);

    let normal = first.plane.normal;
    let line = if (b - a).dot(&normal) >= 0.0 {
        Segment::new(a, b)
    } else {
        Segment::new(b, a)
    };
    if line.length() < tol.linear {
        return Err(Error::DegenerateSpan {
            axis: "centerline",
            span: line.length(),
        });
    }
    Ok(line)
}
