// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! T-shaped solid split
//!
//! A T made of two boxes sharing a face has ten planar faces: top, bottom and
//! eight sides. The shared face's plane shows up as two separate coplanar side
//! faces with a parallel face opposite; cutting there yields two boxes that
//! can each be measured on their own.

use crate::csg::ClippingProcessor;
use crate::error::{Error, Result};
use crate::plane::Plane;
use crate::reduction::{merge_collinear, merge_near_duplicates, simplify_boundary};
use crate::tolerance::Tolerances;
use crate::types::{FaceDescriptor, PlanarFace};
use crate::vector::{is_parallel, is_perpendicular, polygon_area};
use nalgebra::{Point3, Vector3};

/// Face count of a T made from two boxes
pub const T_SHAPE_FACES: usize = 10;

/// One piece of a split solid
#[derive(Debug, Clone, PartialEq)]
pub struct SubShape {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<PlanarFace>,
}

impl SubShape {
    pub fn descriptors(&self) -> Vec<FaceDescriptor> {
        self.faces.iter().map(PlanarFace::descriptor).collect()
    }
}

/// Normal of the face perpendicular to all eight sides
pub fn find_up_direction(faces: &[PlanarFace], tol: &Tolerances) -> Option<Vector3<f64>> {
    let sides = faces.len().saturating_sub(2);
    faces
        .iter()
        .find(|f| {
            faces
                .iter()
                .filter(|g| is_perpendicular(&f.plane.normal, &g.plane.normal, tol))
                .count()
                == sides
        })
        .map(|f| f.plane.normal)
}

/// Plane shared by two distinct coplanar side faces that face a third parallel side
pub fn find_cut_plane(faces: &[PlanarFace], up: &Vector3<f64>, tol: &Tolerances) -> Option<Plane> {
    let parallel_cos = tol.parallel_cos();
    let sides: Vec<&PlanarFace> = faces
        .iter()
        .filter(|f| is_perpendicular(&f.plane.normal, up, tol))
        .collect();

    for (i, a) in sides.iter().enumerate() {
        for b in &sides[i + 1..] {
            if !a.plane.is_coplanar(&b.plane, tol.linear, parallel_cos) {
                continue;
            }
            let opposite = sides.iter().any(|c| {
                is_parallel(&c.plane.normal, &a.plane.normal, tol)
                    && !c.plane.is_coplanar(&a.plane, tol.linear, parallel_cos)
            });
            if opposite {
                return Some(a.plane);
            }
        }
    }
    None
}

/// Part of the solid on the side `keep` points to, closed with a cap on the cut
fn half(faces: &[PlanarFace], keep: &Plane, tol: &Tolerances) -> Result<SubShape> {
    let clipper = ClippingProcessor::with_epsilon(tol.linear);
    let parallel_cos = tol.parallel_cos();
    let min_area = tol.linear * tol.linear;

    let mut kept: Vec<PlanarFace> = Vec::new();
    for face in faces {
        if face.plane.is_coplanar(keep, tol.linear, parallel_cos) {
            continue;
        }
        let Some(clipped) = clipper.clip_face(face, keep) else {
            continue;
        };
        let boundary = merge_collinear(&clipped.boundary, tol);
        if boundary.len() < 3 || polygon_area(&boundary) <= min_area {
            continue;
        }
        kept.push(PlanarFace::with_plane(face.plane, boundary));
    }

    let on_cut: Vec<Point3<f64>> = kept
        .iter()
        .flat_map(|f| f.boundary.iter())
        .filter(|p| keep.signed_distance(p).abs() <= tol.linear)
        .copied()
        .collect();
    let cap_plane = keep.flipped();
    let cap = simplify_boundary(&cap_plane, &on_cut, tol);
    if cap.len() < 3 {
        return Err(Error::UnsplittableShape("cut does not cross the solid"));
    }
    kept.push(PlanarFace::with_plane(cap_plane, cap));

    if kept.len() < 4 {
        return Err(Error::UnsplittableShape("cut leaves a flat part"));
    }

    let points: Vec<Point3<f64>> = kept.iter().flat_map(|f| f.boundary.iter().copied()).collect();
    Ok(SubShape {
        vertices: merge_near_duplicates(&points, tol.linear),
        faces: kept,
    })
}

/// Split a ten-face T solid into its two boxes.
///
/// The first part lies on the side the cut face's normal points to.
pub fn divide_shape(faces: &[PlanarFace], tol: &Tolerances) -> Result<(SubShape, SubShape)> {
    if faces.len() != T_SHAPE_FACES {
        return Err(Error::UnsplittableShape("T shape needs exactly ten faces"));
    }
    let up = find_up_direction(faces, tol).ok_or(Error::UnsplittableShape("no up direction"))?;
    let cut = find_cut_plane(faces, &up, tol).ok_or(Error::UnsplittableShape("no cut plane"))?;
    tracing::trace!(?up, cut_normal = ?cut.normal, "splitting T shape");

    let front = half(faces, &cut, tol)?;
    let back = half(faces, &cut.flipped(), tol)?;
    Ok((front, back))
}
