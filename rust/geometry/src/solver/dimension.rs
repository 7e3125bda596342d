// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimension line construction and classification

use super::direction::{principal_direction, secondary_direction};
use crate::circle::classify_circle;
use crate::error::{Error, Result};
use crate::plane::Plane;
use crate::reduction::{simplify_boundary, PointGrid};
use crate::tolerance::{Tolerances, NORMALIZE_EPSILON};
use crate::types::{DimensionCandidate, FaceDescriptor, Segment};
use crate::vector::extent_along;
use nalgebra::{Point3, Vector3};

/// Three mutually perpendicular dimension lines sharing one midpoint
#[derive(Debug, Clone)]
pub struct DimensionLines {
    /// In discovery order: principal, secondary, third
    pub lines: [Segment; 3],
    pub center: Point3<f64>,
}

/// Line spanning the full extent of `cloud` along `dir`.
///
/// Starts at the lowest projection and runs along `dir`.
pub fn span_line(
    cloud: &[Point3<f64>],
    dir: &Vector3<f64>,
    axis: &'static str,
    tol: &Tolerances,
) -> Result<Segment> {
    let origin = cloud
        .first()
        .ok_or_else(|| Error::insufficient("empty vertex set"))?;
    let (min, max, _, _) = extent_along(cloud, origin, dir)
        .ok_or_else(|| Error::insufficient("empty vertex set"))?;
    let span = max - min;
    if span < tol.linear {
        return Err(Error::DegenerateSpan { axis, span });
    }
    let start = origin + dir * min;
    Ok(Segment::new(start, start + dir * span))
}

/// Extent of a planar polygon along an in-plane direction, measured from `origin`
fn section_extent(
    polygon: &[Point3<f64>],
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    axis: &'static str,
    tol: &Tolerances,
) -> Result<(f64, f64)> {
    let (min, max, _, _) = extent_along(polygon, origin, dir)
        .ok_or_else(|| Error::insufficient("empty cross-section"))?;
    if max - min < tol.linear {
        return Err(Error::DegenerateSpan {
            axis,
            span: max - min,
        });
    }
    Ok((min, max))
}

/// Build the three dimension lines of a vertex cloud.
///
/// The principal line comes from the dominant face pair, the other two from
/// the cross-section through its midpoint. All three are finally re-centred
/// on the middle of the combined bounding box.
pub fn dimension_lines(
    cloud: &[Point3<f64>],
    faces: &[FaceDescriptor],
    tol: &Tolerances,
) -> Result<DimensionLines> {
    let d1 = principal_direction(faces, tol).ok_or(Error::NoPrincipalDirection)?;
    let first = span_line(cloud, &d1, "principal", tol)?;
    tracing::trace!(?d1, span = first.length(), "principal line");

    let section_plane = Plane::new(first.midpoint(), d1).ok_or(Error::NoPrincipalDirection)?;
    let section = simplify_boundary(&section_plane, cloud, tol);
    if section.len() < 4 {
        return Err(Error::insufficient(format!(
            "cross-section reduced to {} points",
            section.len()
        )));
    }

    let d2 = secondary_direction(&section, &section_plane, tol)
        .ok_or_else(|| Error::insufficient("cross-section has no usable edge"))?;
    let d3 = d2
        .cross(&d1)
        .try_normalize(NORMALIZE_EPSILON)
        .ok_or_else(|| Error::insufficient("secondary direction parallel to principal"))?;

    let c = section_plane.origin;
    let (min2, max2) = section_extent(&section, &c, &d2, "secondary", tol)?;
    let (min3, max3) = section_extent(&section, &c, &d3, "third", tol)?;

    let center = c + d2 * ((min2 + max2) * 0.5) + d3 * ((min3 + max3) * 0.5);
    let centered = |dir: &Vector3<f64>, length: f64| {
        let half = dir * (length * 0.5);
        Segment::new(center - half, center + half)
    };

    Ok(DimensionLines {
        lines: [
            centered(&d1, first.length()),
            centered(&d2, max2 - min2),
            centered(&d3, max3 - min3),
        ],
        center,
    })
}

/// The cloud is an extrusion of its section along `dir`: every vertex projects
/// onto a vertex of the start end-plane, and both end-planes carry a face.
pub fn is_extrusion_along(cloud: &[Point3<f64>], dir: &Vector3<f64>, tol: &Tolerances) -> bool {
    let Some(plane) = cloud.first().and_then(|p| Plane::new(*p, *dir)) else {
        return false;
    };
    let Some((min, max, _, _)) = extent_along(cloud, &plane.origin, &plane.normal) else {
        return false;
    };
    if max - min < tol.linear {
        return false;
    }

    let basis = plane.basis();
    let flat = |p: &Point3<f64>| {
        let q = plane.to_local(p, &basis);
        Point3::new(q.x, q.y, 0.0)
    };

    let mut footprint = PointGrid::new(tol.linear);
    let (mut at_start, mut at_end) = (0usize, 0usize);
    for p in cloud {
        let t = plane.signed_distance(p);
        if (t - min).abs() <= tol.linear {
            footprint.insert(flat(p));
            at_start += 1;
        }
        if (max - t).abs() <= tol.linear {
            at_end += 1;
        }
    }
    if at_start < 3 || at_end < 3 {
        return false;
    }

    cloud.iter().all(|p| footprint.contains_near(&flat(p)))
}

/// Classify each line: is its perpendicular section a circle, and is the
/// shape an extrusion along it.
pub fn classify_lines(
    cloud: &[Point3<f64>],
    lines: &DimensionLines,
    tol: &Tolerances,
) -> Result<[DimensionCandidate; 3]> {
    let classify = |line: &Segment| -> Result<DimensionCandidate> {
        let dir = line.direction().ok_or(Error::DegenerateSpan {
            axis: "candidate",
            span: 0.0,
        })?;
        let plane = Plane::new(lines.center, dir).ok_or(Error::NoPrincipalDirection)?;
        let section = simplify_boundary(&plane, cloud, tol);
        let circularity = classify_circle(&section, Some(&lines.center), tol);
        let is_cylinder = is_extrusion_along(cloud, &dir, tol);
        tracing::trace!(
            length = line.length(),
            ?circularity,
            is_cylinder,
            "dimension candidate"
        );
        Ok(DimensionCandidate::new(*line, circularity, is_cylinder))
    };

    let [a, b, c] = &lines.lines;
    Ok([classify(a)?, classify(b)?, classify(c)?])
}

/// Order candidates for assignment: round sections first, then longest first.
///
/// Fails when no candidate is an extrusion direction.
pub fn rank_candidates(candidates: [DimensionCandidate; 3]) -> Result<[DimensionCandidate; 3]> {
    if !candidates.iter().any(|c| c.is_cylinder) {
        return Err(Error::NoCylindricalCandidate);
    }
    let mut ranked = candidates;
    ranked.sort_by(|a, b| {
        b.is_circle()
            .cmp(&a.is_circle())
            .then_with(|| b.length().total_cmp(&a.length()))
    });
    Ok(ranked)
}
