// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis solver - location, length and width lines of a linear element
//!
//! Pipeline:
//! 1. principal direction from the dominant face pair
//! 2. principal line over the full vertex extent
//! 3. cross-section through its midpoint, reduced to a boundary polygon
//! 4. secondary direction from the polygon, third as the cross product
//! 5. all three lines re-centred on the shared bounding-box middle
//! 6. classification (round section, extrusion axis) and ranking
//! 7. element-kind overrides and checks

pub mod dimension;
pub mod direction;
pub mod overrides;
pub mod validation;

pub use dimension::{classify_lines, dimension_lines, is_extrusion_along, rank_candidates, DimensionLines};
pub use direction::{principal_direction, secondary_direction};
pub use overrides::{
    Assignment, AxisCheck, AxisOverride, OverrideContext, OverrideRegistry,
};
pub use validation::validate_end_points;

use crate::error::{Error, Result};
use crate::tolerance::Tolerances;
use crate::types::{AxisResult, ElementHint, ElementKind, FaceDescriptor};
use nalgebra::Point3;

/// Minimum vertex count for a solid worth measuring
pub const MIN_VERTICES: usize = 4;

/// Stateless apart from its configuration; safe to share across threads
#[derive(Clone)]
pub struct AxisSolver {
    tolerances: Tolerances,
    overrides: OverrideRegistry,
}

impl AxisSolver {
    /// Solver with default tolerances and the standard override table
    pub fn new() -> Self {
        Self::with_tolerances(Tolerances::default())
    }

    pub fn with_tolerances(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            overrides: OverrideRegistry::default(),
        }
    }

    /// Replace the override table
    pub fn with_overrides(mut self, overrides: OverrideRegistry) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn overrides_mut(&mut self) -> &mut OverrideRegistry {
        &mut self.overrides
    }

    /// Extract the axis lines of one element.
    ///
    /// `vertices` is the element's vertex cloud, `faces` its planar faces.
    /// Non-finite coordinates are ignored.
    pub fn solve(
        &self,
        vertices: &[Point3<f64>],
        faces: &[FaceDescriptor],
        hint: impl Into<ElementHint>,
    ) -> Result<AxisResult> {
        let hint = hint.into();
        let tol = &self.tolerances;

        let cloud = finite_vertices(vertices)?;
        let faces: Vec<FaceDescriptor> = faces
            .iter()
            .filter(|f| f.area.is_finite() && f.plane.normal.iter().all(|c| c.is_finite()))
            .copied()
            .collect();

        let lines = dimension_lines(&cloud, &faces, tol)?;
        let candidates = classify_lines(&cloud, &lines, tol)?;
        let ranked = rank_candidates(candidates)?;

        let ctx = OverrideContext {
            vertices: &cloud,
            hint: &hint,
            tolerances: tol,
        };
        let assignment = self.overrides.apply(&ctx, Assignment::from_ranked(ranked))?;
        let result = AxisResult::new(assignment.location, assignment.length, assignment.width);

        tracing::debug!(
            kind = hint.kind.name(),
            location = result.location.length(),
            length = result.length.length(),
            width = result.width.length(),
            circular = result.is_circular_cross_section,
            "axis lines extracted"
        );
        Ok(result)
    }
}

impl Default for AxisSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract axis lines with default tolerances and no element-kind rules beyond the generic ones
pub fn solve_axes(vertices: &[Point3<f64>], faces: &[FaceDescriptor]) -> Result<AxisResult> {
    AxisSolver::new().solve(vertices, faces, ElementKind::Generic)
}

fn finite_vertices(vertices: &[Point3<f64>]) -> Result<Vec<Point3<f64>>> {
    let cloud: Vec<Point3<f64>> = vertices
        .iter()
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .copied()
        .collect();
    if cloud.len() < MIN_VERTICES {
        return Err(Error::insufficient(format!(
            "{} usable vertices, need at least {}",
            cloud.len(),
            MIN_VERTICES
        )));
    }
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_tiny_input() {
        let solver = AxisSolver::new();
        assert!(matches!(
            solver.solve(&[], &[], ElementKind::Generic),
            Err(Error::InsufficientGeometry(_))
        ));
        assert!(matches!(
            solve_axes(&[Point3::new(1.0, 2.0, 3.0)], &[]),
            Err(Error::InsufficientGeometry(_))
        ));
    }

    #[test]
    fn test_non_finite_vertices_are_ignored() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(1.0, f64::INFINITY, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(matches!(
            solve_axes(&vertices, &[]),
            Err(Error::InsufficientGeometry(_))
        ));
    }

    #[test]
    fn test_missing_faces_has_no_principal_direction() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 10.0),
        ];
        assert_eq!(solve_axes(&vertices, &[]), Err(Error::NoPrincipalDirection));
    }
}
