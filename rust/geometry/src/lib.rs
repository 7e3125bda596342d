// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Axis Geometry
//!
//! Extracts the location, length and width lines of linear building elements
//! (pipes, ducts, beams, columns, walls, cable trays) from their vertex cloud
//! and planar faces, so a host application can place a parametric replacement.
//!
//! The engine is pure and synchronous: no I/O, no global state, safe to call
//! from many threads at once.
//!
//! ```
//! use ifc_axis_geometry::{solve_axes, Mesh, Point3, Tolerances};
//!
//! let mesh = Mesh::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(200.0, 100.0, 50.0));
//! let faces = mesh.face_descriptors(&Tolerances::default());
//! let axes = solve_axes(&mesh.vertices(), &faces).unwrap();
//! assert!((axes.location.length() - 200.0).abs() < 1e-6);
//! ```

pub mod circle;
pub mod csg;
pub mod cylinder;
pub mod error;
pub mod hull;
pub mod mesh;
pub mod plane;
pub mod reduction;
pub mod solver;
pub mod split;
pub mod tolerance;
pub mod types;
pub mod vector;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, Vector2, Vector3};

pub use circle::{circumcenter, classify_circle, Circularity};
pub use csg::{ClipResult, ClippingProcessor};
pub use cylinder::{cylinder_centerline, find_plane};
pub use error::{Error, FailureReason, Result};
pub use hull::{convex_hull_2d, douglas_peucker};
pub use mesh::Mesh;
pub use plane::{project_onto_plane, signed_distance, Plane};
pub use reduction::{merge_collinear, simplify_boundary};
pub use solver::{solve_axes, AxisOverride, AxisSolver, OverrideRegistry};
pub use split::{divide_shape, SubShape};
pub use tolerance::Tolerances;
pub use types::{
    Aabb, AxisResult, DimensionCandidate, ElementHint, ElementKind, FaceDescriptor, PlanarFace,
    Segment,
};
pub use vector::{is_equal, is_parallel, is_perpendicular};
