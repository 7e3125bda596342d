// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types exchanged with the caller

use crate::circle::Circularity;
use crate::plane::Plane;
use crate::tolerance::NORMALIZE_EPSILON;
use crate::vector::{polygon_area, WORLD_UP};
use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};
use std::str::FromStr;

/// Finite line segment
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    #[inline]
    pub fn midpoint(&self) -> Point3<f64> {
        nalgebra::center(&self.start, &self.end)
    }

    /// Unit direction from start to end, `None` for a zero-length segment
    #[inline]
    pub fn direction(&self) -> Option<Vector3<f64>> {
        (self.end - self.start).try_normalize(NORMALIZE_EPSILON)
    }

    /// Same midpoint and direction, new length
    pub fn with_length(&self, length: f64) -> Self {
        match self.direction() {
            Some(d) => {
                let mid = self.midpoint();
                let half = d * (length * 0.5);
                Self::new(mid - half, mid + half)
            }
            None => *self,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set, `None` when empty
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// One planar face of a solid or mesh, reduced to what the axis solver needs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceDescriptor {
    pub plane: Plane,
    pub area: f64,
    pub edge_loop_vertex_count: usize,
}

impl FaceDescriptor {
    pub fn new(plane: Plane, area: f64, edge_loop_vertex_count: usize) -> Self {
        Self {
            plane,
            area,
            edge_loop_vertex_count,
        }
    }
}

/// Planar face with its ordered outer boundary loop
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarFace {
    pub plane: Plane,
    pub boundary: Vec<Point3<f64>>,
}

impl PlanarFace {
    /// Face from a boundary loop; the normal follows the loop winding.
    /// Returns `None` for loops with fewer than three points or no area.
    pub fn from_boundary(boundary: Vec<Point3<f64>>) -> Option<Self> {
        if boundary.len() < 3 {
            return None;
        }
        let plane = Plane::from_loop(&boundary)?;
        Some(Self { plane, boundary })
    }

    /// Face with a known plane (e.g. a clipped piece of an existing face)
    pub fn with_plane(plane: Plane, boundary: Vec<Point3<f64>>) -> Self {
        Self { plane, boundary }
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.boundary)
    }

    pub fn descriptor(&self) -> FaceDescriptor {
        FaceDescriptor::new(self.plane, self.area(), self.boundary.len())
    }
}

/// One of the three candidate dimension lines
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionCandidate {
    pub line: Segment,
    /// The shape is an extrusion of its section along the line
    pub is_cylinder: bool,
    /// Full circle classification of the perpendicular section
    pub circularity: Circularity,
}

impl DimensionCandidate {
    pub fn new(line: Segment, circularity: Circularity, is_cylinder: bool) -> Self {
        Self {
            line,
            is_cylinder,
            circularity,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.line.length()
    }

    #[inline]
    pub fn direction(&self) -> Option<Vector3<f64>> {
        self.line.direction()
    }

    /// Section perpendicular to the line is a circle
    #[inline]
    pub fn is_circle(&self) -> bool {
        self.circularity.is_circle()
    }

    /// Mark the section as round after a rule has resolved its ambiguity
    pub fn promoted_to_circle(mut self) -> Self {
        self.circularity = Circularity::Circle;
        self
    }
}

/// Output of the axis solver
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisResult {
    pub location: DimensionCandidate,
    pub length: DimensionCandidate,
    pub width: DimensionCandidate,
    pub is_circular_cross_section: bool,
}

impl AxisResult {
    pub fn new(location: DimensionCandidate, length: DimensionCandidate, width: DimensionCandidate) -> Self {
        Self {
            is_circular_cross_section: location.is_circle(),
            location,
            length,
            width,
        }
    }

    /// Shared midpoint of the three lines
    pub fn center(&self) -> Point3<f64> {
        self.location.line.midpoint()
    }

    /// Right-handed local frame for placing a replacement instance:
    /// origin at the location line start, X along the location line,
    /// Y along the length line, Z = X × Y.
    pub fn frame(&self) -> Option<Isometry3<f64>> {
        let x = self.location.direction()?;
        let y_raw = self
            .length
            .direction()
            .or_else(|| self.width.direction())
            .unwrap_or(WORLD_UP);
        let y = (y_raw - x * y_raw.dot(&x)).try_normalize(NORMALIZE_EPSILON)?;
        let z = x.cross(&y);

        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
        Some(Isometry3::from_parts(
            Translation3::from(self.location.line.start.coords),
            UnitQuaternion::from_rotation_matrix(&rotation),
        ))
    }
}

/// Element category the caller is converting; selects the tie-break rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ElementKind {
    Pipe,
    Duct,
    Beam,
    Column,
    Wall,
    CableTray,
    /// Equipment-like elements placed by their longest extent
    GenericEquipment,
    #[default]
    Generic,
}

impl ElementKind {
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Pipe,
        ElementKind::Duct,
        ElementKind::Beam,
        ElementKind::Column,
        ElementKind::Wall,
        ElementKind::CableTray,
        ElementKind::GenericEquipment,
        ElementKind::Generic,
    ];

    /// Map an IFC class name (any case, with or without the `Ifc` prefix)
    pub fn from_ifc_class(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("IFC").unwrap_or(&upper);
        match bare {
            "PIPESEGMENT" | "PIPEFITTING" | "FLOWSEGMENT" => ElementKind::Pipe,
            "DUCTSEGMENT" | "DUCTFITTING" | "DUCTSILENCER" => ElementKind::Duct,
            "BEAM" | "BEAMSTANDARDCASE" | "MEMBER" | "MEMBERSTANDARDCASE" => ElementKind::Beam,
            "COLUMN" | "COLUMNSTANDARDCASE" | "PILE" => ElementKind::Column,
            "WALL" | "WALLSTANDARDCASE" | "WALLELEMENTEDCASE" => ElementKind::Wall,
            "CABLECARRIERSEGMENT" | "CABLECARRIERFITTING" | "CABLESEGMENT" => ElementKind::CableTray,
            "FLOWTERMINAL" | "FLOWCONTROLLER" | "FLOWMOVINGDEVICE" | "ENERGYCONVERSIONDEVICE"
            | "BUILDINGELEMENTPROXY" | "DISTRIBUTIONELEMENT" => ElementKind::GenericEquipment,
            _ => ElementKind::Generic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Pipe => "pipe",
            ElementKind::Duct => "duct",
            ElementKind::Beam => "beam",
            ElementKind::Column => "column",
            ElementKind::Wall => "wall",
            ElementKind::CableTray => "cable_tray",
            ElementKind::GenericEquipment => "generic_equipment",
            ElementKind::Generic => "generic",
        }
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ElementKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown element kind: {}", s))
    }
}

/// Caller-side context for one extraction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementHint {
    pub kind: ElementKind,
    /// Bounds of the nearest neighbouring element, used by duct and cable tray rules
    pub neighbor: Option<Aabb>,
}

impl ElementHint {
    pub fn new(kind: ElementKind) -> Self {
        Self { kind, neighbor: None }
    }

    pub fn with_neighbor(mut self, neighbor: Aabb) -> Self {
        self.neighbor = Some(neighbor);
        self
    }
}

impl From<ElementKind> for ElementHint {
    fn from(kind: ElementKind) -> Self {
        Self::new(kind)
    }
}
