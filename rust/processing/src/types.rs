// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request and report types for batch extraction.

use ifc_axis_geometry::{
    Aabb, AxisResult, DimensionCandidate, ElementHint, ElementKind, FaceDescriptor,
    FailureReason, Mesh, Plane, Point3, Tolerances, Vector3,
};
use serde::{Deserialize, Serialize};

/// A batch of elements sharing one tolerance set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub elements: Vec<ElementRequest>,
    /// Overrides the configured tolerances for this batch.
    #[serde(default)]
    pub tolerances: Option<Tolerances>,
}

/// One element to convert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementRequest {
    /// Caller-side identifier (usually the IFC express id).
    pub id: u32,
    /// IFC class name, e.g. `IfcPipeSegment`.
    #[serde(default)]
    pub ifc_class: Option<String>,
    /// Explicit kind; wins over `ifc_class`.
    #[serde(default)]
    pub kind: Option<ElementKind>,
    pub vertices: Vec<[f64; 3]>,
    /// Planar faces of a B-rep solid.
    #[serde(default)]
    pub faces: Vec<FaceInput>,
    /// Triangle indices into `vertices`, used when `faces` is empty.
    #[serde(default)]
    pub triangles: Vec<[u32; 3]>,
    /// Bounds of the nearest connected element.
    #[serde(default)]
    pub neighbor: Option<BoundsInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceInput {
    pub normal: [f64; 3],
    pub origin: [f64; 3],
    pub area: f64,
    pub vertex_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsInput {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl ElementRequest {
    /// Element kind from `kind`, then `ifc_class`, else generic.
    pub fn resolved_kind(&self) -> ElementKind {
        self.kind.unwrap_or_else(|| {
            self.ifc_class
                .as_deref()
                .map(ElementKind::from_ifc_class)
                .unwrap_or_default()
        })
    }

    pub fn hint(&self) -> ElementHint {
        let hint = ElementHint::new(self.resolved_kind());
        match self.neighbor {
            Some(b) => hint.with_neighbor(Aabb::new(point(b.min), point(b.max))),
            None => hint,
        }
    }

    pub fn points(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().copied().map(point).collect()
    }

    /// Face descriptors from explicit faces, or grouped from the triangle mesh.
    /// Faces with a zero normal are dropped.
    pub fn face_descriptors(&self, tol: &Tolerances) -> Vec<FaceDescriptor> {
        if !self.faces.is_empty() {
            return self
                .faces
                .iter()
                .filter_map(|f| {
                    let plane = Plane::new(point(f.origin), Vector3::from(f.normal))?;
                    Some(FaceDescriptor::new(plane, f.area, f.vertex_count))
                })
                .collect();
        }

        let mesh = Mesh {
            positions: self.vertices.iter().flatten().copied().collect(),
            indices: self.triangles.iter().flatten().copied().collect(),
        };
        mesh.face_descriptors(tol)
    }
}

fn point(c: [f64; 3]) -> Point3<f64> {
    Point3::from(c)
}

/// One output line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineReport {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub length: f64,
    pub is_circle: bool,
    pub is_cylinder: bool,
}

impl From<&DimensionCandidate> for LineReport {
    fn from(c: &DimensionCandidate) -> Self {
        Self {
            start: c.line.start.coords.into(),
            end: c.line.end.coords.into(),
            length: c.length(),
            is_circle: c.is_circle(),
            is_cylinder: c.is_cylinder,
        }
    }
}

/// Placement frame for the replacement instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub origin: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
    pub z_axis: [f64; 3],
}

/// Extracted axes of a converted element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisReport {
    pub location: LineReport,
    pub length: LineReport,
    pub width: LineReport,
    pub is_circular_cross_section: bool,
    pub center: [f64; 3],
    pub frame: Option<FrameReport>,
}

impl From<&AxisResult> for AxisReport {
    fn from(r: &AxisResult) -> Self {
        let frame = r.frame().map(|iso| FrameReport {
            origin: iso.translation.vector.into(),
            x_axis: (iso.rotation * Vector3::x()).into(),
            y_axis: (iso.rotation * Vector3::y()).into(),
            z_axis: (iso.rotation * Vector3::z()).into(),
        });
        Self {
            location: (&r.location).into(),
            length: (&r.length).into(),
            width: (&r.width).into(),
            is_circular_cross_section: r.is_circular_cross_section,
            center: r.center().coords.into(),
            frame,
        }
    }
}

/// Result for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ElementOutcome {
    Converted {
        id: u32,
        kind: ElementKind,
        axes: AxisReport,
    },
    /// The caller places the element with its own default.
    Fallback {
        id: u32,
        kind: ElementKind,
        reason: FailureReason,
        needs_review: bool,
        message: String,
    },
}

impl ElementOutcome {
    pub fn id(&self) -> u32 {
        match self {
            ElementOutcome::Converted { id, .. } | ElementOutcome::Fallback { id, .. } => *id,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ElementOutcome::Converted { .. })
    }

    pub fn axes(&self) -> Option<&AxisReport> {
        match self {
            ElementOutcome::Converted { axes, .. } => Some(axes),
            ElementOutcome::Fallback { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            ElementOutcome::Fallback { reason, .. } => Some(*reason),
            ElementOutcome::Converted { .. } => None,
        }
    }
}

/// Batch statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Elements in the batch.
    pub total_elements: usize,
    /// Elements with extracted axes.
    pub converted: usize,
    /// Elements left to the caller's default placement.
    pub fallbacks: usize,
    /// Fallbacks that should be checked by hand.
    pub needs_review: usize,
    /// Fallback count per failure reason.
    pub reasons: Vec<(FailureReason, usize)>,
    /// Total processing time (ms).
    pub total_time_ms: u64,
}

/// Outcomes in request order, plus statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<ElementOutcome>,
    pub stats: BatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_resolution_order() {
        let mut request = ElementRequest {
            ifc_class: Some("IfcPipeSegment".into()),
            ..Default::default()
        };
        assert_eq!(request.resolved_kind(), ElementKind::Pipe);

        request.kind = Some(ElementKind::Duct);
        assert_eq!(request.resolved_kind(), ElementKind::Duct);

        assert_eq!(ElementRequest::default().resolved_kind(), ElementKind::Generic);
    }

    #[test]
    fn test_explicit_faces_skip_zero_normals() {
        let request = ElementRequest {
            faces: vec![
                FaceInput {
                    normal: [0.0, 0.0, 2.0],
                    origin: [0.0, 0.0, 5.0],
                    area: 10.0,
                    vertex_count: 4,
                },
                FaceInput {
                    normal: [0.0, 0.0, 0.0],
                    origin: [0.0, 0.0, 0.0],
                    area: 10.0,
                    vertex_count: 4,
                },
            ],
            ..Default::default()
        };
        let faces = request.face_descriptors(&Tolerances::default());
        assert_eq!(faces.len(), 1);
        assert!((faces[0].plane.normal.z - 1.0).abs() < 1e-12);
        assert_eq!(faces[0].edge_loop_vertex_count, 4);
    }

    #[test]
    fn test_triangles_are_grouped_into_faces() {
        let mesh = Mesh::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let request = ElementRequest {
            vertices: mesh.positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
            triangles: mesh.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
            ..Default::default()
        };
        assert_eq!(request.face_descriptors(&Tolerances::default()).len(), 6);
    }

    #[test]
    fn test_outcome_is_tagged() {
        let outcome = ElementOutcome::Fallback {
            id: 7,
            kind: ElementKind::CableTray,
            reason: FailureReason::EndPointMismatch,
            needs_review: true,
            message: "off axis".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "fallback");
        assert_eq!(json["kind"], "cable_tray");
        assert_eq!(json["reason"], "end_point_mismatch");
    }
}
