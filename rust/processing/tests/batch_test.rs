// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use ifc_axis_geometry::{ElementKind, FailureReason, Mesh, Point3, Tolerances, Vector3};
use ifc_axis_processing::{
    process_batch, process_json, BatchReport, BatchRequest, BoundsInput, ElementRequest,
    ProcessingConfig,
};

fn config() -> ProcessingConfig {
    ProcessingConfig {
        worker_threads: 2,
        linear_tolerance: 0.3,
        angular_tolerance_deg: 0.29,
        circle_divisor: 10.0,
        unit_scale: 1.0,
    }
}

fn request(id: u32, ifc_class: &str, mesh: &Mesh) -> ElementRequest {
    ElementRequest {
        id,
        ifc_class: Some(ifc_class.to_string()),
        vertices: mesh.positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
        triangles: mesh.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
        ..Default::default()
    }
}

fn block(x: f64, y: f64, z: f64) -> Mesh {
    Mesh::cuboid(
        Point3::new(-x / 2.0, -y / 2.0, -z / 2.0),
        Point3::new(x / 2.0, y / 2.0, z / 2.0),
    )
}

#[test]
fn test_batch_keeps_request_order() {
    let requests: Vec<ElementRequest> = (0..32)
        .map(|i| request(i, "IfcBuildingElementProxy", &block(200.0 + i as f64, 100.0, 50.0)))
        .collect();

    let report = process_batch(&requests, Tolerances::default(), &config()).unwrap();
    assert_eq!(report.stats.total_elements, 32);
    assert_eq!(report.stats.converted, 32);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.id(), i as u32);
        let axes = outcome.axes().unwrap();
        assert_relative_eq!(axes.location.length, 200.0 + i as f64, epsilon = 1e-6);
    }
}

#[test]
fn test_pipe_mesh_is_circular() {
    let mesh = Mesh::cylinder(Point3::origin(), Vector3::x(), 50.0, 1000.0, 24);
    let report = process_batch(&[request(1, "IFCPIPESEGMENT", &mesh)], Tolerances::default(), &config())
        .unwrap();

    let axes = report.outcomes[0].axes().unwrap();
    assert!(axes.is_circular_cross_section);
    assert_relative_eq!(axes.location.length, 1000.0, epsilon = 1.0);
    let frame = axes.frame.unwrap();
    assert_relative_eq!(frame.x_axis[0].abs(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_mixed_batch_reports_fallbacks() {
    let mut degenerate = request(2, "IfcBeam", &block(100.0, 10.0, 10.0));
    degenerate.vertices.truncate(3);
    degenerate.triangles.clear();

    let requests = vec![request(1, "IfcBeam", &block(1000.0, 200.0, 300.0)), degenerate];
    let report = process_batch(&requests, Tolerances::default(), &config()).unwrap();

    assert_eq!(report.stats.converted, 1);
    assert_eq!(report.stats.fallbacks, 1);
    assert_eq!(report.stats.needs_review, 0);
    assert_eq!(report.stats.reasons, vec![(FailureReason::InsufficientGeometry, 1)]);
    assert_eq!(report.outcomes[1].reason(), Some(FailureReason::InsufficientGeometry));
}

#[test]
fn test_duct_uses_neighbor() {
    // Square duct with a neighbour off its long side: the location line points at it
    let mut duct = request(3, "IfcDuctSegment", &block(1000.0, 400.0, 300.0));
    duct.neighbor = Some(BoundsInput {
        min: [-100.0, 300.0, -100.0],
        max: [100.0, 900.0, 100.0],
    });
    let report = process_batch(&[duct], Tolerances::default(), &config()).unwrap();
    let axes = report.outcomes[0].axes().unwrap();
    assert_relative_eq!(axes.location.length, 400.0, epsilon = 1e-6);
}

#[test]
fn test_json_round_trip() {
    let batch = BatchRequest {
        elements: vec![request(9, "IfcColumn", &block(300.0, 300.0, 3000.0))],
        tolerances: None,
    };
    let input = serde_json::to_string(&batch).unwrap();
    let output = process_json(&input, &config()).unwrap();
    let report: BatchReport = serde_json::from_str(&output).unwrap();

    assert_eq!(report.stats.converted, 1);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["outcomes"][0]["status"], "converted");
    assert_eq!(json["outcomes"][0]["kind"], "column");
    let axes = report.outcomes[0].axes().unwrap();
    assert_relative_eq!(axes.location.length, 3000.0, epsilon = 1e-6);
}

#[test]
fn test_json_kind_and_faces() {
    let input = r#"{
        "elements": [{
            "id": 5,
            "kind": "generic",
            "vertices": [[0,0,0],[10,0,0],[10,4,0],[0,4,0],[0,0,2],[10,0,2],[10,4,2],[0,4,2]],
            "faces": [
                {"normal": [0,0,-1], "origin": [0,0,0], "area": 40, "vertex_count": 4},
                {"normal": [0,0,1], "origin": [0,0,2], "area": 40, "vertex_count": 4},
                {"normal": [0,-1,0], "origin": [0,0,0], "area": 20, "vertex_count": 4},
                {"normal": [0,1,0], "origin": [0,4,0], "area": 20, "vertex_count": 4},
                {"normal": [-1,0,0], "origin": [0,0,0], "area": 8, "vertex_count": 4},
                {"normal": [1,0,0], "origin": [10,0,0], "area": 8, "vertex_count": 4}
            ]
        }]
    }"#;
    let report: BatchReport =
        serde_json::from_str(&process_json(input, &config()).unwrap()).unwrap();
    let axes = report.outcomes[0].axes().unwrap();
    assert_relative_eq!(axes.location.length, 10.0, epsilon = 1e-9);
    assert_relative_eq!(axes.center[0], 5.0, epsilon = 1e-9);
}

#[test]
fn test_invalid_json_is_an_error() {
    assert!(process_json("{not json", &config()).is_err());
}

#[test]
fn test_kind_resolution_from_class() {
    let req = request(1, "IfcCableCarrierSegment", &block(10.0, 10.0, 10.0));
    assert_eq!(req.resolved_kind(), ElementKind::CableTray);
}
