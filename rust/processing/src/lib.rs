// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch axis extraction.
//!
//! Decodes element requests (vertex clouds with planar faces or triangle
//! meshes), runs the axis solver over them in parallel and reports, per
//! element, either the extracted lines or the reason to fall back to the
//! host's default placement.

pub mod batch;
pub mod config;
pub mod error;
pub mod types;

pub use batch::{process_batch, process_element, process_json};
pub use config::ProcessingConfig;
pub use error::{Error, Result};
pub use types::{
    AxisReport, BatchReport, BatchRequest, BatchStats, BoundsInput, ElementOutcome,
    ElementRequest, FaceInput, FrameReport, LineReport,
};
