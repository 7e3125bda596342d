// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for axis extraction
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an element could not be converted automatically.
///
/// None of these are fatal: the caller is expected to fall back to its own
/// default placement for the element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Insufficient geometry: {0}")]
    InsufficientGeometry(String),

    #[error("No parallel or perpendicular face pair defines a principal direction")]
    NoPrincipalDirection,

    #[error("Degenerate span along {axis}: {span:.6} is below the linear tolerance")]
    DegenerateSpan { axis: &'static str, span: f64 },

    #[error("No dimension candidate is an extrusion of its cross-section")]
    NoCylindricalCandidate,

    #[error("Cross-section circularity is ambiguous for {0}")]
    AmbiguousCircularity(&'static str),

    #[error("End cluster is {offset:.3} off the location line (allowed {allowed:.3})")]
    EndPointMismatch { offset: f64, allowed: f64 },

    #[error("Shape cannot be split: {0}")]
    UnsplittableShape(&'static str),
}

impl Error {
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Error::InsufficientGeometry(msg.into())
    }

    /// Stable tag for the failure, for callers that branch on it.
    pub fn reason(&self) -> FailureReason {
        match self {
            Error::InsufficientGeometry(_) => FailureReason::InsufficientGeometry,
            Error::NoPrincipalDirection => FailureReason::NoPrincipalDirection,
            Error::DegenerateSpan { .. } => FailureReason::DegenerateSpan,
            Error::NoCylindricalCandidate => FailureReason::NoCylindricalCandidate,
            Error::AmbiguousCircularity(_) => FailureReason::AmbiguousCircularity,
            Error::EndPointMismatch { .. } => FailureReason::EndPointMismatch,
            Error::UnsplittableShape(_) => FailureReason::UnsplittableShape,
        }
    }
}

/// Payload-free tag of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureReason {
    InsufficientGeometry,
    NoPrincipalDirection,
    DegenerateSpan,
    NoCylindricalCandidate,
    AmbiguousCircularity,
    EndPointMismatch,
    UnsplittableShape,
}

impl FailureReason {
    /// `true` when the element should be flagged for manual handling rather
    /// than silently placed with the host default.
    pub fn needs_review(self) -> bool {
        matches!(
            self,
            FailureReason::AmbiguousCircularity | FailureReason::EndPointMismatch
        )
    }
}
