// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel batch extraction on a dedicated rayon pool.

use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::types::{
    AxisReport, BatchReport, BatchRequest, BatchStats, ElementOutcome, ElementRequest,
};
use ifc_axis_geometry::{AxisSolver, FailureReason, Tolerances};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::time::Instant;

/// Convert one element. Extraction failures become fallback outcomes.
pub fn process_element(solver: &AxisSolver, request: &ElementRequest) -> ElementOutcome {
    let hint = request.hint();
    let faces = request.face_descriptors(solver.tolerances());

    match solver.solve(&request.points(), &faces, hint) {
        Ok(result) => ElementOutcome::Converted {
            id: request.id,
            kind: hint.kind,
            axes: AxisReport::from(&result),
        },
        Err(err) => {
            let reason = err.reason();
            tracing::debug!(
                id = request.id,
                kind = hint.kind.name(),
                reason = ?reason,
                error = %err,
                "element falls back to default placement"
            );
            ElementOutcome::Fallback {
                id: request.id,
                kind: hint.kind,
                reason,
                needs_review: reason.needs_review(),
                message: err.to_string(),
            }
        }
    }
}

/// Convert a batch of elements on `config.worker_threads` threads.
///
/// Outcomes keep the request order.
pub fn process_batch(
    requests: &[ElementRequest],
    tolerances: Tolerances,
    config: &ProcessingConfig,
) -> Result<BatchReport> {
    let total_start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build()?;
    let solver = AxisSolver::with_tolerances(tolerances);

    let outcomes: Vec<ElementOutcome> = pool.install(|| {
        requests
            .par_iter()
            .map(|request| process_element(&solver, request))
            .collect()
    });

    let total_time = total_start.elapsed();
    let stats = collect_stats(&outcomes, total_time.as_millis() as u64);

    tracing::info!(
        elements = stats.total_elements,
        converted = stats.converted,
        fallbacks = stats.fallbacks,
        needs_review = stats.needs_review,
        total_time_ms = stats.total_time_ms,
        "Axis extraction complete"
    );

    Ok(BatchReport { outcomes, stats })
}

/// Decode a [`BatchRequest`], process it and encode the [`BatchReport`].
pub fn process_json(input: &str, config: &ProcessingConfig) -> Result<String> {
    let request: BatchRequest = serde_json::from_str(input)?;
    let tolerances = request.tolerances.unwrap_or_else(|| config.tolerances());
    let report = process_batch(&request.elements, tolerances, config)?;
    Ok(serde_json::to_string(&report)?)
}

fn collect_stats(outcomes: &[ElementOutcome], total_time_ms: u64) -> BatchStats {
    let mut reasons: FxHashMap<FailureReason, usize> = FxHashMap::default();
    let mut needs_review = 0;
    for outcome in outcomes {
        if let ElementOutcome::Fallback {
            reason,
            needs_review: review,
            ..
        } = outcome
        {
            *reasons.entry(*reason).or_insert(0) += 1;
            if *review {
                needs_review += 1;
            }
        }
    }

    let mut reasons: Vec<(FailureReason, usize)> = reasons.into_iter().collect();
    reasons.sort_by(|a, b| b.1.cmp(&a.1).then((a.0 as u8).cmp(&(b.0 as u8))));

    let converted = outcomes.iter().filter(|o| o.is_converted()).count();
    BatchStats {
        total_elements: outcomes.len(),
        converted,
        fallbacks: outcomes.len() - converted,
        needs_review,
        reasons,
        total_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_axis_geometry::ElementKind;

    fn fallback(id: u32, reason: FailureReason) -> ElementOutcome {
        ElementOutcome::Fallback {
            id,
            kind: ElementKind::Generic,
            reason,
            needs_review: reason.needs_review(),
            message: String::new(),
        }
    }

    #[test]
    fn test_stats_count_reasons() {
        let outcomes = vec![
            fallback(1, FailureReason::InsufficientGeometry),
            fallback(2, FailureReason::EndPointMismatch),
            fallback(3, FailureReason::InsufficientGeometry),
        ];
        let stats = collect_stats(&outcomes, 5);
        assert_eq!(stats.total_elements, 3);
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.fallbacks, 3);
        assert_eq!(stats.needs_review, 1);
        assert_eq!(
            stats.reasons,
            vec![
                (FailureReason::InsufficientGeometry, 2),
                (FailureReason::EndPointMismatch, 1)
            ]
        );
        assert_eq!(stats.total_time_ms, 5);
    }

    #[test]
    fn test_too_few_vertices_falls_back() {
        let request = ElementRequest {
            id: 42,
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            ..Default::default()
        };
        let outcome = process_element(&AxisSolver::new(), &request);
        assert_eq!(outcome.id(), 42);
        assert_eq!(outcome.reason(), Some(FailureReason::InsufficientGeometry));
    }
}
