// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch configuration loaded from environment variables.

use ifc_axis_geometry::tolerance::{DEFAULT_ANGULAR, DEFAULT_CIRCLE_DIVISOR, DEFAULT_LINEAR};
use ifc_axis_geometry::Tolerances;
use std::str::FromStr;

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingConfig {
    /// Number of worker threads for extraction.
    pub worker_threads: usize,
    /// Linear tolerance in millimetres, before unit scaling.
    pub linear_tolerance: f64,
    /// Angular tolerance in degrees.
    pub angular_tolerance_deg: f64,
    /// Radius divisor for the circle vertex band.
    pub circle_divisor: f64,
    /// Model units per millimetre (0.001 for models authored in metres).
    pub unit_scale: f64,
}

impl ProcessingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            worker_threads: match parse_or(std::env::var("AXIS_WORKER_THREADS").ok(), 0) {
                0 => num_cpus::get(),
                n => n,
            },
            linear_tolerance: positive_or(std::env::var("AXIS_LINEAR_TOLERANCE").ok(), DEFAULT_LINEAR),
            angular_tolerance_deg: positive_or(
                std::env::var("AXIS_ANGULAR_TOLERANCE_DEG").ok(),
                DEFAULT_ANGULAR.to_degrees(),
            ),
            circle_divisor: positive_or(
                std::env::var("AXIS_CIRCLE_DIVISOR").ok(),
                DEFAULT_CIRCLE_DIVISOR,
            ),
            unit_scale: positive_or(std::env::var("AXIS_UNIT_SCALE").ok(), 1.0),
        }
    }

    /// Engine tolerances for this configuration.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances::new(self.linear_tolerance, self.angular_tolerance_deg.to_radians())
            .with_circle_divisor(self.circle_divisor)
            .with_unit_scale(self.unit_scale)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse an optional raw value, falling back to `default` when absent or invalid.
pub fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn positive_or(raw: Option<String>, default: f64) -> f64 {
    let value = parse_or(raw, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> ProcessingConfig {
        ProcessingConfig {
            worker_threads: 2,
            linear_tolerance: 0.3,
            angular_tolerance_deg: 0.29,
            circle_divisor: 10.0,
            unit_scale: 1.0,
        }
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or(Some(" 8 ".into()), 1usize), 8);
        assert_eq!(parse_or(Some("eight".into()), 1usize), 1);
        assert_eq!(parse_or::<f64>(None, 0.5), 0.5);
    }

    #[test]
    fn test_positive_or_rejects_non_positive() {
        assert_eq!(positive_or(Some("-1".into()), 0.3), 0.3);
        assert_eq!(positive_or(Some("0".into()), 0.3), 0.3);
        assert_eq!(positive_or(Some("NaN".into()), 0.3), 0.3);
        assert_eq!(positive_or(Some("0.5".into()), 0.3), 0.5);
    }

    #[test]
    fn test_tolerances_match_engine_defaults() {
        let tol = config().tolerances();
        let defaults = Tolerances::default();
        assert_relative_eq!(tol.linear, defaults.linear, epsilon = 1e-12);
        assert_relative_eq!(tol.angular, defaults.angular, epsilon = 1e-12);
        assert_relative_eq!(tol.circle_divisor, defaults.circle_divisor);
    }

    #[test]
    fn test_unit_scale_applies_to_linear_only() {
        let tol = ProcessingConfig {
            unit_scale: 0.001,
            ..config()
        }
        .tolerances();
        assert_relative_eq!(tol.linear, 0.0003, epsilon = 1e-15);
        assert_relative_eq!(tol.angular, 0.29f64.to_radians(), epsilon = 1e-12);
    }
}
