// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance configuration shared by every stage of the extractor.
//!
//! All ratios between the bands are kept as named fields so that a caller
//! overriding one value per call does not silently skew the others.

/// Default linear tolerance in model units (millimetres)
pub const DEFAULT_LINEAR: f64 = 0.3;

/// Default angular tolerance: 0.29 degrees, in radians
pub const DEFAULT_ANGULAR: f64 = 0.005_061_454_830_783_556;

/// Radial deviation allowed at polygon vertices is `radius / DEFAULT_CIRCLE_DIVISOR`
pub const DEFAULT_CIRCLE_DIVISOR: f64 = 10.0;

/// Edge midpoints may deviate this many times the vertex band
pub const DEFAULT_MIDPOINT_FACTOR: f64 = 2.0;

/// Slab thickness, as a fraction of the location length, used to collect end clusters
pub const DEFAULT_END_SLICE_FRACTION: f64 = 0.02;

/// Allowed off-axis offset of an end cluster, as a fraction of the location length
pub const DEFAULT_END_OFFSET_FRACTION: f64 = 0.03;

/// Below this many boundary vertices a section is never considered round
pub const DEFAULT_MIN_CIRCLE_VERTICES: usize = 6;

/// Length below which a vector is treated as zero when normalizing
pub const NORMALIZE_EPSILON: f64 = 1e-10;

/// Tolerances for one extraction call
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tolerances {
    /// Distance below which two points are the same point
    pub linear: f64,
    /// Angle (radians) below which two directions are parallel
    pub angular: f64,
    /// Radius divisor for the circle vertex band
    pub circle_divisor: f64,
    /// Multiplier of the vertex band applied at edge midpoints
    pub midpoint_factor: f64,
    /// End-cluster slab thickness relative to location length
    pub end_slice_fraction: f64,
    /// Allowed end-cluster offset relative to location length
    pub end_offset_fraction: f64,
    /// Minimum boundary vertex count for a round section
    pub min_circle_vertices: usize,
}

impl Tolerances {
    /// Create tolerances with explicit linear and angular values, other bands at their defaults
    pub fn new(linear: f64, angular: f64) -> Self {
        Self {
            linear,
            angular,
            ..Self::default()
        }
    }

    /// Defaults for models authored in metres
    pub fn metres() -> Self {
        Self::default().with_unit_scale(0.001)
    }

    /// Rescale the linear tolerance for a model whose unit is `scale` millimetres.
    /// Relative bands are unit-free and stay untouched.
    pub fn with_unit_scale(mut self, scale: f64) -> Self {
        self.linear *= scale;
        self
    }

    /// Override the circle divisor (radius / divisor is the vertex band)
    pub fn with_circle_divisor(mut self, divisor: f64) -> Self {
        self.circle_divisor = divisor;
        self
    }

    /// Cosine threshold at or above which `|u·v|` means parallel
    #[inline]
    pub fn parallel_cos(&self) -> f64 {
        self.angular.cos()
    }

    /// Sine threshold at or below which `|u·v|` means perpendicular
    #[inline]
    pub fn perpendicular_sin(&self) -> f64 {
        self.angular.sin()
    }

    /// Radial band allowed at vertices of a circle of `radius`
    #[inline]
    pub fn vertex_band(&self, radius: f64) -> f64 {
        radius / self.circle_divisor
    }

    /// Radial band allowed at edge midpoints of a circle of `radius`
    #[inline]
    pub fn midpoint_band(&self, radius: f64) -> f64 {
        self.midpoint_factor * self.vertex_band(radius)
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            linear: DEFAULT_LINEAR,
            angular: DEFAULT_ANGULAR,
            circle_divisor: DEFAULT_CIRCLE_DIVISOR,
            midpoint_factor: DEFAULT_MIDPOINT_FACTOR,
            end_slice_fraction: DEFAULT_END_SLICE_FRACTION,
            end_offset_fraction: DEFAULT_END_OFFSET_FRACTION,
            min_circle_vertices: DEFAULT_MIN_CIRCLE_VERTICES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_angular_is_029_degrees() {
        assert!((DEFAULT_ANGULAR.to_degrees() - 0.29).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_band_is_twice_vertex_band() {
        let tol = Tolerances::default();
        assert!((tol.vertex_band(50.0) - 5.0).abs() < 1e-12);
        assert!((tol.midpoint_band(50.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_metres_scales_only_linear() {
        let tol = Tolerances::metres();
        assert!((tol.linear - 0.0003).abs() < 1e-15);
        assert_eq!(tol.angular, DEFAULT_ANGULAR);
        assert_eq!(tol.circle_divisor, DEFAULT_CIRCLE_DIVISOR);
    }
}
