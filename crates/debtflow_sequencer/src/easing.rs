// SPDX-License-Identifier: MIT OR Apache-2.0
//! Progress remapping for particle motion.

use serde::{Deserialize, Serialize};

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Inverse of [`Interpolation::lerp`], clamped to `[0, 1]`
    pub fn unlerp_clamped(a: f64, b: f64, value: f64) -> f64 {
        if (b - a).abs() < f64::EPSILON {
            return if value < a { 0.0 } else { 1.0 };
        }
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }

    /// Cubic ease-in-out on `[0, 1]`
    pub fn ease_cubic_in_out(t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            let u = -2.0 * t + 2.0;
            1.0 - u * u * u / 2.0
        }
    }
}

/// S-curve used for the lateral (lane-to-lane) part of a particle's path.
///
/// Progress maps linearly onto `[0, 1]` inside `[start, end]` and is held
/// flat outside it, so particles fall straight down, cross over, then fall
/// straight down again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneRamp {
    /// Progress at which the crossing starts
    pub start: f64,
    /// Progress at which the crossing ends
    pub end: f64,
}

impl LaneRamp {
    /// Create a ramp over a progress window
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Remap progress
    pub fn apply(&self, progress: f64) -> f64 {
        Interpolation::unlerp_clamped(self.start, self.end, progress)
    }
}

impl Default for LaneRamp {
    fn default() -> Self {
        Self::new(0.35, 0.65)
    }
}

impl From<(f64, f64)> for LaneRamp {
    fn from((start, end): (f64, f64)) -> Self {
        Self::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_is_flat_outside_window() {
        let ramp = LaneRamp::default();
        assert_eq!(ramp.apply(-0.2), 0.0);
        assert_eq!(ramp.apply(0.1), 0.0);
        assert_eq!(ramp.apply(0.35), 0.0);
        assert!((ramp.apply(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(ramp.apply(0.65), 1.0);
        assert_eq!(ramp.apply(1.0), 1.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(Interpolation::lerp(2.0, 6.0, 0.25), 3.0);
        assert_eq!(Interpolation::lerp(6.0, 2.0, 1.0), 2.0);
    }

    #[test]
    fn test_cubic_ease() {
        assert_eq!(Interpolation::ease_cubic_in_out(0.0), 0.0);
        assert_eq!(Interpolation::ease_cubic_in_out(0.5), 0.5);
        assert_eq!(Interpolation::ease_cubic_in_out(1.0), 1.0);
        assert!(Interpolation::ease_cubic_in_out(0.25) < 0.25);
        assert!(Interpolation::ease_cubic_in_out(0.75) > 0.75);
    }
}
