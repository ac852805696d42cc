// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unit particles of exposure value.

use crate::easing::{Interpolation, LaneRamp};
use debtflow_graph::CountryId;
use serde::{Deserialize, Serialize};

/// A particle travelling from a lender lane to a borrower lane.
///
/// Jitters are fixed at creation. `released_at` is stamped when the particle
/// leaves the pending pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Lender
    pub source: CountryId,
    /// Borrower
    pub target: CountryId,
    /// Lender rank (lane index)
    pub source_rank: usize,
    /// Borrower rank (lane index)
    pub target_rank: usize,
    /// Offset added to the release time
    pub time_jitter: f64,
    /// Offset across the lane, as a fraction of the lane width
    pub lateral_jitter: f64,
    /// Release time plus jitter, once released
    pub released_at: Option<f64>,
}

impl Particle {
    /// Stamp the release time
    pub fn release(&mut self, elapsed: f64) {
        self.released_at = Some(elapsed + self.time_jitter);
    }

    /// Normalized progress at `elapsed`; 0 while still pending
    pub fn progress(&self, elapsed: f64, duration: f64) -> f64 {
        self.released_at.map_or(0.0, |t0| (elapsed - t0) / duration)
    }

    /// Position for a given progress
    pub fn position(&self, progress: f64, ramp: &LaneRamp) -> ParticlePosition {
        let lane = Interpolation::lerp(
            self.source_rank as f64,
            self.target_rank as f64,
            ramp.apply(progress),
        );
        ParticlePosition {
            source: self.source,
            target: self.target,
            lane,
            lateral_jitter: self.lateral_jitter,
            progress,
        }
    }
}

/// Where an in-flight particle is, independent of any viewport.
///
/// `lane` is a fractional lane index (0 = highest-ranked lender) and
/// `progress` runs from the lender row (0) to the borrower row (1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticlePosition {
    /// Lender
    pub source: CountryId,
    /// Borrower
    pub target: CountryId,
    /// Fractional lane index
    pub lane: f64,
    /// Offset across the lane
    pub lateral_jitter: f64,
    /// Vertical progress
    pub progress: f64,
}
