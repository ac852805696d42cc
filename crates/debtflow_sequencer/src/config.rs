// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flow engine configuration.

use serde::{Deserialize, Serialize};

/// Tuning options for a flow animation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Exposure value represented by one particle
    pub unit_size: f64,
    /// Particles released from the pending pool per tick
    pub release_batch_size: usize,
    /// Time for a particle to travel from lender to borrower
    pub animation_duration_ms: f64,
    /// Release time jitter window, symmetric around 0
    pub time_jitter_range: (f64, f64),
    /// Lateral jitter window, as a fraction of the lane width
    pub lateral_jitter_range: (f64, f64),
    /// Progress window in which particles cross between lanes
    pub lane_ramp: (f64, f64),
    /// Largest particle pool a single node may create
    pub max_particles_per_node: usize,
    /// Random seed; `None` picks one per run
    pub seed: Option<u64>,
}

/// Default cap on particles per activation
pub const DEFAULT_MAX_PARTICLES_PER_NODE: usize = 1_000_000;

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            unit_size: 1.0,
            release_batch_size: 2,
            animation_duration_ms: 2000.0,
            time_jitter_range: (-0.1, 0.1),
            lateral_jitter_range: (-0.5, 0.5),
            lane_ramp: (0.35, 0.65),
            max_particles_per_node: DEFAULT_MAX_PARTICLES_PER_NODE,
            seed: None,
        }
    }
}

impl FlowConfig {
    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the value carried by one particle
    pub fn with_unit_size(mut self, unit_size: f64) -> Self {
        self.unit_size = unit_size;
        self
    }

    /// Disable both jitters
    pub fn without_jitter(mut self) -> Self {
        self.time_jitter_range = (0.0, 0.0);
        self.lateral_jitter_range = (0.0, 0.0);
        self
    }

    /// Check every option
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.unit_size.is_finite() && self.unit_size > 0.0) {
            return Err(ConfigError::UnitSize(self.unit_size));
        }
        if self.release_batch_size == 0 {
            return Err(ConfigError::ReleaseBatchSize);
        }
        if !(self.animation_duration_ms.is_finite() && self.animation_duration_ms > 0.0) {
            return Err(ConfigError::Duration(self.animation_duration_ms));
        }

        let (lo, hi) = self.time_jitter_range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi || (lo + hi).abs() > f64::EPSILON {
            return Err(ConfigError::TimeJitter(lo, hi));
        }

        let (lo, hi) = self.lateral_jitter_range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(ConfigError::LateralJitter(lo, hi));
        }

        let (start, end) = self.lane_ramp;
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) || start >= end {
            return Err(ConfigError::LaneRamp(start, end));
        }

        if self.max_particles_per_node == 0 {
            return Err(ConfigError::ParticleCap);
        }

        Ok(())
    }
}

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Unit size must be positive
    #[error("Invalid configuration: unit size must be positive, got {0}")]
    UnitSize(f64),

    /// Batch size must be at least one
    #[error("Invalid configuration: release batch size must be at least 1")]
    ReleaseBatchSize,

    /// Duration must be positive
    #[error("Invalid configuration: animation duration must be positive, got {0}")]
    Duration(f64),

    /// Time jitter must be symmetric around 0
    #[error("Invalid configuration: time jitter range [{0}, {1}] is not symmetric around 0")]
    TimeJitter(f64, f64),

    /// Lateral jitter range is empty
    #[error("Invalid configuration: lateral jitter range [{0}, {1}] is empty")]
    LateralJitter(f64, f64),

    /// Lane ramp must lie within [0, 1]
    #[error("Invalid configuration: lane ramp [{0}, {1}] must be an increasing window in [0, 1]")]
    LaneRamp(f64, f64),

    /// Particle cap must be at least one
    #[error("Invalid configuration: particle cap must be at least 1")]
    ParticleCap,

    /// A node would create more particles than the cap allows
    #[error("Invalid configuration: {node} needs {particles} particles at unit size {unit_size}, cap is {limit}")]
    TooManyParticles {
        /// Lender code
        node: String,
        /// Particles the node would create
        particles: f64,
        /// Configured unit size
        unit_size: f64,
        /// Configured cap
        limit: usize,
    },
}
