// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flow animation for debtflow.
//!
//! This crate turns a ranked lending graph into an animated sequence:
//! - Particle pools per lender, released in small batches
//! - Arrival counting and per-frame bar values
//! - Highlight dispatch shared with hover and the globe
//! - Playback against a frame clock
//!
//! ## Architecture
//!
//! [`FlowEngine`] owns all mutable animation state and produces a
//! [`FrameSnapshot`] per tick. [`FlowPlayer`] drives it from a
//! [`FrameClock`] and forwards highlight changes through a
//! [`HighlightDispatcher`]. [`BarView`] derives what to draw from a frame
//! and the current highlight.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod easing;
pub mod engine;
pub mod particle;
pub mod player;
pub mod random;
pub mod snapshot;
pub mod view;

pub use clock::{FixedStepClock, FrameClock, DEFAULT_TICK_INTERVAL_MS};
pub use config::{ConfigError, FlowConfig, DEFAULT_MAX_PARTICLES_PER_NODE};
pub use dispatch::{CountryChanged, HighlightDispatcher, SubscriptionId};
pub use easing::{Interpolation, LaneRamp};
pub use engine::{particle_count, ArrivalCounts, EngineError, FlowEngine};
pub use particle::{Particle, ParticlePosition};
pub use player::{FlowPlayer, PlaybackError};
pub use random::{seeded_rng, ParticleRng};
pub use snapshot::{FrameSnapshot, Phase};
pub use view::{BarView, InBar, InSegment, OutBar, Tone};
