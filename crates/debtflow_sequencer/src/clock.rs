// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame clocks driving the engine.

/// Source of monotonically increasing frame times
pub trait FrameClock {
    /// Start producing frames
    fn start(&mut self);

    /// Stop producing frames; calling it again has no effect
    fn stop(&mut self);

    /// Rewind to time 0 (stopped)
    fn reset(&mut self);

    /// Whether frames are being produced
    fn is_running(&self) -> bool;

    /// Elapsed time of the next frame, or `None` while stopped
    fn next_frame(&mut self) -> Option<f64>;
}

/// Display refresh interval assumed by the fixed-step clock
pub const DEFAULT_TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Deterministic clock that advances by a fixed step per frame
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepClock {
    /// Step between frames
    pub interval_ms: f64,
    elapsed: f64,
    running: bool,
}

impl FixedStepClock {
    /// Create a stopped clock
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            elapsed: 0.0,
            running: false,
        }
    }

    /// Time of the last produced frame
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL_MS)
    }
}

impl FrameClock for FixedStepClock {
    fn start(&mut self) {
        if !self.running {
            tracing::debug!("Frame clock started at {:.1} ms", self.elapsed);
            self.running = true;
        }
    }

    fn stop(&mut self) {
        if self.running {
            tracing::debug!("Frame clock stopped at {:.1} ms", self.elapsed);
            self.running = false;
        }
    }

    fn reset(&mut self) {
        self.running = false;
        self.elapsed = 0.0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn next_frame(&mut self) -> Option<f64> {
        if !self.running {
            return None;
        }
        self.elapsed += self.interval_ms;
        Some(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_clock_yields_nothing() {
        let mut clock = FixedStepClock::new(10.0);
        assert_eq!(clock.next_frame(), None);
        clock.start();
        assert_eq!(clock.next_frame(), Some(10.0));
        assert_eq!(clock.next_frame(), Some(20.0));
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.next_frame(), None);
        clock.reset();
        clock.start();
        assert_eq!(clock.next_frame(), Some(10.0));
    }
}
