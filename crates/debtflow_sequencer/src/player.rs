// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback of a flow animation against a frame clock.

use crate::clock::{FixedStepClock, FrameClock};
use crate::config::{ConfigError, FlowConfig};
use crate::dispatch::{CountryChanged, HighlightDispatcher, SubscriptionId};
use crate::engine::FlowEngine;
use crate::random::seeded_rng;
use crate::snapshot::FrameSnapshot;
use crate::view::BarView;
use debtflow_graph::{CountryId, FlowGraph};
use std::sync::Arc;

/// Couples the engine, a frame clock, and the highlight dispatcher.
///
/// Each tick advances the engine, then publishes the highlight changes it
/// produced. The clock stops by itself once the run settles.
pub struct FlowPlayer<C: FrameClock = FixedStepClock> {
    engine: FlowEngine,
    clock: C,
    dispatcher: HighlightDispatcher,
    frame: Option<FrameSnapshot>,
    frame_count: u64,
}

impl<C: FrameClock> FlowPlayer<C> {
    /// Create a player; the clock stays stopped until [`FlowPlayer::play`]
    pub fn new(graph: Arc<FlowGraph>, config: FlowConfig, clock: C) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: FlowEngine::new(graph, config)?,
            clock,
            dispatcher: HighlightDispatcher::new(),
            frame: None,
            frame_count: 0,
        })
    }

    /// Register a highlight subscriber (setup only)
    pub fn subscribe(&mut self, subscriber: impl FnMut(CountryChanged) + 'static) -> SubscriptionId {
        self.dispatcher.subscribe(subscriber)
    }

    /// Remove a highlight subscriber (teardown only)
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Start the clock and announce the first active node.
    ///
    /// A run cannot be resumed: once frames have been played, playing a
    /// stopped player starts a fresh run from the highest-ranked node.
    pub fn play(&mut self) {
        if self.clock.is_running() {
            return;
        }
        if self.frame_count > 0 {
            tracing::debug!("Replaying from the first node after {} frames", self.frame_count);
            self.restart();
            return;
        }
        self.clock.start();
        self.flush_events();
    }

    /// Advance one frame; `None` when the clock is stopped
    pub fn tick(&mut self) -> Option<&FrameSnapshot> {
        let elapsed = self.clock.next_frame()?;
        let frame = self.engine.advance(elapsed);
        self.frame_count += 1;
        self.flush_events();

        if frame.is_settled() {
            self.clock.stop();
            tracing::info!("Playback finished after {} frames", self.frame_count);
        }
        self.frame = Some(frame);
        self.frame.as_ref()
    }

    /// Play until the run settles, giving up after `max_ticks` frames
    pub fn run_to_completion(&mut self, max_ticks: usize) -> Result<u64, PlaybackError> {
        self.play();
        for _ in 0..max_ticks {
            let settled = match self.tick() {
                Some(frame) => frame.is_settled(),
                None => break,
            };
            if settled {
                return Ok(self.frame_count);
            }
        }
        if self.engine.is_settled() {
            Ok(self.frame_count)
        } else {
            Err(PlaybackError::TickLimit(max_ticks))
        }
    }

    fn flush_events(&mut self) {
        for event in self.engine.take_events() {
            self.dispatcher.publish(event);
        }
    }

    /// Pointer entered a lender bar. Ignored until the run settles.
    pub fn hover(&mut self, id: CountryId) -> bool {
        if !self.engine.is_settled() {
            tracing::debug!("Ignoring hover on {id} while animating");
            return false;
        }
        if self.engine.graph().node_by_id(id).is_none() {
            tracing::warn!("Hover on unknown country {id}");
            return false;
        }
        self.dispatcher.set_highlight(id);
        true
    }

    /// Pointer left a lender bar
    pub fn unhover(&mut self) -> bool {
        if !self.engine.is_settled() {
            return false;
        }
        self.dispatcher.clear_highlight();
        true
    }

    /// Stop the clock and drop every subscription; safe to call repeatedly
    pub fn stop(&mut self) {
        self.clock.stop();
        if self.dispatcher.subscriber_count() > 0 {
            tracing::debug!("Dropping {} highlight subscribers", self.dispatcher.subscriber_count());
        }
        self.dispatcher.clear();
    }

    /// Start a fresh run from the highest-ranked node
    pub fn restart(&mut self) {
        self.clock.reset();
        self.frame = None;
        self.frame_count = 0;
        let rng = seeded_rng(self.engine.config().seed);
        self.engine.reset_with_rng(rng);
        self.clock.start();
        self.flush_events();
    }

    /// The most recent frame
    pub fn frame(&self) -> Option<&FrameSnapshot> {
        self.frame.as_ref()
    }

    /// Bars and labels for the most recent frame and the current highlight
    pub fn view(&self) -> Option<BarView> {
        let frame = self.frame.as_ref()?;
        Some(BarView::derive(self.engine.graph(), frame, self.dispatcher.current()))
    }

    /// The highlighted country
    pub fn highlighted(&self) -> Option<CountryId> {
        self.dispatcher.current()
    }

    /// Frames played in this run
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The engine
    pub fn engine(&self) -> &FlowEngine {
        &self.engine
    }

    /// The clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The graph being played
    pub fn graph(&self) -> &Arc<FlowGraph> {
        self.engine.graph()
    }
}

/// Error during playback
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    /// The run did not settle in time
    #[error("Animation did not settle within {0} frames")]
    TickLimit(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use debtflow_graph::{CountryRegistry, DebtRecord};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn graph() -> Arc<FlowGraph> {
        let registry = CountryRegistry::bis_default();
        let records = vec![
            DebtRecord::new("Greece", "France", 12.0),
            DebtRecord::new("Greece", "Germany", 8.5),
            DebtRecord::new("Italy", "France", 20.0),
            DebtRecord::new("Spain", "Germany", 9.0),
            DebtRecord::new("Ireland", "Britain", 6.0),
        ];
        Arc::new(FlowGraph::build(&registry, &records).unwrap())
    }

    fn player() -> FlowPlayer {
        let config = FlowConfig::default().with_unit_size(2.0).with_seed(21);
        FlowPlayer::new(graph(), config, FixedStepClock::default()).unwrap()
    }

    #[test]
    fn test_full_run_publishes_n_plus_one_events() {
        let mut player = player();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        player.subscribe(move |e| sink.borrow_mut().push(e.0));

        player.run_to_completion(50_000).unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), player.graph().node_count() + 1);
        assert_eq!(events.last(), Some(&None));
        let announced: Vec<_> = events.iter().flatten().copied().collect();
        let ranked: Vec<_> = player.graph().ids().collect();
        assert_eq!(announced, ranked);
        assert!(!player.clock().is_running());
        assert!(player.tick().is_none());
    }

    #[test]
    fn test_hover_only_after_settle() {
        let mut player = player();
        let france = CountryId(250);
        player.play();
        player.tick();
        assert!(!player.hover(france));

        player.run_to_completion(50_000).unwrap();
        assert!(player.hover(france));
        assert_eq!(player.highlighted(), Some(france));

        let view = player.view().unwrap();
        let greece = player.graph().rank_of(CountryId(300)).unwrap();
        assert_eq!(view.in_bars[greece].label_value, 12.0);

        assert!(player.unhover());
        assert_eq!(player.highlighted(), None);
        assert!(!player.hover(CountryId(4)));
    }

    #[test]
    fn test_stop_is_idempotent_and_drops_subscribers() {
        let mut player = player();
        let first = player.subscribe(|_| {});
        player.subscribe(|_| {});
        player.play();
        player.stop();
        player.stop();
        assert!(!player.clock().is_running());
        assert!(player.tick().is_none());
        assert!(!player.unsubscribe(first));
    }

    #[test]
    fn test_play_after_stop_starts_a_fresh_run() {
        let mut player = player();
        player.play();
        for _ in 0..200 {
            player.tick();
        }
        assert_ne!(player.engine().phase().active_index(), Some(0));
        player.stop();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        player.subscribe(move |e| sink.borrow_mut().push(e.0));
        player.play();

        assert_eq!(player.engine().phase().active_index(), Some(0));
        assert_eq!(player.frame_count(), 0);
        assert!(player.clock().is_running());
        let first = player.graph().ids().next();
        assert_eq!(*events.borrow(), vec![first]);

        player.tick();
        assert_eq!(player.engine().phase().active_index(), Some(0));
        assert_eq!(player.frame_count(), 1);
    }

    #[test]
    fn test_restart_replays_the_same_run() {
        let mut player = player();
        let first = player.run_to_completion(50_000).unwrap();
        let settled = player.frame().cloned();

        player.restart();
        assert_eq!(player.engine().phase().active_index(), Some(0));
        let second = player.run_to_completion(50_000).unwrap();
        assert_eq!(first, second);
        assert_eq!(player.frame().cloned(), settled);
    }

    #[test]
    fn test_tick_limit() {
        let mut player = player();
        assert_eq!(player.run_to_completion(3), Err(PlaybackError::TickLimit(3)));
    }
}
