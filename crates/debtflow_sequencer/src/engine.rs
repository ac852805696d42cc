// SPDX-License-Identifier: MIT OR Apache-2.0
//! The flow animation engine.
//!
//! Nodes are visited in rank order. Entering a node turns its outbound edges
//! into a shuffled pool of unit particles; each tick releases a small batch,
//! advances every in-flight particle, and counts arrivals per
//! (borrower, lender) pair. Once every particle of the active node has
//! arrived the engine moves to the next node, and after the last one it
//! settles.

use crate::config::{ConfigError, FlowConfig};
use crate::dispatch::CountryChanged;
use crate::easing::LaneRamp;
use crate::particle::Particle;
use crate::random::{seeded_rng, ParticleRng};
use crate::snapshot::{FrameSnapshot, Phase};
use debtflow_graph::{CountryId, FlowGraph};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;

/// Arrived particle counts keyed by (borrower, lender)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalCounts {
    counts: HashMap<(CountryId, CountryId), usize>,
    total: usize,
}

impl ArrivalCounts {
    /// Count one arrival
    pub fn record(&mut self, target: CountryId, source: CountryId) {
        *self.counts.entry((target, source)).or_insert(0) += 1;
        self.total += 1;
    }

    /// Arrivals for a pair
    pub fn get(&self, target: CountryId, source: CountryId) -> usize {
        self.counts.get(&(target, source)).copied().unwrap_or(0)
    }

    /// Arrivals over all pairs
    pub fn total(&self) -> usize {
        self.total
    }

    /// Forget every arrival
    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}

/// Flow animation state machine.
///
/// The graph is shared read-only; all mutable state is engine-local.
pub struct FlowEngine<R: ParticleRng = StdRng> {
    graph: Arc<FlowGraph>,
    config: FlowConfig,
    ramp: LaneRamp,
    rng: R,
    phase: Phase,
    /// Particles not yet released; released from the back
    pending: Vec<Particle>,
    in_flight: Vec<Particle>,
    arrivals: ArrivalCounts,
    /// Particles created for the active node
    activation_total: usize,
    last_elapsed: f64,
    /// Highlight changes not yet taken by the host
    pending_events: Vec<CountryChanged>,
}

impl FlowEngine<StdRng> {
    /// Create an engine seeded from the configuration
    pub fn new(graph: Arc<FlowGraph>, config: FlowConfig) -> Result<Self, ConfigError> {
        let rng = seeded_rng(config.seed);
        Self::with_rng(graph, config, rng)
    }
}

impl<R: ParticleRng> FlowEngine<R> {
    /// Create an engine with an explicit random source
    pub fn with_rng(graph: Arc<FlowGraph>, config: FlowConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        check_particle_cap(&graph, &config)?;
        let mut engine = Self {
            graph,
            ramp: config.lane_ramp.into(),
            config,
            rng,
            phase: Phase::Settled,
            pending: Vec::new(),
            in_flight: Vec::new(),
            arrivals: ArrivalCounts::default(),
            activation_total: 0,
            last_elapsed: 0.0,
            pending_events: Vec::new(),
        };
        engine.reset();
        Ok(engine)
    }

    /// Restart the run at the highest-ranked node
    pub fn reset(&mut self) {
        self.pending.clear();
        self.in_flight.clear();
        self.arrivals.clear();
        self.activation_total = 0;
        self.last_elapsed = 0.0;
        self.pending_events.clear();

        if self.graph.is_empty() {
            self.settle();
        } else {
            self.enter(0);
        }
    }

    /// Replace the random source and restart the run
    pub fn reset_with_rng(&mut self, rng: R) {
        self.rng = rng;
        self.reset();
    }

    /// Advance the run to `elapsed` and capture the resulting frame.
    ///
    /// Within one call: release, then progress and arrivals, then the
    /// completion check, then the snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the graph's rank order is inconsistent, which cannot happen
    /// for a graph produced by the builder.
    pub fn advance(&mut self, elapsed: f64) -> FrameSnapshot {
        let elapsed = if elapsed < self.last_elapsed {
            tracing::warn!("Frame clock went backwards ({elapsed} < {})", self.last_elapsed);
            self.last_elapsed
        } else {
            elapsed
        };
        self.last_elapsed = elapsed;

        if let Phase::Active(index) = self.phase {
            self.release(elapsed);
            self.collect_arrivals(elapsed);

            if self.arrivals.total() == self.activation_total {
                self.complete(index);
            }
        }

        self.snapshot(elapsed)
    }

    /// Move up to one batch of particles from the pool into flight
    fn release(&mut self, elapsed: f64) {
        for _ in 0..self.config.release_batch_size {
            let Some(mut particle) = self.pending.pop() else {
                break;
            };
            particle.release(elapsed);
            self.in_flight.push(particle);
        }
    }

    /// Retire every particle whose progress passed 1
    fn collect_arrivals(&mut self, elapsed: f64) {
        let duration = self.config.animation_duration_ms;
        let arrivals = &mut self.arrivals;
        self.in_flight.retain(|particle| {
            if particle.progress(elapsed, duration) > 1.0 {
                tracing::trace!("Particle {} -> {} arrived", particle.source, particle.target);
                arrivals.record(particle.target, particle.source);
                false
            } else {
                true
            }
        });
    }

    fn complete(&mut self, index: usize) {
        tracing::debug!("Node at rank {index} drained");
        if index + 1 < self.graph.node_count() {
            self.enter(index + 1);
        } else {
            self.settle();
        }
    }

    fn enter(&mut self, index: usize) {
        if let Err(err) = self.activate(index) {
            tracing::error!("{err}");
            panic!("{err}");
        }
    }

    /// Build the shuffled particle pool for the node at `index`
    fn activate(&mut self, index: usize) -> Result<(), EngineError> {
        let graph = Arc::clone(&self.graph);
        let node = graph
            .node(index)
            .ok_or_else(|| EngineError::InvariantViolation(format!("no node at rank {index}")))?;

        let (time_lo, time_hi) = self.config.time_jitter_range;
        let (lateral_lo, lateral_hi) = self.config.lateral_jitter_range;

        let mut pool = Vec::new();
        for edge in &node.outs {
            let target_rank = graph.rank_of(edge.target).ok_or_else(|| {
                EngineError::InvariantViolation(format!("borrower {} is not ranked", edge.target))
            })?;
            let count = particle_count(edge.value, self.config.unit_size);
            for _ in 0..count {
                pool.push(Particle {
                    source: edge.source,
                    target: edge.target,
                    source_rank: index,
                    target_rank,
                    time_jitter: self.rng.uniform(time_lo, time_hi),
                    lateral_jitter: self.rng.uniform(lateral_lo, lateral_hi),
                    released_at: None,
                });
            }
        }
        self.rng.shuffle(&mut pool);

        self.activation_total = pool.len();
        self.pending = pool;
        self.in_flight.clear();
        self.arrivals.clear();
        self.phase = Phase::Active(index);
        self.pending_events.push(CountryChanged(Some(node.id)));

        tracing::info!(
            "Animating {} ({} of {}): {} particles",
            node.code,
            index + 1,
            graph.node_count(),
            self.activation_total
        );
        Ok(())
    }

    fn settle(&mut self) {
        self.phase = Phase::Settled;
        self.pending.clear();
        self.in_flight.clear();
        self.activation_total = 0;
        self.pending_events.push(CountryChanged(None));
        tracing::info!("Flow animation settled");
    }

    fn snapshot(&self, elapsed: f64) -> FrameSnapshot {
        let duration = self.config.animation_duration_ms;
        let particles = self
            .in_flight
            .iter()
            .map(|p| p.position(p.progress(elapsed, duration), &self.ramp))
            .collect();

        FrameSnapshot::capture(
            &self.graph,
            self.phase,
            self.pending.len(),
            &self.arrivals,
            self.config.unit_size,
            elapsed,
            particles,
        )
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if the run is over
    pub fn is_settled(&self) -> bool {
        self.phase.is_settled()
    }

    /// Particles waiting in the active pool
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Particles currently moving
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Particles created for the active node
    pub fn activation_total(&self) -> usize {
        self.activation_total
    }

    /// Arrivals for the active node
    pub fn arrivals(&self) -> &ArrivalCounts {
        &self.arrivals
    }

    /// Get pending highlight changes and clear them
    pub fn take_events(&mut self) -> Vec<CountryChanged> {
        std::mem::take(&mut self.pending_events)
    }

    /// The graph being animated
    pub fn graph(&self) -> &Arc<FlowGraph> {
        &self.graph
    }

    /// The engine configuration
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }
}

/// Number of particles representing `value`; the last one carries any remainder
pub fn particle_count(value: f64, unit_size: f64) -> usize {
    (value / unit_size).ceil() as usize
}

/// Reject a unit size that would give some node more particles than the cap
fn check_particle_cap(graph: &FlowGraph, config: &FlowConfig) -> Result<(), ConfigError> {
    let limit = config.max_particles_per_node;
    for node in graph.nodes() {
        // counted in f64 so that oversized pools cannot saturate
        let particles: f64 = node.outs.iter().map(|e| (e.value / config.unit_size).ceil()).sum();
        if particles > limit as f64 {
            return Err(ConfigError::TooManyParticles {
                node: node.code.clone(),
                particles,
                unit_size: config.unit_size,
                limit,
            });
        }
    }
    Ok(())
}

/// Error inside the engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The graph does not match the frozen rank order
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_PARTICLES_PER_NODE;
    use debtflow_graph::{Country, CountryRegistry, DebtRecord, StackInterval};

    const TICK: f64 = 16.0;

    fn build(names: &[&str], records: &[DebtRecord]) -> Arc<FlowGraph> {
        let mut registry = CountryRegistry::new();
        for (i, name) in names.iter().enumerate() {
            registry.register(Country::new(i as u16 + 1, name.to_uppercase(), *name)).unwrap();
        }
        Arc::new(FlowGraph::build(&registry, records).unwrap())
    }

    fn two_nodes() -> Arc<FlowGraph> {
        // B owes A 10, so A lends B 10
        build(&["a", "b"], &[DebtRecord::new("b", "a", 10.0)])
    }

    fn three_nodes() -> Arc<FlowGraph> {
        build(
            &["a", "b", "c"],
            &[
                DebtRecord::new("b", "a", 4.2),
                DebtRecord::new("c", "a", 3.0),
                DebtRecord::new("c", "b", 1.0),
                DebtRecord::new("a", "c", 0.0),
            ],
        )
    }

    /// Run to the end, returning every frame and every event
    fn run<R: ParticleRng>(engine: &mut FlowEngine<R>, max_ticks: usize) -> (Vec<FrameSnapshot>, Vec<CountryChanged>) {
        let mut frames = Vec::new();
        let mut events = engine.take_events();
        for tick in 1..=max_ticks {
            let frame = engine.advance(tick as f64 * TICK);
            events.extend(engine.take_events());
            let done = frame.is_settled();
            frames.push(frame);
            if done {
                break;
            }
        }
        (frames, events)
    }

    #[test]
    fn test_two_node_scenario() {
        let graph = two_nodes();
        let config = FlowConfig::default().with_unit_size(5.0).with_seed(3);
        let mut engine = FlowEngine::new(Arc::clone(&graph), config).unwrap();

        assert_eq!(engine.phase(), Phase::Active(0));
        assert_eq!(engine.activation_total(), 2);
        assert_eq!(engine.pending_count(), 2);

        let (frames, events) = run(&mut engine, 1000);
        let last = frames.last().unwrap();
        assert!(last.is_settled());
        assert_eq!(last.in_stacks[1], vec![StackInterval::new(0.0, 10.0)]);

        let a = graph.node(0).unwrap().id;
        let b = graph.node(1).unwrap().id;
        assert_eq!(events, vec![CountryChanged(Some(a)), CountryChanged(Some(b)), CountryChanged(None)]);

        // B's fill from A is complete as soon as A drains
        let b_active = frames.iter().find(|f| f.phase == Phase::Active(1)).unwrap();
        assert_eq!(b_active.in_values[1], 10.0);
    }

    #[test]
    fn test_particle_counts_use_ceiling() {
        let graph = three_nodes();
        let engine = FlowEngine::new(Arc::clone(&graph), FlowConfig::default().with_seed(1)).unwrap();
        // a lends 4.2 and 3.0: 5 + 3 particles
        assert_eq!(graph.node(0).unwrap().code, "A");
        assert_eq!(engine.activation_total(), 8);

        assert_eq!(particle_count(4.2, 1.0), 5);
        assert_eq!(particle_count(0.0, 1.0), 0);
        assert_eq!(particle_count(1.0, 3.0), 1);
        assert_eq!(particle_count(10.0, 5.0), 2);
    }

    #[test]
    fn test_every_particle_arrives() {
        let graph = three_nodes();
        let mut engine = FlowEngine::new(graph, FlowConfig::default().with_seed(9)).unwrap();
        let (frames, events) = run(&mut engine, 2000);

        assert!(engine.is_settled());
        assert_eq!(engine.in_flight_count(), 0);
        assert_eq!(events.len(), 4);
        // each node needs its release ticks plus one flight duration, plus one tick per transition
        assert!(frames.len() < 3 * (2000.0 / TICK) as usize + 20);
    }

    #[test]
    fn test_activations_strictly_increase() {
        let graph = three_nodes();
        let mut engine = FlowEngine::new(graph, FlowConfig::default().with_seed(5)).unwrap();
        let (frames, _) = run(&mut engine, 2000);

        let mut seen = vec![0];
        for frame in &frames {
            if let Some(index) = frame.phase.active_index() {
                if *seen.last().unwrap() != index {
                    seen.push(index);
                }
            }
        }
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_release_batches_and_out_bar_drain() {
        let graph = two_nodes();
        let config = FlowConfig::default().with_seed(11).without_jitter();
        let mut engine = FlowEngine::new(graph, config).unwrap();
        assert_eq!(engine.activation_total(), 10);

        let frame = engine.advance(TICK);
        assert_eq!(engine.pending_count(), 8);
        assert_eq!(engine.in_flight_count(), 2);
        assert_eq!(frame.out_values[0], 8.0);
        assert_eq!(frame.particles.len(), 2);
        assert!(frame.particles.iter().all(|p| p.progress == 0.0 && p.lane == 0.0));

        let frame = engine.advance(2.0 * TICK);
        assert_eq!(frame.out_values[0], 6.0);
        assert_eq!(frame.particles[0].progress, TICK / 2000.0);
    }

    #[test]
    fn test_fill_grows_with_arrivals() {
        let graph = two_nodes();
        let config = FlowConfig::default().with_seed(2).without_jitter();
        let mut engine = FlowEngine::new(graph, config).unwrap();

        // first two particles leave at 16 and arrive once 2016 is passed
        let frame = engine.advance(TICK);
        assert_eq!(frame.in_values[1], 0.0);
        let frame = engine.advance(2020.0);
        assert_eq!(engine.arrivals().total(), 2);
        assert_eq!(frame.in_values[1], 2.0);
        assert_eq!(frame.in_stacks[1][0], StackInterval::new(0.0, 2.0));
    }

    #[test]
    fn test_backwards_clock_is_clamped() {
        let graph = two_nodes();
        let mut engine = FlowEngine::new(graph, FlowConfig::default().with_seed(2).without_jitter()).unwrap();
        engine.advance(100.0);
        let frame = engine.advance(50.0);
        assert_eq!(frame.elapsed, 100.0);
    }

    #[test]
    fn test_seed_makes_runs_repeatable() {
        let graph = three_nodes();
        let config = FlowConfig::default().with_seed(77);
        let mut first = FlowEngine::new(Arc::clone(&graph), config.clone()).unwrap();
        let mut second = FlowEngine::new(graph, config).unwrap();
        for tick in 1..200 {
            let elapsed = tick as f64 * TICK;
            assert_eq!(first.advance(elapsed), second.advance(elapsed));
        }
    }

    #[test]
    fn test_reset_restarts_at_first_node() {
        let graph = three_nodes();
        let mut engine = FlowEngine::new(graph, FlowConfig::default().with_seed(4)).unwrap();
        run(&mut engine, 2000);
        assert!(engine.is_settled());

        engine.reset();
        assert_eq!(engine.phase(), Phase::Active(0));
        assert_eq!(engine.activation_total(), 8);
        assert_eq!(engine.take_events().len(), 1);
    }

    #[test]
    fn test_empty_graph_settles_immediately() {
        let graph = build(&[], &[]);
        let mut engine = FlowEngine::new(graph, FlowConfig::default()).unwrap();
        assert!(engine.is_settled());
        assert_eq!(engine.take_events(), vec![CountryChanged(None)]);
        assert!(engine.advance(TICK).out_values.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FlowConfig::default().with_unit_size(-2.0);
        assert!(matches!(
            FlowEngine::new(two_nodes(), config),
            Err(ConfigError::UnitSize(_))
        ));
    }

    /// Deterministic source: midpoint jitters, reversing shuffle
    #[derive(Default)]
    struct FixedRng {
        shuffles: usize,
    }

    impl ParticleRng for FixedRng {
        fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
            (lo + hi) / 2.0
        }

        fn shuffle(&mut self, particles: &mut [Particle]) {
            self.shuffles += 1;
            particles.reverse();
        }
    }

    #[test]
    fn test_tiny_unit_size_hits_particle_cap() {
        let graph = build(&["a", "b"], &[DebtRecord::new("b", "a", 1e6)]);
        let config = FlowConfig::default().with_unit_size(1e-9);
        assert!(matches!(
            FlowEngine::new(Arc::clone(&graph), config),
            Err(ConfigError::TooManyParticles { ref node, limit: DEFAULT_MAX_PARTICLES_PER_NODE, .. }) if node == "A"
        ));

        let config = FlowConfig { max_particles_per_node: 10, ..FlowConfig::default().with_unit_size(1e5) };
        let engine = FlowEngine::new(graph, config).unwrap();
        assert_eq!(engine.activation_total(), 10);
    }

    #[test]
    fn test_injected_rng_controls_pool() {
        let graph = three_nodes();
        let mut engine = FlowEngine::with_rng(graph, FlowConfig::default(), FixedRng::default()).unwrap();

        // reversed pool pops in edge order: the first released go to b
        let frame = engine.advance(TICK);
        assert!(frame.particles.iter().all(|p| p.target == CountryId(2)));
        assert!(frame.particles.iter().all(|p| p.lateral_jitter == 0.0));

        run(&mut engine, 2000);
        assert_eq!(engine.rng.shuffles, 3);
    }
}
