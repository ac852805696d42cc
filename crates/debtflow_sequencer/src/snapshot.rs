// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only per-frame output of the flow engine.

use crate::engine::ArrivalCounts;
use crate::particle::ParticlePosition;
use debtflow_graph::{FlowGraph, StackInterval};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// The node at this rank is releasing particles
    Active(usize),
    /// Every node has been animated
    Settled,
}

impl Phase {
    /// Rank of the active node, if any
    pub fn active_index(&self) -> Option<usize> {
        match self {
            Phase::Active(index) => Some(*index),
            Phase::Settled => None,
        }
    }

    /// Check if the run is over
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Settled)
    }
}

/// Everything a renderer needs for one frame.
///
/// All per-node vectors are indexed by rank. `in_stacks[rank]` is aligned
/// with that node's densified `ins`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Frame time
    pub elapsed: f64,
    /// Engine phase after this frame
    pub phase: Phase,
    /// Outbound bar value per lender
    pub out_values: Vec<f64>,
    /// Stacked fill per borrower and lender
    pub in_stacks: Vec<Vec<StackInterval>>,
    /// Filled total per borrower
    pub in_values: Vec<f64>,
    /// In-flight particles
    pub particles: Vec<ParticlePosition>,
    /// Particles still waiting in the active node's pool
    pub pending: usize,
}

impl FrameSnapshot {
    pub(crate) fn capture(
        graph: &FlowGraph,
        phase: Phase,
        pending: usize,
        arrivals: &ArrivalCounts,
        unit_size: f64,
        elapsed: f64,
        particles: Vec<ParticlePosition>,
    ) -> Self {
        let count = graph.node_count();
        let mut out_values = Vec::with_capacity(count);
        let mut in_stacks = Vec::with_capacity(count);
        let mut in_values = Vec::with_capacity(count);

        for (rank, node) in graph.nodes().enumerate() {
            let Phase::Active(active) = phase else {
                out_values.push(node.out_total);
                in_stacks.push(node.in_stack.clone());
                in_values.push(node.in_total);
                continue;
            };

            out_values.push(match rank.cmp(&active) {
                Ordering::Less => 0.0,
                Ordering::Equal => (pending as f64 * unit_size).min(node.out_total),
                Ordering::Greater => node.out_total,
            });

            // `ins` skips the node itself, so entry i belongs to rank i or i + 1
            let mut total = 0.0;
            let stack = node
                .ins
                .iter()
                .enumerate()
                .map(|(i, edge)| {
                    let source_rank = if i < rank { i } else { i + 1 };
                    let filled = match source_rank.cmp(&active) {
                        Ordering::Less => edge.value,
                        Ordering::Equal => {
                            let arrived = arrivals.get(edge.target, edge.source) as f64;
                            (arrived * unit_size).min(edge.value)
                        }
                        Ordering::Greater => 0.0,
                    };
                    let start = total;
                    total += filled;
                    StackInterval::new(start, total)
                })
                .collect();
            in_stacks.push(stack);
            in_values.push(total);
        }

        Self {
            elapsed,
            phase,
            out_values,
            in_stacks,
            in_values,
            particles,
            pending,
        }
    }

    /// Check if this frame shows the settled state
    pub fn is_settled(&self) -> bool {
        self.phase.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debtflow_graph::{Country, CountryId, CountryRegistry, DebtRecord};

    fn graph() -> FlowGraph {
        let mut registry = CountryRegistry::new();
        registry.register(Country::new(1, "AAA", "A")).unwrap();
        registry.register(Country::new(2, "BBB", "B")).unwrap();
        registry.register(Country::new(3, "CCC", "C")).unwrap();
        // A lends B 1 and C 6; B lends C 2
        let records = vec![
            DebtRecord::new("B", "A", 1.0),
            DebtRecord::new("C", "A", 6.0),
            DebtRecord::new("C", "B", 2.0),
        ];
        FlowGraph::build(&registry, &records).unwrap()
    }

    #[test]
    fn test_partial_fill_is_clamped() {
        let graph = graph();
        let mut arrivals = ArrivalCounts::default();
        arrivals.record(CountryId(2), CountryId(1));
        arrivals.record(CountryId(3), CountryId(1));

        let snapshot = FrameSnapshot::capture(&graph, Phase::Active(0), 0, &arrivals, 3.0, 0.0, Vec::new());
        // one particle of size 3 for a value of 1 fills exactly 1
        assert_eq!(snapshot.in_values[1], 1.0);
        assert_eq!(snapshot.in_stacks[1][0], StackInterval::new(0.0, 1.0));
        // one particle of size 3 for a value of 6 fills 3
        assert_eq!(snapshot.in_values[2], 3.0);
        assert_eq!(snapshot.out_values, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_later_lenders_are_empty_earlier_are_full() {
        let graph = graph();
        let arrivals = ArrivalCounts::default();
        let snapshot = FrameSnapshot::capture(&graph, Phase::Active(1), 1, &arrivals, 1.0, 0.0, Vec::new());

        // C's stack: A (rank 0) full, B (rank 1) active with nothing arrived
        assert_eq!(snapshot.in_stacks[2], vec![StackInterval::new(0.0, 6.0), StackInterval::new(6.0, 6.0)]);
        assert_eq!(snapshot.in_values[2], 6.0);
        // A finished, B has one particle left of 2, C still untouched
        assert_eq!(snapshot.out_values, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_settled_uses_static_totals() {
        let graph = graph();
        let snapshot = FrameSnapshot::capture(&graph, Phase::Settled, 0, &ArrivalCounts::default(), 1.0, 0.0, Vec::new());
        assert!(snapshot.is_settled());
        assert_eq!(snapshot.out_values, vec![7.0, 2.0, 0.0]);
        assert_eq!(snapshot.in_values, vec![0.0, 1.0, 8.0]);
        assert_eq!(snapshot.in_stacks[2].last().unwrap().end, 8.0);
    }
}
