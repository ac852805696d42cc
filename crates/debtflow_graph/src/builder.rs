// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph construction from raw debt records.
//!
//! Building runs in fixed steps:
//! 1. resolve record names against the registry and reverse each record
//!    into a lender-to-borrower edge
//! 2. group edges by lender and by borrower
//! 3. create one node per registry entry
//! 4. rank nodes by outbound total
//! 5. order every node's edges by the peer's rank
//! 6. densify inbound edges and compute the stacked intervals

use crate::country::{CountryId, CountryRegistry};
use crate::edge::{DebtRecord, Edge, StackInterval};
use crate::graph::{FlowGraph, GraphError};
use crate::node::Node;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Builds a [`FlowGraph`] against a fixed registry
pub struct GraphBuilder<'a> {
    registry: &'a CountryRegistry,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder for a registry
    pub fn new(registry: &'a CountryRegistry) -> Self {
        Self { registry }
    }

    /// Resolve records into lender-to-borrower edges.
    ///
    /// Records for the same pair are merged by summing their values.
    pub fn resolve(&self, records: &[DebtRecord]) -> Result<Vec<Edge>, GraphError> {
        let mut pairs: IndexMap<(CountryId, CountryId), f64> = IndexMap::new();

        for record in records {
            let borrower = self
                .registry
                .by_name(&record.source)
                .ok_or_else(|| GraphError::UnknownCountry(record.source.clone()))?;
            let lender = self
                .registry
                .by_name(&record.target)
                .ok_or_else(|| GraphError::UnknownCountry(record.target.clone()))?;

            if !record.value.is_finite() || record.value < 0.0 {
                return Err(GraphError::InvalidValue {
                    source_name: record.source.clone(),
                    target_name: record.target.clone(),
                    value: record.value,
                });
            }
            if lender.id == borrower.id {
                return Err(GraphError::SelfExposure(lender.name.clone()));
            }

            match pairs.entry((lender.id, borrower.id)) {
                Entry::Occupied(mut entry) => {
                    tracing::debug!("Merging duplicate record {} -> {}", lender.code, borrower.code);
                    *entry.get_mut() += record.value;
                }
                Entry::Vacant(entry) => {
                    entry.insert(record.value);
                }
            }
        }

        Ok(pairs
            .into_iter()
            .map(|((source, target), value)| Edge::new(source, target, value))
            .collect())
    }

    /// Build the graph
    pub fn build(&self, records: &[DebtRecord]) -> Result<FlowGraph, GraphError> {
        let edges = self.resolve(records)?;

        let mut outs: HashMap<CountryId, Vec<Edge>> = HashMap::new();
        let mut ins: HashMap<CountryId, Vec<Edge>> = HashMap::new();
        for edge in &edges {
            outs.entry(edge.source).or_default().push(*edge);
            ins.entry(edge.target).or_default().push(*edge);
        }

        let mut nodes: Vec<Node> = self
            .registry
            .countries()
            .map(|country| {
                let mut node = Node::new(country);
                node.outs = outs.remove(&country.id).unwrap_or_default();
                node.ins = ins.remove(&country.id).unwrap_or_default();
                node.out_total = fsum(node.outs.iter().map(|e| e.value));
                node
            })
            .collect();

        // Stable sort keeps registry order on ties
        nodes.sort_by(|a, b| b.out_total.total_cmp(&a.out_total));

        let rank: HashMap<CountryId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let ordered_ids: Vec<CountryId> = nodes.iter().map(|n| n.id).collect();

        for node in &mut nodes {
            node.outs.sort_by_key(|e| rank[&e.target]);
            node.ins.sort_by_key(|e| rank[&e.source]);
            densify(node, &ordered_ids);
        }

        let graph = FlowGraph::from_ranked(nodes);
        tracing::info!(
            "Built lending graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Give `node` one inbound entry per other node and stack them left to right.
///
/// The stack is a compensated prefix sum and `in_total` is its final end.
fn densify(node: &mut Node, ordered_ids: &[CountryId]) {
    let dense: Vec<Edge> = ordered_ids
        .iter()
        .filter(|&&id| id != node.id)
        .map(|&id| {
            node.ins
                .iter()
                .find(|e| e.source == id)
                .copied()
                .unwrap_or_else(|| Edge::zero(id, node.id))
        })
        .collect();

    let mut sum = NeumaierSum::default();
    let mut end = 0.0;
    node.in_stack = dense
        .iter()
        .map(|e| {
            let start = end;
            sum.add(e.value);
            end = sum.value().max(start);
            StackInterval::new(start, end)
        })
        .collect();
    node.in_total = end;
    node.ins = dense;
}

/// Running compensated (Neumaier) sum
#[derive(Debug, Default, Clone, Copy)]
struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    fn add(&mut self, v: f64) {
        let t = self.sum + v;
        if self.sum.abs() >= v.abs() {
            self.compensation += (self.sum - t) + v;
        } else {
            self.compensation += (v - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Compensated summation
fn fsum(values: impl Iterator<Item = f64>) -> f64 {
    values
        .fold(NeumaierSum::default(), |mut sum, v| {
            sum.add(v);
            sum
        })
        .value()
}
