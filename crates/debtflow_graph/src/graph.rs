// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ranked lending graph.

use crate::country::{CountryId, CountryRegistry};
use crate::edge::DebtRecord;
use crate::node::Node;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The lending graph.
///
/// Nodes are stored in rank order (`out_total` descending, registry order on
/// ties). The rank is frozen once the graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Nodes keyed by ID, in rank order
    nodes: IndexMap<CountryId, Node>,
    /// Largest outbound total
    out_total_max: f64,
    /// Largest inbound total
    in_total_max: f64,
}

impl FlowGraph {
    /// Build a graph from raw records and a registry
    pub fn build(registry: &CountryRegistry, records: &[DebtRecord]) -> Result<Self, GraphError> {
        crate::builder::GraphBuilder::new(registry).build(records)
    }

    pub(crate) fn from_ranked(nodes: Vec<Node>) -> Self {
        let out_total_max = nodes.iter().map(|n| n.out_total).fold(0.0, f64::max);
        let in_total_max = nodes.iter().map(|n| n.in_total).fold(0.0, f64::max);
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
            out_total_max,
            in_total_max,
        }
    }

    /// Get all nodes in rank order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs in rank order
    pub fn ids(&self) -> impl Iterator<Item = CountryId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the node at a rank
    pub fn node(&self, rank: usize) -> Option<&Node> {
        self.nodes.get_index(rank).map(|(_, n)| n)
    }

    /// Get a node by ID
    pub fn node_by_id(&self, id: CountryId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Rank of a node
    pub fn rank_of(&self, id: CountryId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges carrying exposure
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.outs.len()).sum()
    }

    /// Largest outbound total over all nodes
    pub fn out_total_max(&self) -> f64 {
        self.out_total_max
    }

    /// Largest inbound total over all nodes
    pub fn in_total_max(&self) -> f64 {
        self.in_total_max
    }
}

/// Error when building a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A record names a country missing from the registry
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// A record carries a negative or non-finite value
    #[error("Invalid value {value} for {source_name} -> {target_name}")]
    InvalidValue {
        /// Debtor name
        source_name: String,
        /// Creditor name
        target_name: String,
        /// Offending value
        value: f64,
    },

    /// A record has the same country on both sides
    #[error("Country cannot lend to itself: {0}")]
    SelfExposure(String),

    /// A country ID or name is registered twice
    #[error("Duplicate country: {0}")]
    DuplicateCountry(String),
}
