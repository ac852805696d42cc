// SPDX-License-Identifier: MIT OR Apache-2.0
//! Country nodes of the lending graph.

use crate::country::{Country, CountryId};
use crate::edge::{Edge, StackInterval};
use serde::{Deserialize, Serialize};

/// A country in the flow graph with its lending and borrowing edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Country ID
    pub id: CountryId,
    /// ISO alpha-3 code
    pub code: String,
    /// Display name
    pub name: String,
    /// Outbound edges, ordered by the target's rank
    pub outs: Vec<Edge>,
    /// Inbound edges, one per other node, ordered by the source's rank
    pub ins: Vec<Edge>,
    /// Sum of outbound values
    pub out_total: f64,
    /// Sum of inbound values
    pub in_total: f64,
    /// Stacked interval of each entry in `ins`
    pub in_stack: Vec<StackInterval>,
}

impl Node {
    /// Create a node with no edges
    pub fn new(country: &Country) -> Self {
        Self {
            id: country.id,
            code: country.code.clone(),
            name: country.name.clone(),
            outs: Vec::new(),
            ins: Vec::new(),
            out_total: 0.0,
            in_total: 0.0,
            in_stack: Vec::new(),
        }
    }

    /// Inbound edge from a lender, with its stacked interval
    pub fn inbound_from(&self, source: CountryId) -> Option<(&Edge, &StackInterval)> {
        self.ins
            .iter()
            .zip(&self.in_stack)
            .find(|(edge, _)| edge.source == source)
    }

    /// Value lent to this node by `source` (0 when there is no exposure)
    pub fn inbound_value_from(&self, source: CountryId) -> f64 {
        self.inbound_from(source).map_or(0.0, |(edge, _)| edge.value)
    }
}
