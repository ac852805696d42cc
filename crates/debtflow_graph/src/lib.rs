// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lending graph model for debtflow.
//!
//! This crate turns raw bilateral debt records into the graph the flow
//! animation runs on:
//! - Country registry (numeric ID, ISO code, display name)
//! - Lender-to-borrower edges
//! - Nodes ranked by outbound total
//! - Densified inbound edges with stacked intervals
//!
//! ## Architecture
//!
//! The graph is built once per data load and never mutated afterwards.
//! Node rank is frozen at build time; everything downstream (edge order,
//! animation order, x-axis order) reads it from [`FlowGraph`].

pub mod country;
pub mod edge;
pub mod node;
pub mod graph;
pub mod builder;

pub use country::{Country, CountryId, CountryRegistry};
pub use edge::{DebtRecord, Edge, StackInterval};
pub use node::Node;
pub use graph::{FlowGraph, GraphError};
pub use builder::GraphBuilder;
