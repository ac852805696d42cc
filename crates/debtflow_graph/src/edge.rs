// SPDX-License-Identifier: MIT OR Apache-2.0
//! Debt records and lender-to-borrower edges.

use crate::country::CountryId;
use serde::{Deserialize, Serialize};

/// A raw bilateral debt record as it appears in the source data.
///
/// `value` is the amount `source` owes `target`, so the record reads
/// borrower first. Ingestion reverses it into a lender-to-borrower [`Edge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRecord {
    /// Debtor country name
    pub source: String,
    /// Creditor country name
    pub target: String,
    /// Amount owed, in billions
    pub value: f64,
}

impl DebtRecord {
    /// Create a new record
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// A directed lender-to-borrower exposure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Lender
    pub source: CountryId,
    /// Borrower
    pub target: CountryId,
    /// Exposure, never negative
    pub value: f64,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: CountryId, target: CountryId, value: f64) -> Self {
        Self {
            source,
            target,
            value,
        }
    }

    /// Placeholder edge for a pair with no exposure
    pub fn zero(source: CountryId, target: CountryId) -> Self {
        Self::new(source, target, 0.0)
    }
}

/// Half-open vertical interval of a borrower's stacked bar
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StackInterval {
    /// Running total before this segment
    pub start: f64,
    /// Running total after this segment
    pub end: f64,
}

impl StackInterval {
    /// Create a new interval
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Segment height
    pub fn height(&self) -> f64 {
        self.end - self.start
    }
}
