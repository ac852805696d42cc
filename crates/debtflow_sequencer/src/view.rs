// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bar and label values derived from a frame and the current highlight.
//!
//! While the engine animates, bars follow the frame. Once settled, hovering
//! a lender reshapes the view around that lender: only its outbound bar
//! stays lit, every borrower shows just what it owes that lender, and
//! unrelated labels are muted.

use crate::snapshot::FrameSnapshot;
use debtflow_graph::{CountryId, FlowGraph, StackInterval};
use serde::{Deserialize, Serialize};

/// Colour role of a bar or label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    /// The colour of this country
    Country(CountryId),
    /// Foreground text colour
    Neutral,
}

/// Outbound (lender) bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutBar {
    /// Lender
    pub id: CountryId,
    /// Filled value
    pub value: f64,
    /// Fill colour
    pub tone: Tone,
}

/// One lender's segment of a borrower's stacked bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InSegment {
    /// Lender
    pub source: CountryId,
    /// Vertical extent
    pub stack: StackInterval,
}

/// Inbound (borrower) stacked bar and its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InBar {
    /// Borrower
    pub id: CountryId,
    /// Stacked segments, coloured by lender
    pub segments: Vec<InSegment>,
    /// Value shown by the label
    pub label_value: f64,
    /// Label colour
    pub label_tone: Tone,
    /// Background bar height (0 while animating)
    pub background: f64,
}

/// Everything the bar renderer draws for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarView {
    /// Highlight applied to this view
    pub highlighted: Option<CountryId>,
    /// Lender bars in rank order
    pub out_bars: Vec<OutBar>,
    /// Borrower bars in rank order
    pub in_bars: Vec<InBar>,
    /// Muted lender labels in rank order
    pub lender_muted: Vec<bool>,
    /// Muted borrower labels in rank order
    pub borrower_muted: Vec<bool>,
}

impl BarView {
    /// Derive the view.
    ///
    /// `highlight` only applies to a settled frame; during the animation the
    /// highlight channel tracks the active node and does not reshape bars.
    pub fn derive(graph: &FlowGraph, frame: &FrameSnapshot, highlight: Option<CountryId>) -> Self {
        let highlighted = if frame.is_settled() { highlight } else { None };
        let count = graph.node_count();

        let mut out_bars = Vec::with_capacity(count);
        let mut in_bars = Vec::with_capacity(count);
        let mut lender_muted = Vec::with_capacity(count);
        let mut borrower_muted = Vec::with_capacity(count);

        for (rank, node) in graph.nodes().enumerate() {
            let out_bar = match highlighted {
                Some(h) if h != node.id => OutBar {
                    id: node.id,
                    value: 0.0,
                    tone: Tone::Neutral,
                },
                _ => OutBar {
                    id: node.id,
                    value: frame.out_values.get(rank).copied().unwrap_or(0.0),
                    tone: Tone::Country(node.id),
                },
            };
            out_bars.push(out_bar);

            let background = if frame.is_settled() { node.in_total } else { 0.0 };
            let in_bar = match highlighted {
                None => InBar {
                    id: node.id,
                    segments: node
                        .ins
                        .iter()
                        .zip(frame.in_stacks.get(rank).into_iter().flatten())
                        .map(|(edge, stack)| InSegment {
                            source: edge.source,
                            stack: *stack,
                        })
                        .collect(),
                    label_value: frame.in_values.get(rank).copied().unwrap_or(0.0),
                    label_tone: Tone::Neutral,
                    background,
                },
                Some(h) => {
                    let value = node.inbound_value_from(h);
                    InBar {
                        id: node.id,
                        segments: node
                            .ins
                            .iter()
                            .filter(|e| e.source == h)
                            .map(|e| InSegment {
                                source: h,
                                stack: StackInterval::new(0.0, e.value),
                            })
                            .collect(),
                        label_value: value,
                        label_tone: Tone::Country(h),
                        background,
                    }
                }
            };
            in_bars.push(in_bar);

            lender_muted.push(highlighted.is_some_and(|h| h != node.id));
            borrower_muted.push(highlighted.is_some_and(|h| node.inbound_value_from(h) == 0.0));
        }

        Self {
            highlighted,
            out_bars,
            in_bars,
            lender_muted,
            borrower_muted,
        }
    }

    /// Tone of a lender's value label
    pub fn out_label_tone(&self, id: CountryId) -> Tone {
        if self.highlighted == Some(id) {
            Tone::Country(id)
        } else {
            Tone::Neutral
        }
    }
}
