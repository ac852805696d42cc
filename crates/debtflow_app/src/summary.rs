// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON summary of a finished run.

use crate::error::AppError;
use crate::format::format_value;
use crate::globe::Globe;
use crate::layout::Layout;
use crate::palette::Palette;
use debtflow_graph::FlowGraph;
use debtflow_sequencer::BarView;
use egui::Color32;
use serde::Serialize;
use std::path::Path;

/// One country as shown by the settled view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    /// Position in lending order
    pub rank: usize,
    /// ISO alpha-3 code
    pub code: String,
    /// Display name
    pub name: String,
    /// Total lent
    pub out_total: f64,
    /// Total borrowed
    pub in_total: f64,
    /// Lender label text
    pub out_label: String,
    /// Lender label colour as `#rrggbb`
    pub out_label_color: String,
    /// Borrower label text
    pub in_label: String,
    /// Lender label is muted
    pub lender_muted: bool,
    /// Borrower label is muted
    pub borrower_muted: bool,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Frames played
    pub frames: u64,
    /// Engine seed, if fixed
    pub seed: Option<u64>,
    /// Highlighted country code
    pub highlighted: Option<String>,
    /// Globe title
    pub globe_title: String,
    /// Globe rotation at the end of the run
    pub globe_rotation: [f64; 2],
    /// Viewport size
    pub viewport: [f32; 2],
    /// Countries in rank order
    pub countries: Vec<CountrySummary>,
}

impl RunSummary {
    /// Summarize a settled view
    pub fn new(
        graph: &FlowGraph,
        view: &BarView,
        globe: &Globe,
        layout: &Layout,
        palette: &Palette,
        frames: u64,
        seed: Option<u64>,
    ) -> Self {
        let countries = graph
            .nodes()
            .enumerate()
            .map(|(rank, node)| CountrySummary {
                rank,
                code: node.code.clone(),
                name: node.name.clone(),
                out_total: node.out_total,
                in_total: node.in_total,
                out_label: format_value(view.out_bars.get(rank).map_or(0.0, |b| b.value)),
                out_label_color: hex(palette.tone(view.out_label_tone(node.id))),
                in_label: format_value(view.in_bars.get(rank).map_or(0.0, |b| b.label_value)),
                lender_muted: view.lender_muted.get(rank).copied().unwrap_or(false),
                borrower_muted: view.borrower_muted.get(rank).copied().unwrap_or(false),
            })
            .collect();

        Self {
            frames,
            seed,
            highlighted: view
                .highlighted
                .and_then(|id| graph.node_by_id(id))
                .map(|node| node.code.clone()),
            globe_title: globe.title().to_string(),
            globe_rotation: globe.rotation(),
            viewport: [layout.width, layout.height],
            countries,
        }
    }

    /// Write the summary as pretty JSON
    pub fn write(&self, path: &Path) -> Result<(), AppError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        tracing::info!("Wrote summary to {}", path.display());
        Ok(())
    }
}

fn hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
