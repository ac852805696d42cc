// SPDX-License-Identifier: MIT OR Apache-2.0
//! Country colours.
//!
//! Colours come from a warm cubehelix ramp (purple through red to yellow
//! green), sampled evenly over the ranked countries so the biggest lender
//! gets the first colour.

use debtflow_graph::{CountryId, FlowGraph};
use debtflow_sequencer::{Interpolation, Tone};
use egui::Color32;
use indexmap::IndexMap;

/// Colour for neutral (unhighlighted) marks
pub const NEUTRAL: Color32 = Color32::from_gray(200);

/// Colour of background bars and lane paths
pub const BACKGROUND: Color32 = Color32::from_gray(60);

/// Ordinal colour scale keyed by country
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: IndexMap<CountryId, Color32>,
}

impl Palette {
    /// Assign ramp colours in rank order
    pub fn for_graph(graph: &FlowGraph) -> Self {
        let count = graph.node_count();
        let colors = graph
            .ids()
            .enumerate()
            .map(|(i, id)| {
                let t = if count > 1 { i as f64 / (count - 1) as f64 } else { 0.0 };
                (id, warm(t))
            })
            .collect();
        Self { colors }
    }

    /// Colour of a country; neutral for unknown ones
    pub fn color(&self, id: CountryId) -> Color32 {
        self.colors.get(&id).copied().unwrap_or(NEUTRAL)
    }

    /// Resolve a colour role
    pub fn tone(&self, tone: Tone) -> Color32 {
        match tone {
            Tone::Country(id) => self.color(id),
            Tone::Neutral => NEUTRAL,
        }
    }
}

/// Sample the warm ramp at `t` in `[0, 1]`
pub fn warm(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    cubehelix(
        Interpolation::lerp(-100.0, 80.0, t),
        Interpolation::lerp(0.75, 1.5, t),
        Interpolation::lerp(0.35, 0.8, t),
    )
}

/// Cubehelix (hue in degrees, saturation, lightness) to sRGB
fn cubehelix(hue: f64, saturation: f64, lightness: f64) -> Color32 {
    let h = (hue + 120.0).to_radians();
    let a = saturation * lightness * (1.0 - lightness);
    let (sin, cos) = h.sin_cos();

    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(
        channel(lightness + a * (-0.14861 * cos + 1.78277 * sin)),
        channel(lightness + a * (-0.29227 * cos - 0.90649 * sin)),
        channel(lightness + a * (1.97294 * cos)),
    )
}
