// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame to `egui` shapes.
//!
//! The renderer only produces shapes; any egui painter can draw them.
//! Label text needs the host's fonts and is left to the host, which can
//! read values and muting from the [`BarView`].

use crate::layout::{Layout, PARTICLE_RADIUS};
use crate::palette::{Palette, BACKGROUND, NEUTRAL};
use debtflow_graph::{CountryId, FlowGraph, StackInterval};
use debtflow_sequencer::{BarView, FrameSnapshot};
use egui::{Color32, Shape, Stroke};

/// Opacity of particles
const PARTICLE_ALPHA: f32 = 0.8;

/// Opacity of lane paths
const PATH_ALPHA: f32 = 0.15;

/// Opacity of label boxes, normal and muted
const LABEL_ALPHA: f32 = 0.3;
const LABEL_MUTED_ALPHA: f32 = 0.08;

/// Draws frames of one graph into a fixed layout
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    layout: Layout,
    palette: Palette,
    lane_paths: Vec<Shape>,
    out_backgrounds: Vec<Shape>,
}

impl FrameRenderer {
    /// Create a renderer; static shapes are built once here
    pub fn new(graph: &FlowGraph, layout: Layout, palette: Palette) -> Self {
        let count = graph.node_count();
        let path_color = BACKGROUND.gamma_multiply(PATH_ALPHA);

        let mut lane_paths = Vec::with_capacity(count * count);
        for source in 0..count {
            for target in 0..count {
                lane_paths.push(Shape::line(
                    layout.lane_path(source, target),
                    Stroke::new(layout.band.bandwidth(), path_color),
                ));
            }
        }

        let out_backgrounds = graph
            .nodes()
            .enumerate()
            .map(|(rank, node)| Shape::rect_filled(layout.out_bar_rect(rank, node.out_total), 0.0, BACKGROUND))
            .collect();

        Self {
            layout,
            palette,
            lane_paths,
            out_backgrounds,
        }
    }

    /// Shapes for one frame, back to front
    pub fn render(&self, frame: &FrameSnapshot, view: &BarView) -> Vec<Shape> {
        let mut shapes = Vec::with_capacity(
            self.lane_paths.len() + self.out_backgrounds.len() * 5 + frame.particles.len(),
        );
        shapes.extend(self.lane_paths.iter().cloned());
        shapes.extend(self.out_backgrounds.iter().cloned());

        for (rank, muted) in view.lender_muted.iter().enumerate() {
            shapes.push(Shape::rect_filled(self.layout.out_label_rect(rank), 0.0, label_fill(*muted)));
        }
        for (rank, muted) in view.borrower_muted.iter().enumerate() {
            shapes.push(Shape::rect_filled(self.layout.in_label_rect(rank), 0.0, label_fill(*muted)));
        }

        for (rank, bar) in view.out_bars.iter().enumerate() {
            if bar.value > 0.0 {
                shapes.push(Shape::rect_filled(
                    self.layout.out_bar_rect(rank, bar.value),
                    0.0,
                    self.palette.tone(bar.tone),
                ));
            }
        }

        for (rank, bar) in view.in_bars.iter().enumerate() {
            if bar.background > 0.0 {
                let stack = StackInterval::new(0.0, bar.background);
                shapes.push(Shape::rect_filled(self.layout.in_segment_rect(rank, stack), 0.0, BACKGROUND));
            }
            for segment in &bar.segments {
                if segment.stack.height() > 0.0 {
                    shapes.push(Shape::rect_filled(
                        self.layout.in_segment_rect(rank, segment.stack),
                        0.0,
                        self.palette.color(segment.source),
                    ));
                }
            }
        }

        for particle in &frame.particles {
            shapes.push(Shape::circle_filled(
                self.layout.particle_center(particle),
                PARTICLE_RADIUS,
                self.particle_color(particle.source),
            ));
        }

        shapes
    }

    fn particle_color(&self, source: CountryId) -> Color32 {
        self.palette.color(source).gamma_multiply(PARTICLE_ALPHA)
    }

    /// The layout in use
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The colours in use
    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

fn label_fill(muted: bool) -> Color32 {
    NEUTRAL.gamma_multiply(if muted { LABEL_MUTED_ALPHA } else { LABEL_ALPHA })
}
