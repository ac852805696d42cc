// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewport geometry.
//!
//! From top to bottom: lender bars, lender labels, the flow band, borrower
//! labels, borrower bars. Lender bars grow upward from the label row and
//! borrower bars grow downward from theirs. Every country gets one
//! vertical lane of a band scale.

use debtflow_graph::{FlowGraph, StackInterval};
use debtflow_sequencer::ParticlePosition;
use egui::{pos2, Pos2, Rect};

/// Space around the chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    /// Top
    pub top: f32,
    /// Right
    pub right: f32,
    /// Bottom
    pub bottom: f32,
    /// Left, wide enough for the row captions
    pub left: f32,
}

/// Chart margins
pub const MARGIN: Margin = Margin {
    top: 16.0,
    right: 8.0,
    bottom: 16.0,
    left: 80.0,
};

/// Height of a label row
pub const LABEL_HEIGHT: f32 = 20.0;

/// Combined height of lender and borrower bars
pub const BARS_HEIGHT: f32 = 400.0;

/// Height of the flow band
pub const FLOW_HEIGHT: f32 = 200.0;

/// Particle radius
pub const PARTICLE_RADIUS: f32 = 2.5;

/// Gap between lanes as a fraction of the step
const PADDING_INNER: f32 = 0.1;

/// Rounded band scale with inner padding, aligned to the start of its range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f32,
    step: f32,
    bandwidth: f32,
}

impl BandScale {
    /// Spread `count` lanes over `[start, stop]`
    pub fn new(count: usize, start: f32, stop: f32) -> Self {
        let n = count as f32;
        let step = ((stop - start) / (n - PADDING_INNER).max(1.0)).floor().max(0.0);
        Self {
            start: start.round(),
            step,
            bandwidth: (step * (1.0 - PADDING_INNER)).round(),
        }
    }

    /// Left edge of a (possibly fractional) lane
    pub fn position(&self, lane: f64) -> f32 {
        self.start + self.step * lane as f32
    }

    /// Lane width
    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }
}

/// Linear map from `[0, domain_max]` onto `[range_start, range_end]`
#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearScale {
    domain_max: f64,
    range_start: f32,
    range_end: f32,
}

impl LinearScale {
    fn map(&self, value: f64) -> f32 {
        if self.domain_max <= 0.0 {
            return self.range_start;
        }
        let t = (value / self.domain_max) as f32;
        self.range_start + (self.range_end - self.range_start) * t
    }
}

/// Pixel layout for one graph and viewport width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Viewport width
    pub width: f32,
    /// Viewport height, derived from the bar split
    pub height: f32,
    /// Height of the lender bar area
    pub out_height: f32,
    /// Height of the borrower bar area
    pub in_height: f32,
    /// Lane scale
    pub band: BandScale,
    y_out: LinearScale,
    y_in: LinearScale,
}

impl Layout {
    /// Lay out `graph` in a viewport `width` points wide
    pub fn new(graph: &FlowGraph, width: f32) -> Self {
        let out_max = graph.out_total_max();
        let in_max = graph.in_total_max();
        let out_height = if out_max + in_max > 0.0 {
            (f64::from(BARS_HEIGHT) * out_max / (out_max + in_max)).round() as f32
        } else {
            BARS_HEIGHT / 2.0
        };
        let in_height = BARS_HEIGHT - out_height;
        let height = MARGIN.top
            + out_height
            + LABEL_HEIGHT
            + FLOW_HEIGHT
            + LABEL_HEIGHT
            + in_height
            + MARGIN.bottom;

        let band = BandScale::new(graph.node_count(), MARGIN.left, width - MARGIN.right);

        Self {
            width,
            height,
            out_height,
            in_height,
            band,
            y_out: LinearScale {
                domain_max: out_max,
                range_start: MARGIN.top + out_height,
                range_end: MARGIN.top,
            },
            y_in: LinearScale {
                domain_max: in_max,
                range_start: height - MARGIN.bottom - in_height,
                range_end: height - MARGIN.bottom,
            },
        }
    }

    /// Top of the flow band (progress 0)
    pub fn flow_top(&self) -> f32 {
        MARGIN.top + self.out_height + LABEL_HEIGHT
    }

    /// Bottom of the flow band (progress 1)
    pub fn flow_bottom(&self) -> f32 {
        self.flow_top() + FLOW_HEIGHT
    }

    /// Lender label row of a lane
    pub fn out_label_rect(&self, rank: usize) -> Rect {
        let x = self.band.position(rank as f64);
        Rect::from_min_max(
            pos2(x, self.flow_top() - LABEL_HEIGHT),
            pos2(x + self.band.bandwidth(), self.flow_top()),
        )
    }

    /// Borrower label row of a lane
    pub fn in_label_rect(&self, rank: usize) -> Rect {
        let x = self.band.position(rank as f64);
        Rect::from_min_max(
            pos2(x, self.flow_bottom()),
            pos2(x + self.band.bandwidth(), self.flow_bottom() + LABEL_HEIGHT),
        )
    }

    /// Lender bar of height `value`, standing on the label row
    pub fn out_bar_rect(&self, rank: usize, value: f64) -> Rect {
        let x = self.band.position(rank as f64);
        Rect::from_min_max(
            pos2(x, self.y_out.map(value)),
            pos2(x + self.band.bandwidth(), self.y_out.map(0.0)),
        )
    }

    /// One segment of a borrower's stack, hanging from the label row
    pub fn in_segment_rect(&self, rank: usize, stack: StackInterval) -> Rect {
        let x = self.band.position(rank as f64);
        Rect::from_min_max(
            pos2(x, self.y_in.map(stack.start)),
            pos2(x + self.band.bandwidth(), self.y_in.map(stack.end)),
        )
    }

    /// Pixel centre of a particle
    pub fn particle_center(&self, particle: &ParticlePosition) -> Pos2 {
        let bandwidth = self.band.bandwidth();
        let x = self.band.position(particle.lane)
            + particle.lateral_jitter as f32 * (bandwidth - PARTICLE_RADIUS * 2.0)
            + bandwidth / 2.0;
        let y = self.flow_top() + FLOW_HEIGHT * particle.progress as f32;
        pos2(x, y)
    }

    /// Centre line of the lane path from one lane to another.
    ///
    /// The first half of the points sit on the lender lane and the second
    /// half on the borrower lane, evenly spaced down the flow band.
    pub fn lane_path(&self, source_rank: usize, target_rank: usize) -> Vec<Pos2> {
        const STEPS: usize = 6;
        let half = self.band.bandwidth() / 2.0;
        (0..STEPS)
            .map(|i| {
                let rank = if i < STEPS / 2 { source_rank } else { target_rank };
                let y = self.flow_top() + FLOW_HEIGHT * i as f32 / (STEPS - 1) as f32;
                pos2(self.band.position(rank as f64) + half, y)
            })
            .collect()
    }
}
