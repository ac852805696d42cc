// SPDX-License-Identifier: MIT OR Apache-2.0
//! `debtflow` - animated view of international bank lending
//!
//! Runs the lending flow animation headless:
//! - Loads settings (RON) and the debt data (CSV)
//! - Builds the ranked lending graph
//! - Plays the particle animation on a fixed-step clock
//! - Keeps the globe and the egui shapes in step with every frame
//!
//! ## Architecture
//!
//! The graph model lives in `debtflow_graph` and the animation engine,
//! highlight dispatch and playback in `debtflow_sequencer`. This binary
//! wires them to the viewport layout, colours and globe, and optionally
//! writes a JSON summary of the settled view.

mod data;
mod error;
mod format;
mod globe;
mod layout;
mod palette;
mod render;
mod settings;
mod summary;

use clap::Parser;
use debtflow_graph::FlowGraph;
use debtflow_sequencer::{FixedStepClock, FlowPlayer, PlaybackError};
use error::AppError;
use globe::{Globe, ROTATION_DURATION_MS};
use layout::Layout;
use palette::Palette;
use render::FrameRenderer;
use settings::{AppSettings, SETTINGS_FILE_NAME};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use summary::RunSummary;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Animate bilateral bank lending between countries
#[derive(Parser)]
#[command(name = "debtflow")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file (RON); defaults are used if it does not exist
    #[arg(short, long, default_value = SETTINGS_FILE_NAME)]
    settings: PathBuf,

    /// Debt data CSV, overriding the settings
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Random seed for particle jitter and order
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON summary of the settled view here
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Hover this lender (alpha-3 code) once the animation has settled
    #[arg(long)]
    hover: Option<String>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    write_settings: bool,
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("debtflow=debug".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting debtflow v{}", env!("CARGO_PKG_VERSION"));

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = AppSettings::load_or_default(&cli.settings)?;
    if let Some(data) = cli.data {
        settings.data_path = data;
    }
    if let Some(seed) = cli.seed {
        settings.flow.seed = Some(seed);
    }
    if let Some(summary) = cli.summary {
        settings.summary_path = Some(summary);
    }

    if cli.write_settings {
        settings.save(&cli.settings)?;
        tracing::info!("Wrote settings to {}", cli.settings.display());
        return Ok(());
    }

    let registry = settings.registry()?;
    let hover = cli
        .hover
        .map(|code| {
            registry
                .countries()
                .find(|c| c.code.eq_ignore_ascii_case(&code))
                .map(|c| c.id)
                .ok_or(AppError::UnknownCode(code))
        })
        .transpose()?;

    let records = data::load_records(&settings.data_path)?;
    let graph = Arc::new(FlowGraph::build(&registry, &records)?);

    let layout = Layout::new(&graph, settings.viewport_width);
    let renderer = FrameRenderer::new(&graph, layout, Palette::for_graph(&graph));
    let globe = Rc::new(RefCell::new(Globe::new(&registry, settings.centroids())));

    let clock = FixedStepClock::new(settings.tick_interval_ms);
    let mut player = FlowPlayer::new(Arc::clone(&graph), settings.flow.clone(), clock)?;
    Globe::attach(&globe, &mut player);

    player.play();
    let mut now = 0.0;
    let mut peak_shapes = 0;
    while let Some(elapsed) = player.tick().map(|frame| frame.elapsed) {
        now = elapsed;
        globe.borrow_mut().update(now);

        if let (Some(frame), Some(view)) = (player.frame(), player.view()) {
            peak_shapes = peak_shapes.max(renderer.render(frame, &view).len());
        }

        if player.frame_count() as usize >= settings.max_ticks && !player.engine().is_settled() {
            player.stop();
            return Err(PlaybackError::TickLimit(settings.max_ticks).into());
        }
    }
    tracing::info!(
        "Settled after {} frames ({:.0} ms), at most {} shapes per frame",
        player.frame_count(),
        now,
        peak_shapes
    );

    if let Some(id) = hover {
        if player.hover(id) {
            tracing::info!("Hovering {}", globe.borrow().title());
        }
    }

    // let the globe finish turning towards the final highlight
    globe.borrow_mut().update(now);
    if globe.borrow().is_turning() {
        globe.borrow_mut().update(now + ROTATION_DURATION_MS);
    }

    if let Some(path) = &settings.summary_path {
        if let Some(view) = player.view() {
            let summary = RunSummary::new(
                &graph,
                &view,
                &globe.borrow(),
                renderer.layout(),
                renderer.palette(),
                player.frame_count(),
                settings.flow.seed,
            );
            summary.write(path)?;
        }
    }

    player.stop();
    Ok(())
}
