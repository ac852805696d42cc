// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the runner.

use debtflow_graph::GraphError;
use debtflow_sequencer::{ConfigError, PlaybackError};
use std::path::PathBuf;

/// Anything that stops a run
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Invalid settings in {path}: {source}")]
    Settings {
        /// Settings file
        path: PathBuf,
        /// Parse error
        source: ron::error::SpannedError,
    },

    /// Settings could not be written
    #[error("Failed to serialize settings: {0}")]
    SettingsWrite(#[from] ron::Error),

    /// Debt data could not be read
    #[error("Invalid debt data: {0}")]
    Csv(#[from] csv::Error),

    /// Summary could not be written
    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),

    /// Debt data does not form a valid graph
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Engine options were rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The animation did not settle
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// A country code given on the command line is not registered
    #[error("Unknown country code: {0}")]
    UnknownCode(String),
}
