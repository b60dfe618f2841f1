// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod airports;
pub mod csv_import;
pub mod export;
pub mod flight;
pub mod geo;
pub mod settings;
pub mod stats;
pub mod store;

use std::path::PathBuf;
use thiserror::Error;

pub use csv_import::parse_csv;
pub use flight::{FlightRecord, Location, StoredFlight};
pub use geo::{haversine_km, DistanceUnit, KM_TO_MILES};

#[derive(Error, Debug)]
pub enum LogbookError {
    /// Structural problem with an imported file (no data rows, missing columns).
    #[error("Format error: {0}")]
    Format(String),
    #[error("Flight {0} not found in logbook")]
    NotFound(u64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LogbookError>;

/// Per-user configuration directory, e.g. `~/.config/flightlog` on Linux.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "flightlog", "flightlog")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
