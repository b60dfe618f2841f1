// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geo::DistanceUnit;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";
const LOGBOOK_FILE: &str = "logbook.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Unit used when showing distances; storage stays in kilometres.
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    #[serde(default)]
    pub logbook_path: Option<PathBuf>,
    /// Airport table (`iata,icao,name,city,country,lat,lon`) used to recompute distances.
    #[serde(default)]
    pub airports_path: Option<PathBuf>,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join(SETTINGS_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!(
                        "Ignoring unreadable settings file — path={} error={}",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write settings file")?;
        Ok(())
    }

    pub fn resolved_logbook_path(&self) -> PathBuf {
        self.logbook_path
            .clone()
            .unwrap_or_else(|| crate::get_config_root().join(LOGBOOK_FILE))
    }
}
