//! Runtime settings
//!
//! Stored as JSON next to the binary (or wherever `--settings` points).
//! A missing or unreadable file falls back to defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Field;

/// Default settings file name
pub const SETTINGS_FILE: &str = "grid_cars_settings.json";

/// Simulation front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Demo mode ===
    /// Field width for demo runs
    pub default_width: i32,
    /// Field height for demo runs
    pub default_height: i32,
    /// Number of generated cars
    pub demo_cars: usize,
    /// Commands per generated car
    pub demo_command_len: usize,
    /// Seed used when `--demo` is given without one
    pub seed: u64,

    // === Prompt ===
    /// Print the car list after every added car
    pub echo_car_list: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_FIELD_WIDTH,
            default_height: DEFAULT_FIELD_HEIGHT,
            demo_cars: DEMO_CAR_COUNT,
            demo_command_len: DEMO_COMMAND_LEN,
            seed: DEMO_SEED,
            echo_car_list: true,
        }
    }
}

impl Settings {
    /// Field used by demo mode
    pub fn demo_field(&self) -> Result<Field> {
        Field::new(self.default_width, self.default_height).context("invalid demo field size")
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
