//! Session settings
//!
//! Loaded from a JSON file. Missing keys take their defaults, so an empty
//! object is a valid settings file.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, TICK_INTERVAL_MS};
use crate::tuning::{ConfigError, Tuning};

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; `None` derives one from the clock
    pub seed: Option<u64>,

    // === Cadence ===
    /// Wall-clock interval between ticks
    pub tick_interval_ms: u64,
    /// Cap on catch-up ticks per frame
    pub max_substeps: u32,
    /// Sleep to the cadence instead of running flat out
    pub realtime: bool,
    /// Demo driver gives up after this much simulated time
    pub max_run_seconds: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    /// Game balance
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,

            tick_interval_ms: TICK_INTERVAL_MS,
            max_substeps: MAX_SUBSTEPS,
            realtime: false,
            max_run_seconds: 300,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Like `load`, but any failure falls back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Using default settings ({}): {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Write settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid {
                field: "max_substeps",
                reason: "must be at least 1".into(),
            });
        }
        for (field, volume) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{volume} is outside 0.0 - 1.0"),
                });
            }
        }
        self.tuning.validate()
    }

    /// Configured seed, or one taken from the system clock
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
