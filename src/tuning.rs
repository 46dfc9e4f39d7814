//! Data-driven game balance
//!
//! Every field has a serde default, so a JSON file only needs to name the
//! values it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to load or validate configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Scoring, energy economy and spawn pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Lives at run start
    pub starting_lives: u8,

    // === Score ===
    pub enemy_score: u32,
    /// Shooting down an enemy bullet
    pub intercept_score: u32,
    pub egg_score: u32,
    /// Passive score per second survived
    pub score_per_second: f32,

    // === Energy ===
    /// Passive regeneration per second
    pub energy_regen: f32,
    pub enemy_energy: f32,
    pub intercept_energy: f32,
    pub egg_energy: f32,
    /// Energy per shot before the upgrade multiplier
    pub shot_energy_cost: f32,

    // === Spawn pacing (seconds) ===
    pub enemy_base_cooldown: f32,
    pub egg_base_cooldown: f32,
    pub enemy_shot_base_cooldown: f32,
    /// Enemy interval is `start - elapsed * ramp`, clamped to [min, max]
    pub enemy_interval_start: f32,
    pub enemy_interval_ramp: f32,
    pub enemy_interval_min: f32,
    pub enemy_interval_max: f32,
    pub egg_interval_min: f32,
    pub egg_interval_max: f32,
    pub enemy_shot_interval_min: f32,
    pub enemy_shot_interval_max: f32,
    /// Enemy shots never come closer together than this
    pub enemy_shot_interval_floor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,

            enemy_score: 90,
            intercept_score: 30,
            egg_score: 120,
            score_per_second: 12.0,

            energy_regen: 0.12,
            enemy_energy: 0.05,
            intercept_energy: 0.02,
            egg_energy: 0.18,
            shot_energy_cost: 0.20,

            enemy_base_cooldown: 1.2,
            egg_base_cooldown: 2.5,
            enemy_shot_base_cooldown: 1.8,
            enemy_interval_start: 1.1,
            enemy_interval_ramp: 0.02,
            enemy_interval_min: 0.35,
            enemy_interval_max: 1.0,
            egg_interval_min: 2.5,
            egg_interval_max: 4.5,
            enemy_shot_interval_min: 0.8,
            enemy_shot_interval_max: 1.6,
            enemy_shot_interval_floor: 0.45,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_lives == 0 {
            return Err(invalid("starting_lives", "must be at least 1"));
        }
        let positive = [
            ("enemy_base_cooldown", self.enemy_base_cooldown),
            ("egg_base_cooldown", self.egg_base_cooldown),
            ("enemy_shot_base_cooldown", self.enemy_shot_base_cooldown),
            ("enemy_interval_min", self.enemy_interval_min),
            ("egg_interval_min", self.egg_interval_min),
            ("enemy_shot_interval_min", self.enemy_shot_interval_min),
            ("enemy_shot_interval_floor", self.enemy_shot_interval_floor),
            ("shot_energy_cost", self.shot_energy_cost),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        let ranges = [
            (
                "enemy_interval_max",
                self.enemy_interval_min,
                self.enemy_interval_max,
            ),
            ("egg_interval_max", self.egg_interval_min, self.egg_interval_max),
            (
                "enemy_shot_interval_max",
                self.enemy_shot_interval_min,
                self.enemy_shot_interval_max,
            ),
        ];
        for (field, min, max) in ranges {
            // Random draws use half-open ranges, so an empty range is an error.
            if max.is_nan() || max <= min {
                return Err(invalid(field, format!("{max} is not above {min}")));
            }
        }
        let fractions = [
            ("energy_regen", self.energy_regen),
            ("enemy_energy", self.enemy_energy),
            ("intercept_energy", self.intercept_energy),
            ("egg_energy", self.egg_energy),
            ("score_per_second", self.score_per_second),
            ("enemy_interval_ramp", self.enemy_interval_ramp),
        ];
        for (field, value) in fractions {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(field, format!("must not be negative, got {value}")));
            }
        }
        Ok(())
    }

    /// Next enemy countdown for the given elapsed run time
    pub fn enemy_interval(&self, elapsed_seconds: u32) -> f32 {
        (self.enemy_interval_start - elapsed_seconds as f32 * self.enemy_interval_ramp)
            .clamp(self.enemy_interval_min, self.enemy_interval_max)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
