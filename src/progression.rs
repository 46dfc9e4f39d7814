//! Meta progression between runs
//!
//! Finished runs pay out points and experience. Points buy blaster tiers,
//! and each tier lowers the energy cost of a shot.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::EventListener;
use crate::sim::{GameEvent, GameResult};

/// Points paid per bonus egg at the end of a run
pub const POINTS_PER_EGG: u64 = 50;

/// One step of the blaster upgrade plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeTier {
    pub level: u8,
    pub price: u64,
    pub bonus: &'static str,
    pub description: &'static str,
    /// Applied to the base shot cost
    pub energy_multiplier: f32,
}

pub static BLASTER_TIERS: [UpgradeTier; 5] = [
    UpgradeTier {
        level: 1,
        price: 0,
        bonus: "+0% fire rate",
        description: "Single yolk launcher",
        energy_multiplier: 1.0,
    },
    UpgradeTier {
        level: 2,
        price: 1200,
        bonus: "+10% fire rate",
        description: "Double-yolk barrels",
        energy_multiplier: 0.9,
    },
    UpgradeTier {
        level: 3,
        price: 2600,
        bonus: "+20% fire rate",
        description: "Incubator accelerator",
        energy_multiplier: 0.8,
    },
    UpgradeTier {
        level: 4,
        price: 4800,
        bonus: "+30% fire rate",
        description: "Solar-heated shells",
        energy_multiplier: 0.7,
    },
    UpgradeTier {
        level: 5,
        price: 8200,
        bonus: "+45% fire rate",
        description: "Nebula rail yolks",
        energy_multiplier: 0.5,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("blaster is already at max level")]
    MaxLevel,
    #[error("upgrade costs {needed} points, only {available} available")]
    NotEnoughPoints { needed: u64, available: u64 },
}

/// Outcome of adding experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub leveled_up: bool,
    pub new_level: u32,
    pub leftover_exp: u32,
}

/// Persistent player record. Storage is the host's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProgress {
    pub points: u64,
    pub blaster_level: u8,
    pub shield_level: u8,
    pub player_level: u32,
    pub experience: u32,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            points: 0,
            blaster_level: 1,
            shield_level: 1,
            player_level: 1,
            experience: 0,
        }
    }
}

impl PlayerProgress {
    /// Experience needed to clear `level`
    pub fn required_for_level(level: u32) -> u32 {
        100 + level.saturating_sub(1) * 20
    }

    /// Add experience, levelling up as many times as it covers
    pub fn add_experience(&mut self, amount: u32) -> LevelUp {
        let mut leveled_up = false;
        self.experience = self.experience.saturating_add(amount);
        while self.experience >= Self::required_for_level(self.player_level) {
            self.experience -= Self::required_for_level(self.player_level);
            self.player_level += 1;
            leveled_up = true;
            log::info!("Player reached level {}", self.player_level);
        }
        LevelUp {
            leveled_up,
            new_level: self.player_level,
            leftover_exp: self.experience,
        }
    }

    /// Pay out a finished run
    pub fn apply_result(&mut self, result: &GameResult) -> LevelUp {
        let reward = result.score as u64 + result.bonus_eggs as u64 * POINTS_PER_EGG;
        self.points += reward;
        log::info!(
            "Run reward: {} points (score {}, eggs {})",
            reward,
            result.score,
            result.bonus_eggs
        );
        self.add_experience(result.score / 2)
    }

    /// Deduct `cost` if affordable. Non-positive costs are free.
    pub fn try_spend(&mut self, cost: i64) -> bool {
        if cost <= 0 {
            return true;
        }
        let cost = cost as u64;
        if self.points >= cost {
            self.points -= cost;
            true
        } else {
            false
        }
    }

    /// Tier currently owned
    pub fn blaster_tier(&self) -> &'static UpgradeTier {
        BLASTER_TIERS
            .iter()
            .rev()
            .find(|tier| tier.level <= self.blaster_level)
            .unwrap_or(&BLASTER_TIERS[0])
    }

    /// Tier available for purchase, if any
    pub fn next_blaster_tier(&self) -> Option<&'static UpgradeTier> {
        BLASTER_TIERS
            .iter()
            .find(|tier| tier.level == self.blaster_level + 1)
    }

    /// Buy the next blaster tier
    pub fn upgrade_blaster(&mut self) -> Result<&'static UpgradeTier, UpgradeError> {
        let next = self.next_blaster_tier().ok_or(UpgradeError::MaxLevel)?;
        if !self.try_spend(next.price as i64) {
            return Err(UpgradeError::NotEnoughPoints {
                needed: next.price,
                available: self.points,
            });
        }
        self.blaster_level = next.level;
        log::info!(
            "Blaster upgraded to level {} ({})",
            next.level,
            next.description
        );
        Ok(next)
    }

    /// Multiplier to feed into `Command::SetShotEnergyMultiplier`
    pub fn shot_energy_multiplier(&self) -> f32 {
        self.blaster_tier().energy_multiplier
    }
}

/// Event listener that pays out every `GameOver` into shared progress.
///
/// Clones share the same record, so the host can keep one and subscribe
/// another to a session.
#[derive(Debug, Clone, Default)]
pub struct RewardAccrual {
    progress: Arc<Mutex<PlayerProgress>>,
    last_level_up: Arc<Mutex<Option<LevelUp>>>,
}

impl RewardAccrual {
    pub fn new(progress: PlayerProgress) -> Self {
        Self {
            progress: Arc::new(Mutex::new(progress)),
            last_level_up: Arc::new(Mutex::new(None)),
        }
    }

    /// Copy of the current record
    pub fn snapshot(&self) -> PlayerProgress {
        self.progress.lock().clone()
    }

    /// Outcome of the most recent payout
    pub fn last_level_up(&self) -> Option<LevelUp> {
        *self.last_level_up.lock()
    }

    /// Run `f` against the record while holding the lock
    pub fn with_progress<R>(&self, f: impl FnOnce(&mut PlayerProgress) -> R) -> R {
        f(&mut self.progress.lock())
    }
}

impl EventListener for RewardAccrual {
    fn on_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::GameOver(result) = event {
                let level_up = self.progress.lock().apply_result(result);
                *self.last_level_up.lock() = Some(level_up);
            }
        }
    }
}
