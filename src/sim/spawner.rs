//! Timed spawning of enemies, eggs and enemy bullets
//!
//! Three independent countdowns tick down by the frame delta. When one runs
//! out, at most one entity of that kind is appended and the countdown is
//! re-armed. Countdowns live outside `GameState` and are owned by the session.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::state::{Entity, GameState};
use crate::consts::*;
use crate::tuning::Tuning;

/// Per-kind spawn countdowns (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub enemy_cooldown: f32,
    pub egg_cooldown: f32,
    pub enemy_shot_cooldown: f32,
}

impl Spawner {
    /// Countdowns at their base values
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            enemy_cooldown: tuning.enemy_base_cooldown,
            egg_cooldown: tuning.egg_base_cooldown,
            enemy_shot_cooldown: tuning.enemy_shot_base_cooldown,
        }
    }

    /// Re-arm every countdown at its base value (run start)
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning);
    }

    /// Advance the countdowns and append whatever is due to `state`.
    ///
    /// Difficulty scales with `state.time_seconds`, so call this before the
    /// seconds counter advances for the tick.
    pub fn spawn<R: Rng>(&mut self, state: &mut GameState, dt: f32, tuning: &Tuning, rng: &mut R) {
        let elapsed = state.time_seconds as f32;

        self.enemy_cooldown -= dt;
        if self.enemy_cooldown <= 0.0 {
            let id = state.next_entity_id();
            let x = rng.random_range(SPAWN_MIN_X..=SPAWN_MAX_X);
            let size = rng.random_range(ENEMY_MIN_SIZE..=ENEMY_MAX_SIZE);
            let drift = rng.random_range(-ENEMY_MAX_DRIFT..=ENEMY_MAX_DRIFT);
            let speed = (ENEMY_BASE_SPEED + elapsed * SPEED_RAMP_PER_SECOND).min(ENEMY_MAX_SPEED);
            state.enemies.push(Entity::enemy(
                id,
                Vec2::new(x, ENEMY_SPAWN_Y),
                size,
                speed,
                drift,
            ));
            self.enemy_cooldown = tuning.enemy_interval(state.time_seconds);
            log::debug!("Spawned enemy {} at x={:.2}", id.0, x);
        }

        self.egg_cooldown -= dt;
        if self.egg_cooldown <= 0.0 {
            let id = state.next_entity_id();
            let x = rng.random_range(SPAWN_MIN_X..=SPAWN_MAX_X);
            state.eggs.push(Entity::egg(id, Vec2::new(x, EGG_SPAWN_Y)));
            self.egg_cooldown = rng.random_range(tuning.egg_interval_min..tuning.egg_interval_max);
            log::debug!("Spawned egg {} at x={:.2}", id.0, x);
        }

        // Stays armed while the sky is empty; the next enemy to appear fires.
        self.enemy_shot_cooldown -= dt;
        if self.enemy_shot_cooldown <= 0.0 {
            let Some(shooter) = state.enemies.choose(rng).cloned() else {
                return;
            };
            let aim = ((state.player.x - shooter.pos.x) * ENEMY_BULLET_AIM_GAIN)
                .clamp(-ENEMY_BULLET_MAX_DRIFT, ENEMY_BULLET_MAX_DRIFT);
            let speed =
                (ENEMY_BULLET_BASE_SPEED + elapsed * SPEED_RAMP_PER_SECOND).min(ENEMY_BULLET_MAX_SPEED);
            let muzzle = shooter.pos + Vec2::new(0.0, shooter.size * MUZZLE_OFFSET);
            let id = state.next_entity_id();
            state
                .enemy_bullets
                .push(Entity::enemy_bullet(id, muzzle, speed, aim));
            self.enemy_shot_cooldown = rng
                .random_range(tuning.enemy_shot_interval_min..tuning.enemy_shot_interval_max)
                .max(tuning.enemy_shot_interval_floor);
            log::debug!("Enemy {} fired bullet {}", shooter.id.0, id.0);
        }
    }
}
