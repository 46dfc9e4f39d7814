//! Game state and core simulation types
//!
//! Entities are plain values. A tick never edits a collection in place; it
//! builds the next frame's collections from the previous ones.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting on the intro overlay; nothing moves except the starfield
    #[default]
    Intro,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended, `GameState::result` is populated
    Result,
}

impl GamePhase {
    /// Only a running game accepts movement and fire commands
    #[inline]
    pub fn is_controllable(self) -> bool {
        self == GamePhase::Running
    }
}

/// Run-unique, strictly increasing entity identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

/// Closed set of field entities.
///
/// The player is not an entity kind: it only exists as a collision body
/// built from `GameState::player` during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy,
    Bullet,
    EnemyBullet,
    Egg,
}

/// A moving, sized object on the play-field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Normalized field position
    pub pos: Vec2,
    /// Diameter-like scalar; two bodies overlap when closer than the mean of their sizes
    pub size: f32,
    /// Vertical speed magnitude. Player bullets travel up, everything else down.
    pub speed: f32,
    /// Signed horizontal speed
    pub horizontal_speed: f32,
}

impl Entity {
    pub fn bullet(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            kind: EntityKind::Bullet,
            pos,
            size: BULLET_SIZE,
            speed: BULLET_SPEED,
            horizontal_speed: 0.0,
        }
    }

    pub fn enemy(id: EntityId, pos: Vec2, size: f32, speed: f32, horizontal_speed: f32) -> Self {
        Self {
            id,
            kind: EntityKind::Enemy,
            pos,
            size,
            speed,
            horizontal_speed,
        }
    }

    pub fn enemy_bullet(id: EntityId, pos: Vec2, speed: f32, horizontal_speed: f32) -> Self {
        Self {
            id,
            kind: EntityKind::EnemyBullet,
            pos,
            size: ENEMY_BULLET_SIZE,
            speed,
            horizontal_speed,
        }
    }

    pub fn egg(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            kind: EntityKind::Egg,
            pos,
            size: EGG_SIZE,
            speed: EGG_SPEED,
            horizontal_speed: 0.0,
        }
    }

    /// Position and velocity after `dt` seconds.
    ///
    /// Enemies bounce off the side lanes: crossing `ENEMY_MIN_X`/`ENEMY_MAX_X`
    /// reverses horizontal speed and clamps x back inside.
    pub fn advanced(&self, dt: f32) -> Self {
        let mut next = self.clone();
        match self.kind {
            EntityKind::Bullet => {
                next.pos.x += self.horizontal_speed * dt;
                next.pos.y -= self.speed * dt;
            }
            EntityKind::EnemyBullet => {
                next.pos.x += self.horizontal_speed * dt;
                next.pos.y += self.speed * dt;
            }
            EntityKind::Enemy => {
                let mut x = self.pos.x + self.horizontal_speed * dt;
                if !(ENEMY_MIN_X..=ENEMY_MAX_X).contains(&x) {
                    next.horizontal_speed = -self.horizontal_speed;
                    x = x.clamp(ENEMY_MIN_X, ENEMY_MAX_X);
                }
                next.pos.x = x;
                next.pos.y += self.speed * dt;
            }
            EntityKind::Egg => {
                next.pos.y += self.speed * dt;
            }
        }
        next
    }

    /// Survival predicate: false once the entity has left the field
    pub fn in_field(&self) -> bool {
        let x_ok = self.pos.x > CULL_MIN_X && self.pos.x < CULL_MAX_X;
        match self.kind {
            EntityKind::Bullet => self.pos.y > CULL_TOP_Y && x_ok,
            EntityKind::EnemyBullet => self.pos.y < CULL_BOTTOM_Y && x_ok,
            EntityKind::Enemy | EntityKind::Egg => self.pos.y < CULL_BOTTOM_Y,
        }
    }
}

/// Decorative background particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

impl Star {
    /// Scatter a fresh starfield across the whole field
    pub fn scatter<R: Rng>(rng: &mut R, count: usize) -> Vec<Star> {
        (0..count)
            .map(|index| Star {
                id: index as u32,
                pos: Vec2::new(rng.random::<f32>(), rng.random::<f32>()),
                size: rng.random_range(STAR_MIN_SIZE..=STAR_MAX_SIZE),
                speed: rng.random_range(STAR_MIN_SPEED..=STAR_MAX_SPEED),
            })
            .collect()
    }
}

/// Transient blast marker left where an enemy died
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: f32,
    /// Seconds since spawn
    pub age: f32,
}

impl Explosion {
    pub fn new(id: EntityId, pos: Vec2, size: f32) -> Self {
        Self {
            id,
            pos,
            size,
            age: 0.0,
        }
    }

    /// Animation progress in [0, 1)
    pub fn progress(&self) -> f32 {
        self.age / EXPLOSION_DURATION
    }
}

/// Terminal summary of a finished run.
///
/// Exactly the four fields reward accrual needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u32,
    pub time_seconds: u32,
    pub bonus_eggs: u32,
    pub enemies_down: u32,
}

/// Discrete gameplay events, emitted in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerShot,
    PlayerHit,
    EnemyDestroyed,
    EggCollected,
    GameOver(GameResult),
}

/// Complete frame state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current phase
    pub phase: GamePhase,
    /// Score, never decreases during a run
    pub score: u32,
    /// Whole seconds of running time
    pub time_seconds: u32,
    /// Remaining lives
    pub lives: u8,
    /// Fire resource in [0, 1]
    pub energy: f32,
    /// Eggs collected this run
    pub bonus_eggs: u32,
    /// Enemies shot down this run
    pub enemies_down: u32,
    /// Player ship center
    pub player: Vec2,
    pub player_size: f32,
    /// Active entities, each list in spawn (id) order
    pub enemies: Vec<Entity>,
    pub bullets: Vec<Entity>,
    pub enemy_bullets: Vec<Entity>,
    pub eggs: Vec<Entity>,
    /// Backdrop, kept across pause/resume and restarts
    pub stars: Vec<Star>,
    pub explosions: Vec<Explosion>,
    /// Set only in `GamePhase::Result`
    pub result: Option<GameResult>,
    /// Running time not yet folded into `time_seconds`
    pub seconds_fraction: f32,
    /// Last allocated entity id
    next_id: u64,
}

impl GameState {
    /// Fresh intro state with the given lives and starfield
    pub fn new(lives: u8, stars: Vec<Star>) -> Self {
        Self {
            phase: GamePhase::Intro,
            score: 0,
            time_seconds: 0,
            lives,
            energy: 1.0,
            bonus_eggs: 0,
            enemies_down: 0,
            player: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            player_size: PLAYER_SIZE,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            eggs: Vec::new(),
            stars,
            explosions: Vec::new(),
            result: None,
            seconds_fraction: 0.0,
            next_id: 0,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    /// Value of the id counter; 0 means nothing was allocated yet this run
    pub fn id_counter(&self) -> u64 {
        self.next_id
    }

    /// Snapshot of the terminal numbers
    pub fn summary(&self) -> GameResult {
        GameResult {
            score: self.score,
            time_seconds: self.time_seconds,
            bonus_eggs: self.bonus_eggs,
            enemies_down: self.enemies_down,
        }
    }

    /// Total live entities, excluding stars and explosions
    pub fn entity_count(&self) -> usize {
        self.enemies.len() + self.bullets.len() + self.enemy_bullets.len() + self.eggs.len()
    }

    /// Describe the first broken invariant, if any.
    ///
    /// Used behind `debug_assert!` after every tick and command.
    pub fn invariant_violation(&self, max_lives: u8) -> Option<String> {
        if !(0.0..=1.0).contains(&self.energy) {
            return Some(format!("energy {} outside [0, 1]", self.energy));
        }
        if self.lives > max_lives {
            return Some(format!("lives {} above {}", self.lives, max_lives));
        }
        if (self.phase == GamePhase::Result) != self.result.is_some() {
            return Some(format!(
                "phase {:?} with result {:?}",
                self.phase, self.result
            ));
        }

        let groups = [
            (EntityKind::Enemy, &self.enemies),
            (EntityKind::Bullet, &self.bullets),
            (EntityKind::EnemyBullet, &self.enemy_bullets),
            (EntityKind::Egg, &self.eggs),
        ];
        let mut ids: Vec<u64> = self.explosions.iter().map(|e| e.id.0).collect();
        for (kind, entities) in groups {
            let mut last = 0;
            for entity in entities.iter() {
                if entity.kind != kind {
                    return Some(format!("{:?} stored with {:?}", entity.kind, kind));
                }
                if entity.id.0 <= last {
                    return Some(format!("{:?} ids not increasing at {}", kind, entity.id.0));
                }
                if !entity.in_field() {
                    return Some(format!("{:?} {} left the field", kind, entity.id.0));
                }
                last = entity.id.0;
                ids.push(entity.id.0);
            }
        }
        if self.explosions.iter().any(|e| e.age >= EXPLOSION_DURATION) {
            return Some("expired explosion kept".to_string());
        }

        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Some("duplicate entity id".to_string());
        }
        if ids.last().is_some_and(|&max| max > self.next_id) {
            return Some(format!("entity id above counter {}", self.next_id));
        }
        None
    }
}
