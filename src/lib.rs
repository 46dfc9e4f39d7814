//! Chicken Galaxy - simulation core for a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, tick)
//! - `session`: Run controller (phases, commands, state/event publication)
//! - `runner`: Fixed-cadence tick scheduling and command serialization
//! - `tuning` / `settings`: Data-driven balance and session configuration
//! - `audio`: Event to sound-cue routing (playback is external)
//! - `progression`: Reward accrual and blaster upgrades
//! - `autopilot`: Idle/demo controller driving the command API
//!
//! Rendering, audio output and persistence live outside this crate; they
//! consume state snapshots and the per-tick event list.

pub mod audio;
pub mod autopilot;
pub mod progression;
pub mod runner;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use progression::{PlayerProgress, RewardAccrual};
pub use session::{Command, Session};
pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

/// Game configuration constants
///
/// The play-field is normalized: x and y are fractions of its width and
/// height, y grows downward.
pub mod consts {
    /// Fixed simulation timestep (~60 Hz)
    pub const SIM_DT: f32 = 0.016;
    /// Tick cadence in milliseconds
    pub const TICK_INTERVAL_MS: u64 = 16;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock frame the stepper accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 0.5;
    pub const PLAYER_START_Y: f32 = 0.8;
    pub const PLAYER_SIZE: f32 = 0.28;
    /// Player movement bounds
    pub const PLAYER_MIN_X: f32 = 0.08;
    pub const PLAYER_MAX_X: f32 = 0.92;
    pub const PLAYER_MIN_Y: f32 = 0.2;
    pub const PLAYER_MAX_Y: f32 = 0.95;
    /// Muzzle offset as a fraction of player size
    pub const MUZZLE_OFFSET: f32 = 0.6;

    /// Player bullet
    pub const BULLET_SIZE: f32 = 0.035;
    pub const BULLET_SPEED: f32 = 1.4;

    /// Enemy bullet
    pub const ENEMY_BULLET_SIZE: f32 = 0.03;
    pub const ENEMY_BULLET_BASE_SPEED: f32 = 0.6;
    pub const ENEMY_BULLET_MAX_SPEED: f32 = 0.95;
    /// Horizontal aim gain toward the player and its clamp
    pub const ENEMY_BULLET_AIM_GAIN: f32 = 0.9;
    pub const ENEMY_BULLET_MAX_DRIFT: f32 = 0.4;

    /// Enemies
    pub const ENEMY_SPAWN_Y: f32 = -0.12;
    pub const ENEMY_MIN_SIZE: f32 = 0.12;
    pub const ENEMY_MAX_SIZE: f32 = 0.18;
    pub const ENEMY_BASE_SPEED: f32 = 0.25;
    pub const ENEMY_MAX_SPEED: f32 = 0.45;
    pub const ENEMY_MAX_DRIFT: f32 = 0.225;
    /// Enemies bounce between these x positions
    pub const ENEMY_MIN_X: f32 = 0.08;
    pub const ENEMY_MAX_X: f32 = 0.92;
    /// An enemy at or below this y has breached the bottom
    pub const BREACH_Y: f32 = 0.98;

    /// Eggs (pickups)
    pub const EGG_SPAWN_Y: f32 = -0.15;
    pub const EGG_SIZE: f32 = 0.08;
    pub const EGG_SPEED: f32 = 0.18;

    /// Horizontal spawn band for enemies and eggs
    pub const SPAWN_MIN_X: f32 = 0.1;
    pub const SPAWN_MAX_X: f32 = 0.9;

    /// Per-second speed ramp applied with elapsed run time
    pub const SPEED_RAMP_PER_SECOND: f32 = 0.003;

    /// Field culling bounds
    pub const CULL_TOP_Y: f32 = -0.1;
    pub const CULL_BOTTOM_Y: f32 = 1.1;
    pub const CULL_MIN_X: f32 = -0.2;
    pub const CULL_MAX_X: f32 = 1.2;

    /// Explosion lifetime in seconds
    pub const EXPLOSION_DURATION: f32 = 0.6;

    /// Background starfield
    pub const STAR_COUNT: usize = 70;
    pub const STAR_MIN_SIZE: f32 = 0.003;
    pub const STAR_MAX_SIZE: f32 = 0.012;
    pub const STAR_MIN_SPEED: f32 = 0.04;
    pub const STAR_MAX_SPEED: f32 = 0.12;

    /// Shot energy multiplier bounds
    pub const MIN_SHOT_MULTIPLIER: f32 = 0.1;
    pub const MAX_SHOT_MULTIPLIER: f32 = 1.0;
}
