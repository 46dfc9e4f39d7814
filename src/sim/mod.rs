//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, injected by the caller
//! - Stable iteration order (spawn order, which is id order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Circle, Resolution, collides, resolve};
pub use spawner::Spawner;
pub use state::{
    Entity, EntityId, EntityKind, Explosion, GameEvent, GamePhase, GameResult, GameState, Star,
};
pub use tick::{StepOutcome, advance_stars, step};
