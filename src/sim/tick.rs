//! Fixed timestep simulation tick
//!
//! `step` is the single authoritative state transition. It reads the previous
//! frame and returns the next one together with the events it produced.

use rand::Rng;

use super::collision::resolve;
use super::spawner::Spawner;
use super::state::{Entity, GameEvent, GamePhase, GameState, Star};
use crate::consts::EXPLOSION_DURATION;
use crate::tuning::Tuning;

/// Result of one tick
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: GameState,
    /// Collision events in resolution order, then `GameOver` if the run ended
    pub events: Vec<GameEvent>,
}

/// Advance the game by one fixed timestep.
///
/// Outside `GamePhase::Running` only the starfield moves.
pub fn step<R: Rng>(
    state: &GameState,
    dt: f32,
    spawner: &mut Spawner,
    tuning: &Tuning,
    rng: &mut R,
) -> StepOutcome {
    let mut next = state.clone();
    next.stars = advance_stars(&state.stars, dt);

    if state.phase != GamePhase::Running {
        return StepOutcome {
            state: next,
            events: Vec::new(),
        };
    }

    // Passive regen and survival score
    next.energy = (state.energy + dt * tuning.energy_regen).clamp(0.0, 1.0);
    next.score = state.score + (dt * tuning.score_per_second) as u32;

    next.explosions = state
        .explosions
        .iter()
        .map(|explosion| {
            let mut explosion = explosion.clone();
            explosion.age += dt;
            explosion
        })
        .filter(|explosion| explosion.age < EXPLOSION_DURATION)
        .collect();

    // Motion, then cull anything that left the field
    next.bullets = advance_all(&state.bullets, dt);
    next.enemy_bullets = advance_all(&state.enemy_bullets, dt);
    next.enemies = advance_all(&state.enemies, dt);
    next.eggs = advance_all(&state.eggs, dt);

    let mut events = resolve(&mut next, tuning).events;

    spawner.spawn(&mut next, dt, tuning, rng);

    // Whole seconds; loops so a long frame can add several
    next.seconds_fraction += dt;
    while next.seconds_fraction >= 1.0 {
        next.time_seconds += 1;
        next.seconds_fraction -= 1.0;
    }

    log::trace!(
        "tick: score={} lives={} energy={:.3} entities={}",
        next.score,
        next.lives,
        next.energy,
        next.entity_count()
    );

    if next.lives == 0 {
        let result = next.summary();
        next.phase = GamePhase::Result;
        next.result = Some(result);
        events.push(GameEvent::GameOver(result));
        log::info!(
            "Game over: score={} time={}s eggs={} enemies={}",
            result.score,
            result.time_seconds,
            result.bonus_eggs,
            result.enemies_down
        );
    }

    StepOutcome {
        state: next,
        events,
    }
}

/// Scroll the starfield, wrapping past the bottom edge back to the top
pub fn advance_stars(stars: &[Star], dt: f32) -> Vec<Star> {
    stars
        .iter()
        .map(|star| {
            let mut star = star.clone();
            star.pos.y += star.speed * dt;
            if star.pos.y > 1.0 {
                star.pos.y -= 1.0;
            }
            star
        })
        .collect()
}

fn advance_all(entities: &[Entity], dt: f32) -> Vec<Entity> {
    entities
        .iter()
        .map(|entity| entity.advanced(dt))
        .filter(Entity::in_field)
        .collect()
}
