//! Collision detection and resolution
//!
//! Bodies are circles in normalized field space. The overlap test
//! ignores the field's aspect ratio: x and y fractions are compared directly.
//!
//! Resolution runs in a fixed order and every pass only sees what earlier
//! passes left behind:
//! 1. player bullets vs enemies
//! 2. surviving player bullets vs enemy bullets
//! 3. enemies vs player (contact or bottom breach)
//! 4. enemy bullets vs player
//! 5. eggs vs player

use glam::Vec2;

use super::state::{Entity, Explosion, GameEvent, GameState};
use crate::consts::BREACH_Y;
use crate::tuning::Tuning;

/// A circular collision body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub pos: Vec2,
    pub size: f32,
}

impl Circle {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self { pos, size }
    }
}

impl From<&Entity> for Circle {
    fn from(entity: &Entity) -> Self {
        Self::new(entity.pos, entity.size)
    }
}

impl GameState {
    /// The player's collision body, materialized on demand
    pub fn player_body(&self) -> Circle {
        Circle::new(self.player, self.player_size)
    }
}

/// True when the centers are closer than the mean of the two sizes
#[inline]
pub fn collides(a: Circle, b: Circle) -> bool {
    a.pos.distance(b.pos) < (a.size + b.size) * 0.5
}

/// What one resolution pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// EnemyDestroyed / PlayerHit / EggCollected in the order they happened
    pub events: Vec<GameEvent>,
    pub enemies_destroyed: u32,
    /// Enemy bullets shot down
    pub intercepts: u32,
    pub lives_lost: u32,
    pub eggs_collected: u32,
}

/// Resolve every overlap in `state` and apply the outcomes.
///
/// Consumed entities are dropped; survivors are moved into rebuilt
/// collections in their original order.
pub fn resolve(state: &mut GameState, tuning: &Tuning) -> Resolution {
    let mut out = Resolution::default();

    let bullets = std::mem::take(&mut state.bullets);
    let mut enemies = std::mem::take(&mut state.enemies);
    let mut enemy_bullets = std::mem::take(&mut state.enemy_bullets);
    let eggs = std::mem::take(&mut state.eggs);

    // Player bullets: an enemy hit consumes the bullet before it can
    // also intercept an enemy bullet.
    let mut surviving_bullets = Vec::with_capacity(bullets.len());
    for bullet in bullets {
        let body = Circle::from(&bullet);

        if let Some(index) = enemies.iter().position(|e| collides(body, e.into())) {
            let enemy = enemies.remove(index);
            let id = state.next_entity_id();
            state
                .explosions
                .push(Explosion::new(id, enemy.pos, enemy.size));
            state.score += tuning.enemy_score;
            state.enemies_down += 1;
            gain_energy(state, tuning.enemy_energy);
            out.enemies_destroyed += 1;
            out.events.push(GameEvent::EnemyDestroyed);
            continue;
        }

        if let Some(index) = enemy_bullets.iter().position(|b| collides(body, b.into())) {
            enemy_bullets.remove(index);
            state.score += tuning.intercept_score;
            gain_energy(state, tuning.intercept_energy);
            out.intercepts += 1;
            continue;
        }

        surviving_bullets.push(bullet);
    }

    let player = state.player_body();

    let mut surviving_enemies = Vec::with_capacity(enemies.len());
    for enemy in enemies {
        let breached = enemy.pos.y >= BREACH_Y;
        if breached || collides((&enemy).into(), player) {
            lose_life(state, &mut out);
        } else {
            surviving_enemies.push(enemy);
        }
    }

    let mut surviving_enemy_bullets = Vec::with_capacity(enemy_bullets.len());
    for bullet in enemy_bullets {
        if collides((&bullet).into(), player) {
            lose_life(state, &mut out);
        } else {
            surviving_enemy_bullets.push(bullet);
        }
    }

    let mut surviving_eggs = Vec::with_capacity(eggs.len());
    for egg in eggs {
        if collides((&egg).into(), player) {
            state.bonus_eggs += 1;
            state.score += tuning.egg_score;
            gain_energy(state, tuning.egg_energy);
            out.eggs_collected += 1;
            out.events.push(GameEvent::EggCollected);
        } else {
            surviving_eggs.push(egg);
        }
    }

    state.bullets = surviving_bullets;
    state.enemies = surviving_enemies;
    state.enemy_bullets = surviving_enemy_bullets;
    state.eggs = surviving_eggs;
    out
}

fn gain_energy(state: &mut GameState, amount: f32) {
    state.energy = (state.energy + amount).clamp(0.0, 1.0);
}

/// Lives floor at zero; a hit at zero lives still consumes the attacker but
/// emits nothing.
fn lose_life(state: &mut GameState, out: &mut Resolution) {
    if state.lives > 0 {
        state.lives -= 1;
        out.lives_lost += 1;
        out.events.push(GameEvent::PlayerHit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityId;

    fn state() -> GameState {
        let mut state = GameState::new(3, Vec::new());
        state.energy = 0.5;
        state
    }

    fn add_enemy(state: &mut GameState, x: f32, y: f32) -> EntityId {
        let id = state.next_entity_id();
        state
            .enemies
            .push(Entity::enemy(id, Vec2::new(x, y), 0.15, 0.3, 0.0));
        id
    }

    #[test]
    fn test_collides_uses_mean_size() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 0.2);
        let b = Circle::new(Vec2::new(0.19, 0.0), 0.2);
        let c = Circle::new(Vec2::new(0.21, 0.0), 0.2);
        assert!(collides(a, b));
        assert!(!collides(a, c));
    }

    #[test]
    fn test_bullet_destroys_only_first_enemy() {
        let mut s = state();
        let first = add_enemy(&mut s, 0.5, 0.3);
        let second = add_enemy(&mut s, 0.52, 0.3);
        let id = s.next_entity_id();
        s.bullets.push(Entity::bullet(id, Vec2::new(0.51, 0.3)));

        let out = resolve(&mut s, &Tuning::default());
        assert_eq!(out.events, vec![GameEvent::EnemyDestroyed]);
        assert!(s.bullets.is_empty());
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.enemies[0].id, second);
        assert_ne!(s.enemies[0].id, first);
        assert_eq!(s.score, 90);
        assert_eq!(s.enemies_down, 1);
        assert!((s.energy - 0.55).abs() < 1e-6);
        assert_eq!(s.explosions.len(), 1);
        assert_eq!(s.explosions[0].pos, Vec2::new(0.5, 0.3));
    }

    #[test]
    fn test_bullet_intercepts_enemy_bullet() {
        let mut s = state();
        let id = s.next_entity_id();
        s.enemy_bullets
            .push(Entity::enemy_bullet(id, Vec2::new(0.3, 0.4), 0.6, 0.0));
        let id = s.next_entity_id();
        s.bullets.push(Entity::bullet(id, Vec2::new(0.3, 0.41)));

        let out = resolve(&mut s, &Tuning::default());
        assert!(out.events.is_empty());
        assert_eq!(out.intercepts, 1);
        assert!(s.bullets.is_empty());
        assert!(s.enemy_bullets.is_empty());
        assert_eq!(s.score, 30);
        assert!((s.energy - 0.52).abs() < 1e-6);
    }

    #[test]
    fn test_enemy_breach_costs_life() {
        let mut s = state();
        add_enemy(&mut s, 0.5, 0.98);
        s.player = Vec2::new(0.1, 0.3);

        let out = resolve(&mut s, &Tuning::default());
        assert!(s.enemies.is_empty());
        assert_eq!(s.lives, 2);
        assert_eq!(out.events, vec![GameEvent::PlayerHit]);
    }

    #[test]
    fn test_destroyed_enemy_cannot_breach() {
        let mut s = state();
        add_enemy(&mut s, 0.5, 0.99);
        let id = s.next_entity_id();
        s.bullets.push(Entity::bullet(id, Vec2::new(0.5, 0.99)));
        s.player = Vec2::new(0.1, 0.3);

        let out = resolve(&mut s, &Tuning::default());
        assert_eq!(out.events, vec![GameEvent::EnemyDestroyed]);
        assert_eq!(s.lives, 3);
    }

    #[test]
    fn test_hit_at_zero_lives_is_silent() {
        let mut s = state();
        s.lives = 0;
        let id = s.next_entity_id();
        s.enemy_bullets
            .push(Entity::enemy_bullet(id, s.player, 0.6, 0.0));

        let out = resolve(&mut s, &Tuning::default());
        assert!(out.events.is_empty());
        assert!(s.enemy_bullets.is_empty());
        assert_eq!(s.lives, 0);
    }

    #[test]
    fn test_egg_collected() {
        let mut s = state();
        s.energy = 0.9;
        let id = s.next_entity_id();
        s.eggs.push(Entity::egg(id, s.player));

        let out = resolve(&mut s, &Tuning::default());
        assert_eq!(out.events, vec![GameEvent::EggCollected]);
        assert!(s.eggs.is_empty());
        assert_eq!(s.bonus_eggs, 1);
        assert_eq!(s.score, 120);
        assert_eq!(s.energy, 1.0);
    }

    #[test]
    fn test_event_order_follows_passes() {
        let mut s = state();
        add_enemy(&mut s, 0.2, 0.2);
        let id = s.next_entity_id();
        s.bullets.push(Entity::bullet(id, Vec2::new(0.2, 0.2)));
        let id = s.next_entity_id();
        s.eggs.push(Entity::egg(id, s.player));
        let id = s.next_entity_id();
        s.enemy_bullets
            .push(Entity::enemy_bullet(id, s.player, 0.6, 0.0));

        let out = resolve(&mut s, &Tuning::default());
        assert_eq!(
            out.events,
            vec![
                GameEvent::EnemyDestroyed,
                GameEvent::PlayerHit,
                GameEvent::EggCollected
            ]
        );
    }
}
