//! Idle/demo mode controller
//!
//! Plays through the same commands a human host would send. Priorities, in
//! order: sidestep whatever is about to hit the ship, grab a nearby egg, line
//! up under the lowest enemy.

use crate::consts::{PLAYER_MAX_X, PLAYER_MIN_X};
use crate::session::Command;
use crate::sim::{Entity, GamePhase, GameState};

/// Simple rule-based pilot
#[derive(Debug, Clone, PartialEq)]
pub struct Autopilot {
    /// Largest horizontal move per decision
    pub max_step: f32,
    /// How far above the ship a threat is considered incoming
    pub threat_range: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            max_step: 0.02,
            threat_range: 0.35,
        }
    }
}

impl Autopilot {
    /// Commands for this tick; empty outside a run
    pub fn decide(&self, state: &GameState, shot_cost: f32) -> Vec<Command> {
        let mut commands = Vec::new();
        if state.phase != GamePhase::Running {
            return commands;
        }

        let target_x = self
            .dodge_target(state)
            .or_else(|| self.egg_target(state))
            .or_else(|| lowest_enemy(state).map(|enemy| enemy.pos.x))
            .unwrap_or(0.5);

        let dx = (target_x - state.player.x).clamp(-self.max_step, self.max_step);
        if dx.abs() > 1e-4 {
            commands.push(Command::MovePlayerBy { dx, dy: 0.0 });
        }

        let lined_up = state.enemies.iter().any(|enemy| {
            enemy.pos.y < state.player.y && (enemy.pos.x - state.player.x).abs() < enemy.size * 0.5
        });
        if lined_up && state.energy >= shot_cost {
            commands.push(Command::Fire);
        }

        commands
    }

    /// Side-step position for the closest incoming enemy or bullet
    fn dodge_target(&self, state: &GameState) -> Option<f32> {
        let player = state.player;
        let half_width = state.player_size * 0.5;

        let threat = state
            .enemy_bullets
            .iter()
            .chain(state.enemies.iter())
            .filter(|e| {
                let above = player.y - e.pos.y;
                above > 0.0
                    && above < self.threat_range
                    && (e.pos.x - player.x).abs() < half_width + e.size * 0.5
            })
            .max_by(|a, b| {
                a.pos
                    .y
                    .partial_cmp(&b.pos.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;

        // Keep to the side the ship is already on unless that leaves the box
        let clearance = half_width + threat.size * 0.5 + 0.02;
        let side = if player.x >= threat.pos.x { 1.0 } else { -1.0 };
        let preferred = threat.pos.x + side * clearance;
        if (PLAYER_MIN_X..=PLAYER_MAX_X).contains(&preferred) {
            Some(preferred)
        } else {
            Some(threat.pos.x - side * clearance)
        }
    }

    /// Nearest egg still above the ship
    fn egg_target(&self, state: &GameState) -> Option<f32> {
        state
            .eggs
            .iter()
            .filter(|egg| egg.pos.y < state.player.y)
            .min_by(|a, b| {
                let dist_a = a.pos.distance(state.player);
                let dist_b = b.pos.distance(state.player);
                dist_a
                    .partial_cmp(&dist_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|egg| egg.pos.x)
    }
}

fn lowest_enemy(state: &GameState) -> Option<&Entity> {
    state.enemies.iter().max_by(|a, b| {
        a.pos
            .y
            .partial_cmp(&b.pos.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::session::Session;
    use crate::sim::GameEvent;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn running() -> GameState {
        let mut state = GameState::new(3, Vec::new());
        state.phase = GamePhase::Running;
        state
    }

    fn add_enemy(state: &mut GameState, x: f32, y: f32) {
        let id = state.next_entity_id();
        state
            .enemies
            .push(Entity::enemy(id, Vec2::new(x, y), 0.15, 0.3, 0.0));
    }

    #[test]
    fn test_idle_outside_run() {
        let mut state = running();
        add_enemy(&mut state, 0.5, 0.2);
        for phase in [GamePhase::Intro, GamePhase::Paused] {
            state.phase = phase;
            assert!(Autopilot::default().decide(&state, 0.2).is_empty());
        }
    }

    #[test]
    fn test_moves_under_lowest_enemy() {
        let mut state = running();
        add_enemy(&mut state, 0.8, 0.1);
        add_enemy(&mut state, 0.3, 0.2);
        let commands = Autopilot::default().decide(&state, 0.2);
        assert_eq!(commands, vec![Command::MovePlayerBy { dx: -0.02, dy: 0.0 }]);
    }

    #[test]
    fn test_fires_only_with_energy() {
        let mut state = running();
        add_enemy(&mut state, 0.52, 0.2);
        let pilot = Autopilot::default();
        assert!(pilot.decide(&state, 0.2).contains(&Command::Fire));
        state.energy = 0.1;
        assert!(!pilot.decide(&state, 0.2).contains(&Command::Fire));
    }

    #[test]
    fn test_dodges_incoming_bullet() {
        let mut state = running();
        let id = state.next_entity_id();
        state
            .enemy_bullets
            .push(Entity::enemy_bullet(id, Vec2::new(0.5, 0.6), 0.6, 0.0));
        let commands = Autopilot::default().decide(&state, 0.2);
        assert_eq!(commands, vec![Command::MovePlayerBy { dx: 0.02, dy: 0.0 }]);
    }

    #[test]
    fn test_dodge_flips_at_wall() {
        let mut state = running();
        state.player = Vec2::new(0.9, 0.8);
        let id = state.next_entity_id();
        state
            .enemy_bullets
            .push(Entity::enemy_bullet(id, Vec2::new(0.88, 0.6), 0.6, 0.0));
        let commands = Autopilot::default().decide(&state, 0.2);
        assert_eq!(commands, vec![Command::MovePlayerBy { dx: -0.02, dy: 0.0 }]);
    }

    #[test]
    fn test_chases_egg() {
        let mut state = running();
        let id = state.next_entity_id();
        state.eggs.push(Entity::egg(id, Vec2::new(0.49, 0.5)));
        add_enemy(&mut state, 0.9, 0.1);
        let commands = Autopilot::default().decide(&state, 0.2);
        match commands.as_slice() {
            [Command::MovePlayerBy { dx, dy }] => {
                assert!((dx + 0.01).abs() < 1e-5);
                assert_eq!(*dy, 0.0);
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_plays_a_session() {
        let mut session = Session::new(2024, Tuning::default()).unwrap();
        session.start_run();
        let pilot = Autopilot::default();
        let mut kills = 0;
        for _ in 0..3000 {
            for command in pilot.decide(session.state(), session.shot_cost()) {
                session.apply(command);
            }
            kills += session
                .tick(SIM_DT)
                .iter()
                .filter(|e| **e == GameEvent::EnemyDestroyed)
                .count();
            if session.phase() == GamePhase::Result {
                break;
            }
        }
        assert!(kills > 0);
        assert!(session.state().invariant_violation(3).is_none());
    }
}
