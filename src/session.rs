//! Run controller
//!
//! A `Session` owns everything that changes during play: the frame state, the
//! spawn countdowns and the RNG. Ticks and commands are plain `&mut self`
//! calls, so one can never interleave with the other.
//!
//! After every tick and every command the current state is pushed to state
//! observers; tick and fire events go to event listeners in emission order.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::{Entity, GameEvent, GamePhase, GameState, Spawner, Star, step};
use crate::tuning::{ConfigError, Tuning};

/// Inbound commands from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Begin a run from a fresh state
    StartRun,
    /// Same as `StartRun`, from the result or pause screen
    Restart,
    Pause,
    Resume,
    /// Back to the intro state
    ExitToMenu,
    /// Hardware/back button: pause, resume or leave depending on phase
    Back,
    /// App went to the background
    HostSuspended,
    MovePlayerBy { dx: f32, dy: f32 },
    Fire,
    SetShotEnergyMultiplier(f32),
}

/// Receives a snapshot after every tick and command
pub trait StateObserver: Send {
    fn on_state(&mut self, state: &GameState);
}

impl<F: FnMut(&GameState) + Send> StateObserver for F {
    fn on_state(&mut self, state: &GameState) {
        self(state)
    }
}

/// Receives gameplay events. Must return promptly; anything slow belongs on
/// the other side of a channel (see `runner::ChannelSink`).
pub trait EventListener: Send {
    fn on_events(&mut self, events: &[GameEvent]);
}

impl<F: FnMut(&[GameEvent]) + Send> EventListener for F {
    fn on_events(&mut self, events: &[GameEvent]) {
        self(events)
    }
}

/// Authoritative owner of one play session
pub struct Session {
    state: GameState,
    spawner: Spawner,
    rng: Pcg32,
    tuning: Tuning,
    shot_energy_multiplier: f32,
    observers: Vec<Box<dyn StateObserver>>,
    listeners: Vec<Box<dyn EventListener>>,
}

impl Session {
    /// New session in the intro phase. Fails if `tuning` does not validate.
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = Star::scatter(&mut rng, STAR_COUNT);
        log::info!("Session created with seed {}", seed);
        Ok(Self {
            state: GameState::new(tuning.starting_lives, stars),
            spawner: Spawner::new(&tuning),
            rng,
            tuning,
            shot_energy_multiplier: MAX_SHOT_MULTIPLIER,
            observers: Vec::new(),
            listeners: Vec::new(),
        })
    }

    /// Latest frame state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn shot_energy_multiplier(&self) -> f32 {
        self.shot_energy_multiplier
    }

    /// Energy one shot costs right now
    pub fn shot_cost(&self) -> f32 {
        self.tuning.shot_energy_cost * self.shot_energy_multiplier
    }

    /// Register a state observer; it immediately receives the current state
    pub fn subscribe_state(&mut self, mut observer: Box<dyn StateObserver>) {
        observer.on_state(&self.state);
        self.observers.push(observer);
    }

    pub fn subscribe_events(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Advance one fixed step
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let outcome = step(
            &self.state,
            dt,
            &mut self.spawner,
            &self.tuning,
            &mut self.rng,
        );
        self.state = outcome.state;
        self.publish(&outcome.events);
        outcome.events
    }

    /// Dispatch a command; returns the events it produced
    pub fn apply(&mut self, command: Command) -> Vec<GameEvent> {
        match command {
            Command::StartRun => self.start_run(),
            Command::Restart => self.restart(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::ExitToMenu => self.exit_to_menu(),
            Command::Back => self.back(),
            Command::HostSuspended => self.on_host_suspended(),
            Command::MovePlayerBy { dx, dy } => self.move_player_by(dx, dy),
            Command::Fire => return self.fire(),
            Command::SetShotEnergyMultiplier(m) => self.set_shot_energy_multiplier(m),
        }
        Vec::new()
    }

    /// Start a fresh run, keeping the current starfield
    pub fn start_run(&mut self) {
        let stars = if self.state.stars.is_empty() {
            Star::scatter(&mut self.rng, STAR_COUNT)
        } else {
            std::mem::take(&mut self.state.stars)
        };
        let mut state = GameState::new(self.tuning.starting_lives, stars);
        state.phase = GamePhase::Running;
        self.state = state;
        self.spawner.reset(&self.tuning);
        log::info!("Run started");
        self.publish(&[]);
    }

    pub fn restart(&mut self) {
        self.start_run();
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Running {
            self.state.phase = GamePhase::Paused;
            log::info!("Paused");
        }
        self.publish(&[]);
    }

    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Running;
            log::info!("Resumed");
        }
        self.publish(&[]);
    }

    /// Full reset to the intro state
    pub fn exit_to_menu(&mut self) {
        let stars = Star::scatter(&mut self.rng, STAR_COUNT);
        self.state = GameState::new(self.tuning.starting_lives, stars);
        log::info!("Exit to menu");
        self.publish(&[]);
    }

    pub fn back(&mut self) {
        match self.state.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            GamePhase::Result | GamePhase::Intro => self.exit_to_menu(),
        }
    }

    pub fn on_host_suspended(&mut self) {
        self.pause();
    }

    /// Nudge the ship, clamped to its movement box
    pub fn move_player_by(&mut self, dx: f32, dy: f32) {
        if self.state.phase.is_controllable() {
            let target = self.state.player + Vec2::new(dx, dy);
            // NaN deltas leave the ship where it is
            if target.is_finite() {
                self.state.player = Vec2::new(
                    target.x.clamp(PLAYER_MIN_X, PLAYER_MAX_X),
                    target.y.clamp(PLAYER_MIN_Y, PLAYER_MAX_Y),
                );
            }
        }
        self.publish(&[]);
    }

    /// Spend energy on a shot. No-op without enough energy or outside a run.
    pub fn fire(&mut self) -> Vec<GameEvent> {
        let cost = self.shot_cost();
        if !self.state.phase.is_controllable() || self.state.energy < cost {
            log::debug!(
                "Fire rejected: phase={:?} energy={:.3} cost={:.3}",
                self.state.phase,
                self.state.energy,
                cost
            );
            self.publish(&[]);
            return Vec::new();
        }

        let muzzle =
            self.state.player - Vec2::new(0.0, self.state.player_size * MUZZLE_OFFSET);
        let id = self.state.next_entity_id();
        self.state.bullets.push(Entity::bullet(id, muzzle));
        self.state.energy = (self.state.energy - cost).max(0.0);

        let events = vec![GameEvent::PlayerShot];
        self.publish(&events);
        events
    }

    /// Upgrade-driven discount on shot cost, clamped to [0.1, 1.0]
    pub fn set_shot_energy_multiplier(&mut self, multiplier: f32) {
        if !multiplier.is_nan() {
            self.shot_energy_multiplier = multiplier.clamp(MIN_SHOT_MULTIPLIER, MAX_SHOT_MULTIPLIER);
        }
        self.publish(&[]);
    }

    fn publish(&mut self, events: &[GameEvent]) {
        debug_assert!(
            self.state
                .invariant_violation(self.tuning.starting_lives)
                .is_none(),
            "invariant broken: {:?}",
            self.state.invariant_violation(self.tuning.starting_lives)
        );
        for observer in &mut self.observers {
            observer.on_state(&self.state);
        }
        if !events.is_empty() {
            for listener in &mut self.listeners {
                listener.on_events(events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EntityId, GameResult};
    use std::sync::{Arc, Mutex};

    fn session() -> Session {
        Session::new(1234, Tuning::default()).unwrap()
    }

    fn running() -> Session {
        let mut session = session();
        session.start_run();
        session
    }

    #[test]
    fn test_starts_in_intro_with_stars() {
        let s = session();
        assert_eq!(s.phase(), GamePhase::Intro);
        assert_eq!(s.state().stars.len(), STAR_COUNT);
        assert_eq!(s.state().lives, 3);
        assert_eq!(s.state().result, None);
    }

    #[test]
    fn test_start_run_keeps_stars() {
        let mut s = session();
        let stars = s.state().stars.clone();
        s.start_run();
        assert_eq!(s.phase(), GamePhase::Running);
        assert_eq!(s.state().stars, stars);
    }

    #[test]
    fn test_fire_spawns_bullet_and_spends_energy() {
        let mut s = running();
        let events = s.fire();
        assert_eq!(events, vec![GameEvent::PlayerShot]);
        let bullet = &s.state().bullets[0];
        assert_eq!(bullet.id, EntityId(1));
        assert!((bullet.pos.x - 0.5).abs() < 1e-6);
        assert!((bullet.pos.y - (0.8 - 0.28 * 0.6)).abs() < 1e-6);
        assert!((s.state().energy - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_fire_rejected_without_energy() {
        let mut s = running();
        while !s.fire().is_empty() {}
        let shots = s.state().bullets.len();
        assert!((4..=5).contains(&shots));
        let energy = s.state().energy;
        assert!(energy < s.shot_cost());
        let events = s.fire();
        assert!(events.is_empty());
        assert_eq!(s.state().energy, energy);
        assert_eq!(s.state().bullets.len(), shots);
    }

    #[test]
    fn test_multiplier_discounts_and_clamps() {
        let mut s = running();
        s.set_shot_energy_multiplier(0.5);
        s.fire();
        assert!((s.state().energy - 0.9).abs() < 1e-6);
        s.set_shot_energy_multiplier(0.0);
        assert_eq!(s.shot_energy_multiplier(), 0.1);
        s.set_shot_energy_multiplier(7.0);
        assert_eq!(s.shot_energy_multiplier(), 1.0);
        s.set_shot_energy_multiplier(f32::NAN);
        assert_eq!(s.shot_energy_multiplier(), 1.0);
    }

    #[test]
    fn test_commands_ignored_outside_running() {
        let mut s = session();
        let before = s.state().clone();
        s.move_player_by(0.2, 0.1);
        assert!(s.fire().is_empty());
        s.resume();
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_move_clamps_to_box() {
        let mut s = running();
        s.move_player_by(5.0, -5.0);
        assert_eq!(s.state().player, Vec2::new(PLAYER_MAX_X, PLAYER_MIN_Y));
        s.move_player_by(-5.0, 5.0);
        assert_eq!(s.state().player, Vec2::new(PLAYER_MIN_X, PLAYER_MAX_Y));
        s.move_player_by(f32::NAN, 0.0);
        assert_eq!(s.state().player, Vec2::new(PLAYER_MIN_X, PLAYER_MAX_Y));
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut s = running();
        s.pause();
        assert_eq!(s.phase(), GamePhase::Paused);
        s.pause();
        assert_eq!(s.phase(), GamePhase::Paused);
        s.resume();
        assert_eq!(s.phase(), GamePhase::Running);
        s.on_host_suspended();
        assert_eq!(s.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_back_follows_phase() {
        let mut s = running();
        s.back();
        assert_eq!(s.phase(), GamePhase::Paused);
        s.back();
        assert_eq!(s.phase(), GamePhase::Running);
        s.pause();
        s.exit_to_menu();
        assert_eq!(s.phase(), GamePhase::Intro);
        s.back();
        assert_eq!(s.phase(), GamePhase::Intro);
    }

    #[test]
    fn test_restart_resets_ids_and_spawner() {
        let mut s = running();
        s.fire();
        for _ in 0..200 {
            s.tick(SIM_DT);
        }
        assert!(s.state().id_counter() > 0);
        s.pause();
        s.apply(Command::Restart);
        assert_eq!(s.phase(), GamePhase::Running);
        assert_eq!(s.state().id_counter(), 0);
        assert_eq!(s.state().score, 0);
        assert_eq!(s.state().entity_count(), 0);
        assert_eq!(s.spawner(), &Spawner::new(s.tuning()));
    }

    #[test]
    fn test_rejects_unusable_tuning() {
        let empty_egg_range = Tuning {
            egg_interval_min: 3.0,
            egg_interval_max: 3.0,
            ..Tuning::default()
        };
        assert!(matches!(
            Session::new(1, empty_egg_range),
            Err(ConfigError::Invalid {
                field: "egg_interval_max",
                ..
            })
        ));

        let inverted_enemy_range = Tuning {
            enemy_interval_min: 1.0,
            enemy_interval_max: 0.5,
            ..Tuning::default()
        };
        assert!(matches!(
            Session::new(1, inverted_enemy_range),
            Err(ConfigError::Invalid {
                field: "enemy_interval_max",
                ..
            })
        ));
    }

    #[test]
    fn test_run_reaches_result() {
        let tuning = Tuning {
            starting_lives: 1,
            ..Tuning::default()
        };
        let mut s = Session::new(77, tuning).unwrap();
        s.start_run();
        let mut over = None;
        // An idle ship eventually takes a hit or lets an enemy through
        for _ in 0..20_000 {
            let events = s.tick(SIM_DT);
            if let Some(GameEvent::GameOver(result)) = events.last() {
                over = Some(*result);
                break;
            }
        }
        let result = over.expect("run should end");
        assert_eq!(s.phase(), GamePhase::Result);
        assert_eq!(s.state().result, Some(result));
        assert_eq!(
            result,
            GameResult {
                score: s.state().score,
                time_seconds: s.state().time_seconds,
                bonus_eggs: s.state().bonus_eggs,
                enemies_down: s.state().enemies_down,
            }
        );

        // Result is terminal until restart
        let frozen = s.state().clone();
        s.tick(SIM_DT);
        assert_eq!(s.state().score, frozen.score);
        s.back();
        assert_eq!(s.phase(), GamePhase::Intro);
    }

    #[test]
    fn test_observers_get_replay_and_updates() {
        let mut s = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.subscribe_state(Box::new(move |state: &GameState| {
            sink.lock().unwrap().push(state.phase);
        }));
        s.start_run();
        s.tick(SIM_DT);
        s.pause();
        let phases = seen.lock().unwrap().clone();
        assert_eq!(
            phases,
            vec![
                GamePhase::Intro,
                GamePhase::Running,
                GamePhase::Running,
                GamePhase::Paused
            ]
        );
    }

    #[test]
    fn test_listeners_get_events() {
        let mut s = running();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        s.subscribe_events(Box::new(move |events: &[GameEvent]| {
            sink.lock().unwrap().extend_from_slice(events);
        }));
        s.apply(Command::Fire);
        s.apply(Command::Pause);
        assert_eq!(*seen.lock().unwrap(), vec![GameEvent::PlayerShot]);
    }
}
