//! Fixed-cadence tick driver
//!
//! The host's frames rarely line up with the simulation step, so wall-clock
//! time goes into an accumulator and whole `SIM_DT` ticks come out. Commands
//! queue on a channel and are only applied between ticks.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::consts::{MAX_FRAME_DT, SIM_DT};
use crate::session::{Command, EventListener, Session};
use crate::settings::Settings;
use crate::sim::GameEvent;

/// Converts variable frame times into a count of fixed ticks
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepper {
    accumulator: f32,
    dt: f32,
    max_substeps: u32,
}

impl FixedStepper {
    pub fn new(dt: f32, max_substeps: u32) -> Self {
        Self {
            accumulator: 0.0,
            dt,
            max_substeps,
        }
    }

    /// Feed one frame of wall-clock time; returns how many ticks to run now.
    ///
    /// Frames longer than `MAX_FRAME_DT` are clamped, and at most
    /// `max_substeps` ticks come out per call. Whole ticks still banked after
    /// the cap are dropped so the backlog never grows.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() {
            self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        }

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            self.accumulator -= self.dt;
            substeps += 1;
        }
        if self.accumulator >= self.dt {
            log::debug!(
                "Dropping {:.3}s of backlog after {} substeps",
                self.accumulator - self.accumulator % self.dt,
                substeps
            );
            self.accumulator %= self.dt;
        }
        substeps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Time banked toward the next tick
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Messages accepted by a `Runner`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Command(Command),
    /// Stop after the current tick
    Shutdown,
}

impl From<Command> for Control {
    fn from(command: Command) -> Self {
        Control::Command(command)
    }
}

/// Event listener that forwards into a channel without ever blocking
pub struct ChannelSink {
    tx: Sender<GameEvent>,
}

impl ChannelSink {
    /// A sink and the receiving end of its channel
    pub fn channel() -> (Self, Receiver<GameEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl EventListener for ChannelSink {
    fn on_events(&mut self, events: &[GameEvent]) {
        for event in events {
            // A gone receiver is not the tick loop's problem
            if self.tx.try_send(*event).is_err() {
                log::trace!("Event receiver disconnected, dropping {:?}", event);
                break;
            }
        }
    }
}

/// Owns a session and drives it at a fixed cadence
pub struct Runner {
    session: Session,
    stepper: FixedStepper,
    control: Receiver<Control>,
    tick_interval: Duration,
    realtime: bool,
}

impl Runner {
    /// A runner and the sender used to control it. Dropping every sender
    /// stops the runner once the queue is drained.
    pub fn new(session: Session, settings: &Settings) -> (Self, Sender<Control>) {
        let (tx, rx) = unbounded();
        let runner = Self {
            session,
            stepper: FixedStepper::new(SIM_DT, settings.max_substeps),
            control: rx,
            tick_interval: settings.tick_interval(),
            realtime: settings.realtime,
        };
        (runner, tx)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Apply everything queued. Returns false once shut down or orphaned.
    pub fn drain_commands(&mut self) -> bool {
        loop {
            match self.control.try_recv() {
                Ok(Control::Command(command)) => {
                    self.session.apply(command);
                }
                Ok(Control::Shutdown) => {
                    log::info!("Runner shutdown requested");
                    return false;
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    log::info!("Runner control channel closed");
                    return false;
                }
            }
        }
    }

    /// Process one host frame: queued commands, then every tick that is due,
    /// with the queue drained again between ticks.
    ///
    /// Returns the tick events, or `None` once the runner should stop.
    pub fn pump(&mut self, frame_dt: f32) -> Option<Vec<GameEvent>> {
        if !self.drain_commands() {
            return None;
        }
        let mut events = Vec::new();
        let ticks = self.stepper.advance(frame_dt);
        for i in 0..ticks {
            if i > 0 && !self.drain_commands() {
                return None;
            }
            events.extend(self.session.tick(self.stepper.dt()));
        }
        Some(events)
    }

    /// Loop until shutdown and hand the session back.
    ///
    /// In realtime mode frames are measured against the clock and the loop
    /// sleeps to the tick interval; otherwise every frame is exactly one tick.
    pub fn run(mut self) -> Session {
        log::info!(
            "Runner started (realtime={}, interval={:?})",
            self.realtime,
            self.tick_interval
        );
        let mut last = Instant::now();
        loop {
            let frame_start = Instant::now();
            let frame_dt = if self.realtime {
                frame_start.duration_since(last).as_secs_f32()
            } else {
                self.stepper.dt()
            };
            last = frame_start;

            if self.pump(frame_dt).is_none() {
                break;
            }

            if self.realtime {
                thread::sleep(self.tick_interval.saturating_sub(frame_start.elapsed()));
            }
        }
        self.session
    }

    /// Run on a dedicated thread
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<Session>> {
        thread::Builder::new()
            .name("chicken-galaxy-sim".into())
            .spawn(move || self.run())
    }
}
