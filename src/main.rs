//! Chicken Galaxy headless demo
//!
//! Plays one autopilot run against the simulation core and prints the result
//! and the player's progression as JSON.
//!
//! Usage: `chicken-galaxy [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run() {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts embed the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::thread;
    use std::time::Instant;

    use chicken_galaxy::audio::{AudioRouter, LogTrigger};
    use chicken_galaxy::autopilot::Autopilot;
    use chicken_galaxy::consts::SIM_DT;
    use chicken_galaxy::runner::{ChannelSink, Runner};
    use chicken_galaxy::sim::{GameEvent, GamePhase};
    use chicken_galaxy::{Command, RewardAccrual, Session, Settings};

    pub fn run() -> Result<(), Box<dyn Error>> {
        let settings = match std::env::args().nth(1) {
            Some(path) => Settings::load_or_default(path),
            None => Settings::default(),
        };
        let seed = settings.effective_seed();
        log::info!("Chicken Galaxy (native) starting with seed {}", seed);

        let accrual = RewardAccrual::default();
        let (sink, events) = ChannelSink::channel();

        let mut session = Session::new(seed, settings.tuning.clone())?;
        session.subscribe_events(Box::new(accrual.clone()));
        session.subscribe_events(Box::new(AudioRouter::from_settings(
            LogTrigger,
            &settings,
        )));
        session.subscribe_events(Box::new(sink));

        let (mut runner, control) = Runner::new(session, &settings);
        let multiplier = accrual.snapshot().shot_energy_multiplier();
        control.send(Command::SetShotEnergyMultiplier(multiplier).into())?;
        control.send(Command::StartRun.into())?;
        runner.pump(0.0);

        let pilot = Autopilot::default();
        let mut result = None;
        let mut last = Instant::now();
        while runner.session().phase() == GamePhase::Running
            && runner.session().state().time_seconds < settings.max_run_seconds
        {
            let session = runner.session();
            for command in pilot.decide(session.state(), session.shot_cost()) {
                control.send(command.into())?;
            }

            let frame_start = Instant::now();
            let frame_dt = if settings.realtime {
                frame_start.duration_since(last).as_secs_f32()
            } else {
                SIM_DT
            };
            last = frame_start;

            if runner.pump(frame_dt).is_none() {
                break;
            }
            for event in events.try_iter() {
                if let GameEvent::GameOver(summary) = event {
                    result = Some(summary);
                }
            }

            if settings.realtime {
                thread::sleep(
                    settings
                        .tick_interval()
                        .saturating_sub(frame_start.elapsed()),
                );
            }
        }

        let finished = result.is_some();
        let summary = result.unwrap_or_else(|| runner.session().state().summary());
        if !finished {
            log::info!(
                "Stopped after {}s without a game over",
                summary.time_seconds
            );
        }

        // Spend winnings the way the hangar screen would
        match accrual.with_progress(|progress| progress.upgrade_blaster().copied()) {
            Ok(tier) => log::info!("Bought blaster tier {}: {}", tier.level, tier.bonus),
            Err(err) => log::info!("No upgrade: {}", err),
        }

        let report = serde_json::json!({
            "seed": seed,
            "finished": finished,
            "result": summary,
            "progress": accrual.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
