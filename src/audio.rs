//! Event to sound-cue routing
//!
//! Playback belongs to the host. This module picks the cue for each gameplay
//! event and the volume to play it at, then hands both to an `AudioTrigger`.

use serde::{Deserialize, Serialize};

use crate::session::EventListener;
use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player fired
    Shot,
    /// Player lost a life
    GetHit,
    /// Enemy destroyed
    Explosion,
    /// Bonus egg picked up
    Collect,
    /// Run finished
    Win,
}

impl SoundCue {
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::PlayerShot => SoundCue::Shot,
            GameEvent::PlayerHit => SoundCue::GetHit,
            GameEvent::EnemyDestroyed => SoundCue::Explosion,
            GameEvent::EggCollected => SoundCue::Collect,
            GameEvent::GameOver(_) => SoundCue::Win,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Shot => "shot",
            SoundCue::GetHit => "get_hit",
            SoundCue::Explosion => "explosion",
            SoundCue::Collect => "collect",
            SoundCue::Win => "win",
        }
    }
}

/// Host-side playback
pub trait AudioTrigger: Send {
    /// Start a cue. Must not block the caller.
    fn play(&mut self, cue: SoundCue, volume: f32);
}

/// Trigger that only logs; used by headless hosts
#[derive(Debug, Default)]
pub struct LogTrigger;

impl AudioTrigger for LogTrigger {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::debug!("Sound: {} at {:.2}", cue.as_str(), volume);
    }
}

/// Applies volume settings and forwards cues to a trigger
pub struct AudioRouter<T: AudioTrigger> {
    trigger: T,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<T: AudioTrigger> AudioRouter<T> {
    pub fn new(trigger: T) -> Self {
        Self {
            trigger,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(trigger: T, settings: &Settings) -> Self {
        let mut router = Self::new(trigger);
        router.set_master_volume(settings.master_volume);
        router.set_sfx_volume(settings.sfx_volume);
        router.set_muted(settings.muted);
        router
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue unless silenced
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.trigger.play(cue, vol);
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }
}

impl<T: AudioTrigger> EventListener for AudioRouter<T> {
    fn on_events(&mut self, events: &[GameEvent]) {
        for event in events {
            self.play(SoundCue::for_event(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameResult;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(SoundCue, f32)>,
    }

    impl AudioTrigger for Recorder {
        fn play(&mut self, cue: SoundCue, volume: f32) {
            self.played.push((cue, volume));
        }
    }

    fn result() -> GameResult {
        GameResult {
            score: 10,
            time_seconds: 1,
            bonus_eggs: 0,
            enemies_down: 0,
        }
    }

    #[test]
    fn test_cue_mapping() {
        assert_eq!(SoundCue::for_event(&GameEvent::PlayerShot), SoundCue::Shot);
        assert_eq!(SoundCue::for_event(&GameEvent::PlayerHit), SoundCue::GetHit);
        assert_eq!(
            SoundCue::for_event(&GameEvent::EnemyDestroyed),
            SoundCue::Explosion
        );
        assert_eq!(SoundCue::for_event(&GameEvent::EggCollected), SoundCue::Collect);
        assert_eq!(SoundCue::for_event(&GameEvent::GameOver(result())), SoundCue::Win);
    }

    #[test]
    fn test_router_plays_events_in_order() {
        let mut router = AudioRouter::new(Recorder::default());
        router.set_master_volume(0.5);
        router.on_events(&[GameEvent::EnemyDestroyed, GameEvent::PlayerHit]);
        assert_eq!(
            router.trigger().played,
            vec![(SoundCue::Explosion, 0.5), (SoundCue::GetHit, 0.5)]
        );
    }

    #[test]
    fn test_muted_router_is_silent() {
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        let mut router = AudioRouter::from_settings(Recorder::default(), &settings);
        assert_eq!(router.effective_volume(), 0.0);
        router.on_events(&[GameEvent::PlayerShot]);
        assert!(router.trigger().played.is_empty());

        router.set_muted(false);
        router.set_sfx_volume(2.0);
        assert!((router.effective_volume() - 0.8).abs() < 1e-6);
    }
}
