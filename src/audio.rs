//! Audio sink
//!
//! The simulation raises fire-and-forget [`SoundEvent`]s by symbolic cue.
//! A host drains them each tick and hands them to an [`AudioSink`]; cues
//! whose sound never loaded are dropped silently.

use serde::{Deserialize, Serialize};

use crate::assets::AssetCatalog;
use crate::settings::Settings;
use crate::sim::EntityId;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Bullet fired
    Shot,
    /// Missile in flight (looped until the missile is destroyed)
    MissileFlight,
    /// Ship engine running (looped until the engine stops)
    Engine,
    /// Asteroid, ship or station destroyed
    Explosion,
    /// Beacon collected
    PickUp,
    /// Supply package collected
    PickAmmo,
    /// Ship docked
    Dock,
    /// Ship undocked
    Undock,
    /// Mission succeeded
    Victory,
    /// Mission failed
    GameOver,
}

impl AudioCue {
    /// Asset name of the backing sound
    pub fn name(&self) -> &'static str {
        match self {
            AudioCue::Shot => "shot",
            AudioCue::MissileFlight => "missile",
            AudioCue::Engine => "jet",
            AudioCue::Explosion => "explosion",
            AudioCue::PickUp => "pickUp",
            AudioCue::PickAmmo => "pickAmmo",
            AudioCue::Dock => "dock",
            AudioCue::Undock => "undock",
            AudioCue::Victory => "victory",
            AudioCue::GameOver => "gameover",
        }
    }

    /// Playback volume relative to the sfx channel
    pub fn volume(&self) -> f32 {
        match self {
            AudioCue::Shot => 0.1,
            AudioCue::MissileFlight => 0.5,
            AudioCue::Engine => 2.0,
            AudioCue::PickUp => 0.4,
            _ => 1.0,
        }
    }

    pub fn looped(&self) -> bool {
        matches!(self, AudioCue::MissileFlight | AudioCue::Engine)
    }
}

/// A cue raised by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEvent {
    /// Start a cue; looped cues keep playing until a matching `Stop`
    Play {
        cue: AudioCue,
        source: Option<EntityId>,
    },
    /// Stop a looped cue started by `source`
    Stop { cue: AudioCue, source: EntityId },
}

impl SoundEvent {
    pub fn play(cue: AudioCue) -> Self {
        SoundEvent::Play { cue, source: None }
    }

    pub fn play_from(cue: AudioCue, source: EntityId) -> Self {
        SoundEvent::Play {
            cue,
            source: Some(source),
        }
    }

    pub fn stop(cue: AudioCue, source: EntityId) -> Self {
        SoundEvent::Stop { cue, source }
    }
}

/// Platform playback backend
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue, volume: f32, looped: bool, source: Option<EntityId>);
    fn stop(&mut self, cue: AudioCue, source: EntityId);
}

/// Sink that discards everything (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue, _volume: f32, _looped: bool, _source: Option<EntityId>) {}
    fn stop(&mut self, _cue: AudioCue, _source: EntityId) {}
}

/// Forward drained events to `sink`, applying volume settings.
///
/// Cues without a loaded sound are skipped; muted or zero volume plays nothing.
pub fn dispatch(
    events: &[SoundEvent],
    catalog: &AssetCatalog,
    settings: &Settings,
    sink: &mut dyn AudioSink,
) {
    let channel = settings.effective_sfx_volume();
    for event in events {
        match *event {
            SoundEvent::Play { cue, source } => {
                if channel <= 0.0 {
                    continue;
                }
                if !catalog.has_sound(cue.name()) {
                    log::debug!("No sound loaded for cue {:?}, skipping", cue);
                    continue;
                }
                sink.play(cue, cue.volume() * channel, cue.looped(), source);
            }
            SoundEvent::Stop { cue, source } => {
                if catalog.has_sound(cue.name()) {
                    sink.stop(cue, source);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(AudioCue, f32, bool)>,
        stopped: Vec<AudioCue>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: AudioCue, volume: f32, looped: bool, _source: Option<EntityId>) {
            self.played.push((cue, volume, looped));
        }
        fn stop(&mut self, cue: AudioCue, _source: EntityId) {
            self.stopped.push(cue);
        }
    }

    #[test]
    fn test_missing_sound_is_silent() {
        let mut catalog = AssetCatalog::new();
        catalog.mark_loaded(AssetKind::Sound, "shot");
        let mut sink = Recorder::default();
        let events = [
            SoundEvent::play(AudioCue::Shot),
            SoundEvent::play(AudioCue::Explosion),
        ];
        dispatch(&events, &catalog, &Settings::default(), &mut sink);
        assert_eq!(sink.played.len(), 1);
        assert_eq!(sink.played[0].0, AudioCue::Shot);
    }

    #[test]
    fn test_muted_plays_nothing_but_still_stops() {
        let catalog = AssetCatalog::fully_loaded();
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        let mut sink = Recorder::default();
        let events = [
            SoundEvent::play_from(AudioCue::Engine, 4),
            SoundEvent::stop(AudioCue::Engine, 4),
        ];
        dispatch(&events, &catalog, &settings, &mut sink);
        assert!(sink.played.is_empty());
        assert_eq!(sink.stopped, vec![AudioCue::Engine]);
    }

    #[test]
    fn test_looped_cues() {
        assert!(AudioCue::MissileFlight.looped());
        assert!(AudioCue::Engine.looped());
        assert!(!AudioCue::Shot.looped());
    }
}
