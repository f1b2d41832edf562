//! Looping background music: one menu track and one gameplay track.
//!
//! Playback runs on kira's backend thread; this side only starts and stops
//! handles. No audio device or a missing file disables that track with a
//! warning.

use std::path::Path;
use std::time::Duration;

use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
    Volume,
};

use crate::config::MusicConfig;
use crate::screen::MusicTrack;

const FADE_OUT: Duration = Duration::from_millis(400);

pub struct MusicPlayer {
    /// `None` when no audio device is available.
    manager: Option<AudioManager>,
    menu: Option<StaticSoundData>,
    game: Option<StaticSoundData>,
    volume: f64,
    active: Option<StaticSoundHandle>,
}

impl MusicPlayer {
    pub fn new(config: &MusicConfig) -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Some(manager),
            Err(e) => {
                log::warn!("Failed to initialize audio manager: {e}. Music disabled.");
                None
            }
        };
        let (menu, game) = if manager.is_some() {
            (load_track(&config.menu), load_track(&config.game))
        } else {
            (None, None)
        };
        Self {
            manager,
            menu,
            game,
            volume: f64::from(config.volume.clamp(0.0, 1.0)),
            active: None,
        }
    }

    /// Stop whatever is playing and loop `track` from the start.
    pub fn play(&mut self, track: MusicTrack) {
        if let Some(mut handle) = self.active.take() {
            let _ = handle.stop(Tween {
                duration: FADE_OUT,
                ..Default::default()
            });
        }

        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        let data = match track {
            MusicTrack::Menu => self.menu.as_ref(),
            MusicTrack::Game => self.game.as_ref(),
        };
        let Some(data) = data else {
            log::debug!("No audio loaded for {track:?} track");
            return;
        };

        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(self.volume).into();
        match manager.play(data.clone().with_settings(settings)) {
            Ok(handle) => {
                log::info!("Playing {track:?} music");
                self.active = Some(handle);
            }
            Err(e) => log::warn!("Failed to play {track:?} music: {e}"),
        }
    }
}

fn load_track(path: &str) -> Option<StaticSoundData> {
    match StaticSoundData::from_file(Path::new(path)) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("Failed to load music '{path}': {e}");
            None
        }
    }
}
