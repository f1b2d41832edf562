//! The game context: current screen, menu, world, animation library and
//! level progression. The shell calls `update` once per fixed step and
//! `end_frame` once per rendered frame.

use std::path::{Path, PathBuf};

use pawrun_core::input::InputState;

use crate::animation::AnimationLibrary;
use crate::config::GameConfig;
use crate::controller::PlayerInput;
use crate::level::{
    builtin_level, load_level_from_path, load_level_or_builtin, LevelFile, LevelWatcher,
};
use crate::screen::{Menu, MenuInput, MusicTrack, Screen};
use crate::world::{Tuning, World};

pub struct Game {
    pub config: GameConfig,
    pub screen: Screen,
    pub menu: Menu,
    pub world: World,
    pub animations: AnimationLibrary,
    pub level_index: usize,
    pub quit_requested: bool,
    pub show_hitboxes: bool,
    level_watcher: Option<LevelWatcher>,
    current_track: Option<MusicTrack>,
    pending_music: Option<MusicTrack>,
    /// Menu input is read by the first fixed step of a frame only; set after
    /// that read and by a screen change, cleared by `end_frame`.
    input_locked: bool,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let mut animations = AnimationLibrary::new();
        animations.load_files(&config.animations);
        Self::with_animations(config, animations)
    }

    pub fn with_animations(config: GameConfig, animations: AnimationLibrary) -> Self {
        let world = World::new(Tuning::from_config(&config));
        let mut game = Self {
            config,
            screen: Screen::Title,
            menu: Menu::default(),
            world,
            animations,
            level_index: 0,
            quit_requested: false,
            show_hitboxes: false,
            level_watcher: None,
            current_track: None,
            pending_music: None,
            input_locked: false,
        };
        game.set_screen(Screen::Title);
        game.input_locked = false;
        game
    }

    /// One fixed step of whatever the current screen runs.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        let menu_input = if self.input_locked {
            MenuInput::default()
        } else {
            MenuInput::from_input(input)
        };
        self.input_locked = true;

        match self.screen {
            Screen::Title => self.update_title(menu_input),
            Screen::Controls | Screen::Credits => {
                if menu_input.back {
                    self.set_screen(Screen::Title);
                }
            }
            Screen::Gameplay => self.update_gameplay(input, menu_input, dt),
            Screen::Paused => self.update_paused(menu_input),
            Screen::GameOver | Screen::Victory => {
                if menu_input.confirm {
                    self.set_screen(Screen::Title);
                }
            }
        }
    }

    pub fn end_frame(&mut self) {
        self.input_locked = false;
    }

    /// Music change requested since the last call, if any.
    pub fn take_music_request(&mut self) -> Option<MusicTrack> {
        self.pending_music.take()
    }

    pub fn level_count(&self) -> usize {
        self.config.levels.len()
    }

    /// Reload the current level when its file changed on disk.
    pub fn poll_level_reload(&mut self) {
        if !matches!(self.screen, Screen::Gameplay | Screen::Paused) {
            return;
        }
        let changed = self
            .level_watcher
            .as_mut()
            .is_some_and(|watcher| watcher.should_reload());
        if changed {
            log::info!("Level file changed on disk, reloading");
            self.reload_level();
        }
    }

    pub fn toggle_hitboxes(&mut self) {
        self.show_hitboxes = !self.show_hitboxes;
        log::info!(
            "Hitbox outlines: {}",
            if self.show_hitboxes { "ON" } else { "OFF" }
        );
    }

    /// Reload the current level file, keeping lives and score. A broken file
    /// leaves the running level untouched. Ignored while the player is dying
    /// so the death still ends in game over.
    pub fn reload_level(&mut self) {
        if !self.world.player.is_alive() {
            log::info!("Level reload skipped: player is dead");
            return;
        }
        let path = self.level_path(self.level_index);
        let result = if path.exists() {
            load_level_from_path(&path)
        } else {
            builtin_level(self.level_index)
        };
        match result {
            Ok(level) => {
                if let Err(err) = self.install_level(&level, true) {
                    log::error!("Level reload failed: {err}");
                }
            }
            Err(err) => log::error!("Level reload failed: {err}"),
        }
    }

    fn update_title(&mut self, menu_input: MenuInput) {
        let items = Screen::Title.menu_items();
        if menu_input.up {
            self.menu.move_up(items.len());
        }
        if menu_input.down {
            self.menu.move_down(items.len());
        }
        if !menu_input.confirm {
            return;
        }
        match self.menu.selected {
            0 => self.start_new_game(),
            1 => self.set_screen(Screen::Controls),
            2 => self.set_screen(Screen::Credits),
            _ => {
                log::info!("Quit selected");
                self.quit_requested = true;
            }
        }
    }

    fn update_paused(&mut self, menu_input: MenuInput) {
        let items = Screen::Paused.menu_items();
        if menu_input.pause {
            self.set_screen(Screen::Gameplay);
            return;
        }
        if menu_input.up {
            self.menu.move_up(items.len());
        }
        if menu_input.down {
            self.menu.move_down(items.len());
        }
        if menu_input.confirm {
            if self.menu.selected == 0 {
                self.set_screen(Screen::Gameplay);
            } else {
                self.set_screen(Screen::Title);
            }
        }
    }

    fn update_gameplay(&mut self, input: &InputState, menu_input: MenuInput, dt: f32) {
        if menu_input.pause {
            self.set_screen(Screen::Paused);
            return;
        }
        if menu_input.reload {
            log::info!("Reloading level {}", self.level_index);
            self.reload_level();
        }

        let player_input = PlayerInput::from_input(input);
        let events = self.world.step(player_input, &self.animations, dt);
        if events.stomps + events.shots_hit + events.pickups + events.lives_lost > 0 {
            log::trace!("Step events: {events:?}");
        }

        if self.world.game_over {
            self.set_screen(Screen::GameOver);
        } else if self.world.level_complete {
            self.advance_level();
        }
    }

    fn start_new_game(&mut self) {
        match self.load_level(0, false) {
            Ok(()) => self.set_screen(Screen::Gameplay),
            Err(err) => log::error!("Cannot start game: {err}"),
        }
    }

    fn advance_level(&mut self) {
        let next = self.level_index + 1;
        if next >= self.level_count() {
            log::info!("Final level cleared with score {}", self.world.player.score);
            self.set_screen(Screen::Victory);
            return;
        }
        if let Err(err) = self.load_level(next, true) {
            log::error!("Cannot load level {next}: {err}");
            self.set_screen(Screen::Victory);
        }
    }

    fn load_level(&mut self, index: usize, carry_stats: bool) -> Result<(), String> {
        let path = self.level_path(index);
        let level = load_level_or_builtin(&path, index)?;
        self.install_level(&level, carry_stats)?;
        self.level_index = index;
        self.level_watcher = Some(LevelWatcher::new(path));
        Ok(())
    }

    fn install_level(&mut self, level: &LevelFile, carry_stats: bool) -> Result<(), String> {
        let carry = (carry_stats && self.world.player.is_alive())
            .then_some((self.world.player.lives, self.world.player.score));
        self.world.reset_level(level)?;
        if let Some((lives, score)) = carry {
            self.world.player.lives = lives;
            self.world.player.score = score;
        }
        Ok(())
    }

    fn level_path(&self, index: usize) -> PathBuf {
        self.config
            .levels
            .get(index)
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new("assets/levels").join(format!("level{}.json", index + 1)))
    }

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            log::info!("Screen: {} -> {}", self.screen.label(), screen.label());
        }
        if matches!(screen, Screen::Title | Screen::Paused) {
            self.menu = Menu::default();
        }
        self.screen = screen;
        self.input_locked = true;

        let track = screen.music();
        if self.current_track != Some(track) {
            log::info!("Music: {track:?}");
            self.current_track = Some(track);
            self.pending_music = Some(track);
        }
    }
}
