//! Screen states, menu selection and the input that drives them.

use pawrun_core::input::{InputState, Key, PadButton};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Controls,
    Credits,
    Gameplay,
    Paused,
    GameOver,
    Victory,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Title => "Title",
            Screen::Controls => "Controls",
            Screen::Credits => "Credits",
            Screen::Gameplay => "Gameplay",
            Screen::Paused => "Paused",
            Screen::GameOver => "Game Over",
            Screen::Victory => "Victory",
        }
    }

    /// Track that should be playing while this screen is up.
    pub fn music(self) -> MusicTrack {
        match self {
            Screen::Gameplay | Screen::Paused => MusicTrack::Game,
            Screen::Title
            | Screen::Controls
            | Screen::Credits
            | Screen::GameOver
            | Screen::Victory => MusicTrack::Menu,
        }
    }

    /// Items of the selectable menu shown on this screen.
    pub fn menu_items(self) -> &'static [&'static str] {
        match self {
            Screen::Title => &TITLE_ITEMS,
            Screen::Paused => &PAUSE_ITEMS,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Menu,
    Game,
}

pub const TITLE_ITEMS: [&str; 4] = ["Play", "Controls", "Credits", "Quit"];
pub const PAUSE_ITEMS: [&str; 2] = ["Resume", "Quit to Title"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Menu {
    pub selected: usize,
}

impl Menu {
    pub fn move_up(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.selected = (self.selected + item_count - 1) % item_count;
    }

    pub fn move_down(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.selected = (self.selected + 1) % item_count;
    }
}

/// Edge-triggered menu intents for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuInput {
    pub up: bool,
    pub down: bool,
    pub confirm: bool,
    pub back: bool,
    pub pause: bool,
    pub reload: bool,
}

impl MenuInput {
    pub fn from_input(input: &InputState) -> Self {
        let pad = &input.gamepad;
        Self {
            up: input.any_just_pressed(&[Key::Up, Key::W])
                || pad.is_just_pressed(PadButton::DPadUp),
            down: input.any_just_pressed(&[Key::Down, Key::S])
                || pad.is_just_pressed(PadButton::DPadDown),
            confirm: input.any_just_pressed(&[Key::Enter, Key::Space])
                || pad.is_just_pressed(PadButton::South),
            back: input.any_just_pressed(&[Key::Escape, Key::Enter, Key::Backspace])
                || pad.is_just_pressed(PadButton::East),
            pause: input.any_just_pressed(&[Key::Escape, Key::P])
                || pad.is_just_pressed(PadButton::Start),
            reload: input.is_just_pressed(Key::R),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_selection_wraps_both_ways() {
        let mut menu = Menu::default();
        menu.move_up(TITLE_ITEMS.len());
        assert_eq!(menu.selected, 3);
        menu.move_down(TITLE_ITEMS.len());
        assert_eq!(menu.selected, 0);
        menu.move_down(0);
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn gameplay_and_pause_share_the_game_track() {
        assert_eq!(Screen::Gameplay.music(), MusicTrack::Game);
        assert_eq!(Screen::Paused.music(), MusicTrack::Game);
        assert_eq!(Screen::Credits.music(), MusicTrack::Menu);
        assert_eq!(Screen::Victory.music(), MusicTrack::Menu);
    }

    #[test]
    fn gamepad_buttons_map_to_menu_intents() {
        let mut input = InputState::new();
        input.set_gamepad(true, 0.0, &[PadButton::South, PadButton::Start]);
        let menu = MenuInput::from_input(&input);
        assert!(menu.confirm);
        assert!(menu.pause);
        assert!(!menu.back);
    }
}
