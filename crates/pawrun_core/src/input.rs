//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. Used for continuous actions like walking.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened. Cleared by `end_frame()`, which the main
//!   loop calls only after at least one fixed simulation step has consumed
//!   them, so a press landing on a frame with zero steps is not lost.
//!
//! Gamepads are polled rather than event-driven: the platform layer pushes a
//! snapshot of held buttons and the left-stick axis once per frame, and the
//! edge set is derived by diffing against the previous snapshot.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Enter,
    Backspace,
    W,
    A,
    S,
    D,
    J,
    P,
    R,
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    South,
    East,
    West,
    North,
    Start,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

#[derive(Debug, Clone, Default)]
pub struct GamepadState {
    pub connected: bool,
    /// Left stick X after dead-zone, in `[-1, 1]`.
    pub axis_x: f32,
    held: HashSet<PadButton>,
    just_pressed: HashSet<PadButton>,
}

impl GamepadState {
    pub fn is_held(&self, button: PadButton) -> bool {
        self.held.contains(&button)
    }

    pub fn is_just_pressed(&self, button: PadButton) -> bool {
        self.just_pressed.contains(&button)
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
    pub gamepad: GamepadState,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            gamepad: GamepadState::default(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Replace the gamepad snapshot. Buttons held now but not in the previous
    /// snapshot become just-pressed; edges accumulate until `end_frame()`.
    pub fn set_gamepad(&mut self, connected: bool, axis_x: f32, held: &[PadButton]) {
        let pad = &mut self.gamepad;
        pad.connected = connected;
        pad.axis_x = if connected { axis_x.clamp(-1.0, 1.0) } else { 0.0 };

        let next: HashSet<PadButton> = if connected {
            held.iter().copied().collect()
        } else {
            HashSet::new()
        };
        for button in &next {
            if !pad.held.contains(button) {
                pad.just_pressed.insert(*button);
            }
        }
        pad.held = next;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_just_pressed(*k))
    }

    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_held(*k))
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.gamepad.just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(input.is_held(Key::A));
        assert!(input.is_just_pressed(Key::A));
    }

    #[test]
    fn key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
        assert!(input.is_just_released(Key::A));
    }

    #[test]
    fn key_repeat_keeps_single_press() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        // OS key repeat delivers another press while the key is held.
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(!input.is_just_pressed(Key::Space));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::A);
        assert!(!input.is_just_released(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::A));
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::A));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn any_helpers_match_individual_queries() {
        let mut input = InputState::new();
        input.key_down(Key::Enter);
        assert!(input.any_just_pressed(&[Key::Space, Key::Enter]));
        assert!(input.any_held(&[Key::Enter]));
        assert!(!input.any_held(&[Key::Space, Key::Escape]));
    }

    #[test]
    fn gamepad_press_is_edge_triggered() {
        let mut input = InputState::new();
        input.set_gamepad(true, 0.0, &[PadButton::South]);
        assert!(input.gamepad.is_just_pressed(PadButton::South));
        input.end_frame();

        input.set_gamepad(true, 0.0, &[PadButton::South]);
        assert!(input.gamepad.is_held(PadButton::South));
        assert!(!input.gamepad.is_just_pressed(PadButton::South));

        input.set_gamepad(true, 0.0, &[]);
        input.set_gamepad(true, 0.0, &[PadButton::South]);
        assert!(input.gamepad.is_just_pressed(PadButton::South));
    }

    #[test]
    fn disconnected_gamepad_reports_nothing() {
        let mut input = InputState::new();
        input.set_gamepad(true, 0.7, &[PadButton::West]);
        input.end_frame();
        input.set_gamepad(false, 0.7, &[PadButton::West]);
        assert!(!input.gamepad.connected);
        assert_eq!(input.gamepad.axis_x, 0.0);
        assert!(!input.gamepad.is_held(PadButton::West));
    }

    #[test]
    fn gamepad_axis_is_clamped() {
        let mut input = InputState::new();
        input.set_gamepad(true, 3.0, &[]);
        assert_eq!(input.gamepad.axis_x, 1.0);
    }
}
