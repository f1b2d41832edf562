//! Gamepad polling through gilrs.
//!
//! The first connected pad is the active one. Each frame `poll` drains the
//! gilrs event queue (which keeps its cached state current) and pushes a
//! snapshot into the engine's `InputState`.

use gilrs::{Axis, Button, Gilrs};
use pawrun_core::input::{InputState, PadButton};

const STICK_DEADZONE: f32 = 0.15;

const BUTTON_MAP: &[(Button, PadButton)] = &[
    (Button::South, PadButton::South),
    (Button::East, PadButton::East),
    (Button::West, PadButton::West),
    (Button::North, PadButton::North),
    (Button::Start, PadButton::Start),
    (Button::DPadUp, PadButton::DPadUp),
    (Button::DPadDown, PadButton::DPadDown),
    (Button::DPadLeft, PadButton::DPadLeft),
    (Button::DPadRight, PadButton::DPadRight),
];

pub struct GamepadPoller {
    /// `None` when the platform has no gamepad backend.
    gilrs: Option<Gilrs>,
    was_connected: bool,
}

impl GamepadPoller {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!("Gamepad support unavailable: {e}");
                None
            }
        };
        Self {
            gilrs,
            was_connected: false,
        }
    }

    pub fn poll(&mut self, input: &mut InputState) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        while gilrs.next_event().is_some() {}

        let active = gilrs.gamepads().next().map(|(_, pad)| pad);
        let connected = active.is_some();
        if connected != self.was_connected {
            log::info!(
                "Gamepad {}",
                if connected { "connected" } else { "disconnected" }
            );
            self.was_connected = connected;
        }

        let Some(pad) = active else {
            input.set_gamepad(false, 0.0, &[]);
            return;
        };

        let held: Vec<PadButton> = BUTTON_MAP
            .iter()
            .filter(|(button, _)| pad.is_pressed(*button))
            .map(|(_, mapped)| *mapped)
            .collect();
        let axis_x = apply_deadzone(pad.value(Axis::LeftStickX), STICK_DEADZONE);
        input.set_gamepad(true, axis_x, &held);
    }
}

impl Default for GamepadPoller {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero values inside the dead-zone and rescale the rest back to `0..=1`.
fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    let magnitude = value.abs();
    if magnitude < deadzone {
        return 0.0;
    }
    let scaled = ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0);
    scaled.copysign(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadzone_zeroes_small_values() {
        assert_eq!(apply_deadzone(0.1, STICK_DEADZONE), 0.0);
        assert_eq!(apply_deadzone(-0.14, STICK_DEADZONE), 0.0);
    }

    #[test]
    fn deadzone_rescales_to_full_range() {
        assert!((apply_deadzone(1.0, STICK_DEADZONE) - 1.0).abs() < 1e-6);
        assert!((apply_deadzone(-1.0, STICK_DEADZONE) + 1.0).abs() < 1e-6);
        let mid = apply_deadzone(0.575, STICK_DEADZONE);
        assert!((mid - 0.5).abs() < 1e-5);
    }
}
