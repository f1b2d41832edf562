pub mod gamepad;
pub mod window;
