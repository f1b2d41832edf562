//! Sprite-sheet animation: sheet metadata plus a per-entity play-head.
//!
//! A sheet is a single horizontal strip of equally sized frames. The play-head
//! advances at most one frame per update once its timer reaches the frame
//! duration; the timer then restarts from zero (leftover time is dropped).
//!
//! Sheet definitions live in JSON animation files so art can be swapped
//! without rebuilding:
//!
//! ```json
//! { "version": "0.1", "animation_id": "dog",
//!   "sheets": { "walk": { "texture": "...", "frame_count": 6,
//!                         "frame_width": 48, "frame_height": 48,
//!                         "frame_speed": 10, "looping": true } } }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::geometry::Rect;

/// Frame-strip metadata for one animation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpriteSheet {
    pub texture: String,
    pub frame_count: u32,
    pub frame_width: f32,
    pub frame_height: f32,
    /// Frames per second.
    pub frame_speed: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

impl SpriteSheet {
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_speed
    }

    /// Source region of `frame` inside the texture strip.
    pub fn source_rect(&self, frame: u32) -> Rect {
        Rect::new(
            self.frame_width * frame as f32,
            0.0,
            self.frame_width,
            self.frame_height,
        )
    }

    pub fn last_frame(&self) -> u32 {
        self.frame_count.saturating_sub(1)
    }
}

/// Play-head for one animated entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub current_frame: u32,
    pub timer: f32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sheet: &SpriteSheet, dt: f32) {
        if sheet.frame_count == 0 {
            return;
        }
        if !sheet.looping && self.current_frame >= sheet.last_frame() {
            return;
        }

        self.timer += dt;
        if self.timer >= sheet.frame_duration() {
            self.timer = 0.0;
            self.current_frame += 1;
            if self.current_frame >= sheet.frame_count {
                self.current_frame = if sheet.looping { 0 } else { sheet.last_frame() };
            }
        }
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.timer = 0.0;
    }

    /// True while the play-head sits on the sheet's last frame.
    pub fn is_finished(&self, sheet: &SpriteSheet) -> bool {
        self.current_frame == sheet.last_frame()
    }
}

/// Parsed animation definition file.
#[derive(Debug, Clone)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub sheets: HashMap<String, SpriteSheet>,
}

#[derive(Debug, Deserialize)]
struct AnimationFileJson {
    version: String,
    animation_id: String,
    sheets: HashMap<String, SpriteSheet>,
}

pub fn load_animation_file(path: &Path) -> Result<AnimationFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation file {}: {e}", path.display()))?;
    parse_animation_file(&raw)
        .map_err(|e| format!("Animation file {}: {e}", path.display()))
}

pub fn parse_animation_file(raw: &str) -> Result<AnimationFile, String> {
    let json: AnimationFileJson =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse animation JSON: {e}"))?;
    validate_animation_json(&json)?;
    Ok(AnimationFile {
        version: json.version,
        animation_id: json.animation_id,
        sheets: json.sheets,
    })
}

fn validate_animation_json(json: &AnimationFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }
    for (name, sheet) in &json.sheets {
        if sheet.frame_count == 0 {
            return Err(format!(
                "Animation validation failed: sheet '{}' has no frames",
                name
            ));
        }
        if sheet.frame_speed <= 0.0 {
            return Err(format!(
                "Animation validation failed: sheet '{}' has non-positive frame_speed",
                name
            ));
        }
        if sheet.frame_width <= 0.0 || sheet.frame_height <= 0.0 {
            return Err(format!(
                "Animation validation failed: sheet '{}' has empty frame size",
                name
            ));
        }
    }
    Ok(())
}

const fn default_looping() -> bool {
    true
}
