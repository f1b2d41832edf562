//! Level definition files: one JSON format for every level, selected by
//! index from the configured level list.

use glam::Vec2;
use pawrun_core::geometry::Rect;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::enemy::{stands_on, EDGE_MARGIN};
use crate::world::{MAX_COLLECTIBLES, MAX_ENEMIES, MAX_PLATFORMS};

const LEVEL_FORMAT_VERSION: &str = "0.1";

/// Levels compiled into the binary, used when a configured file is missing.
const BUILTIN_LEVELS: [&str; 2] = [
    include_str!("../../../assets/levels/level1.json"),
    include_str!("../../../assets/levels/level2.json"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    #[serde(default)]
    pub name: String,
    pub spawn: LevelPoint,
    pub goal: Rect,
    #[serde(default)]
    pub platforms: Vec<PlatformDef>,
    #[serde(default)]
    pub enemies: Vec<EnemyDef>,
    #[serde(default)]
    pub collectibles: Vec<LevelPoint>,
}

impl LevelFile {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.level_id
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct LevelPoint {
    pub x: f32,
    pub y: f32,
}

impl LevelPoint {
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Visual style of a platform; selects its colour and texture.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Ground,
    #[default]
    Floating,
    Small,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub kind: PlatformKind,
}

impl PlatformDef {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Enemy spawn; `y` is the surface the enemy stands on.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct EnemyDef {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_direction")]
    pub direction: i8,
    /// Overrides the configured enemy speed.
    #[serde(default)]
    pub speed: Option<f32>,
}

/// Polls a level file's modification time for hot reload.
pub struct LevelWatcher {
    level_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl LevelWatcher {
    pub fn new(level_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&level_path);
        Self {
            level_path,
            last_seen_modified,
        }
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.level_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_level_from_path(level_path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(level_path)
        .map_err(|e| format!("Failed to read level file {}: {e}", level_path.display()))?;
    parse_level(&raw).map_err(|e| format!("Level file {}: {e}", level_path.display()))
}

pub fn parse_level(raw: &str) -> Result<LevelFile, String> {
    let level: LevelFile =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse level JSON: {e}"))?;
    validate_level(&level)?;
    Ok(level)
}

#[cfg(test)]
pub fn builtin_level_count() -> usize {
    BUILTIN_LEVELS.len()
}

pub fn builtin_level(index: usize) -> Result<LevelFile, String> {
    let raw = BUILTIN_LEVELS
        .get(index)
        .ok_or_else(|| format!("No built-in level at index {index}"))?;
    parse_level(raw).map_err(|e| format!("Built-in level {index}: {e}"))
}

/// Load the level file at `level_path`, falling back to the built-in level
/// with the same index when the file is missing or invalid.
pub fn load_level_or_builtin(level_path: &Path, index: usize) -> Result<LevelFile, String> {
    match load_level_from_path(level_path) {
        Ok(level) => {
            log::info!(
                "Loaded level '{}' from '{}'",
                level.level_id,
                level_path.display()
            );
            Ok(level)
        }
        Err(err) => {
            log::warn!("{err}; trying built-in level {index}");
            builtin_level(index)
        }
    }
}

fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.version != LEVEL_FORMAT_VERSION {
        return Err(format!(
            "Level validation failed: unsupported version '{}' (expected '{LEVEL_FORMAT_VERSION}')",
            level.version
        ));
    }
    if level.level_id.is_empty() {
        return Err("Level validation failed: level_id is empty".to_string());
    }
    if level.goal.width <= 0.0 || level.goal.height <= 0.0 {
        return Err("Level validation failed: goal size must be > 0".to_string());
    }

    check_capacity("platforms", level.platforms.len(), MAX_PLATFORMS)?;
    check_capacity("enemies", level.enemies.len(), MAX_ENEMIES)?;
    check_capacity("collectibles", level.collectibles.len(), MAX_COLLECTIBLES)?;

    if level.platforms.is_empty() {
        log::warn!(
            "Level '{}' has no platforms; the player drops straight to the fall limit.",
            level.level_id
        );
    }
    for (i, platform) in level.platforms.iter().enumerate() {
        if platform.width <= 0.0 || platform.height <= 0.0 {
            return Err(format!("Level validation failed: platform {i} has non-positive size"));
        }
    }
    for (i, enemy) in level.enemies.iter().enumerate() {
        if enemy.direction != 1 && enemy.direction != -1 {
            return Err(format!(
                "Level validation failed: enemy {i} direction must be 1 or -1, got {}",
                enemy.direction
            ));
        }
        if let Some(speed) = enemy.speed {
            if speed <= 0.0 {
                return Err(format!("Level validation failed: enemy {i} speed must be > 0"));
            }
        }
        // Inside a margin the enemy would turn on every step.
        let feet = Vec2::new(enemy.x, enemy.y);
        let support = level
            .platforms
            .iter()
            .map(PlatformDef::bounds)
            .find(|bounds| stands_on(bounds, feet));
        if let Some(bounds) = support {
            let (low, high) = (bounds.left() + EDGE_MARGIN, bounds.right() - EDGE_MARGIN);
            if feet.x < low || feet.x > high {
                return Err(format!(
                    "Level validation failed: enemy {i} at x={} is outside [{low}, {high}]",
                    feet.x
                ));
            }
        }
    }

    Ok(())
}

fn check_capacity(what: &str, count: usize, capacity: usize) -> Result<(), String> {
    if count > capacity {
        return Err(format!(
            "Level validation failed: too many {what} ({count} > capacity {capacity})"
        ));
    }
    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

const fn default_direction() -> i8 {
    1
}
