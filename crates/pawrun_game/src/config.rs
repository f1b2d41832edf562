//! Game tuning and asset paths.
//!
//! Every field has a default, so `assets/config/game.json` may override any
//! subset (or be absent entirely).

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub combat: CombatConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    /// Level files in play order.
    pub levels: Vec<String>,
    /// Animation definition files.
    pub animations: Vec<String>,
    pub music: MusicConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            physics: PhysicsConfig::default(),
            combat: CombatConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            levels: vec![
                "assets/levels/level1.json".to_string(),
                "assets/levels/level2.json".to_string(),
            ],
            animations: vec![
                "assets/animations/dog.json".to_string(),
                "assets/animations/mushroom.json".to_string(),
            ],
            music: MusicConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub zoom: f32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "PawRun".to_string(),
            width: 1024,
            height: 768,
            zoom: 2.0,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub max_fall_speed: f32,
    /// Falling below this y costs a life.
    pub fall_limit: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 240.0,
            gravity: 1400.0,
            jump_speed: 560.0,
            max_fall_speed: 900.0,
            fall_limit: 1400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Downward speed above which touching an enemy stomps it.
    pub stomp_threshold: f32,
    /// Fraction of `jump_speed` applied upward after a stomp.
    pub stomp_bounce_factor: f32,
    pub stomp_score: u32,
    pub shot_score: u32,
    pub collectible_score: u32,
    pub projectile_speed: f32,
    pub projectile_range: f32,
    pub shoot_cooldown: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            stomp_threshold: 200.0,
            stomp_bounce_factor: 0.4,
            stomp_score: 100,
            shot_score: 50,
            collectible_score: 10,
            projectile_speed: 520.0,
            projectile_range: 900.0,
            shoot_cooldown: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub lives: u32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            hitbox_width: 24.0,
            hitbox_height: 32.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 60.0,
            hitbox_width: 20.0,
            hitbox_height: 24.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub menu: String,
    pub game: String,
    pub volume: f32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            menu: "assets/audio/menu_music.ogg".to_string(),
            game: "assets/audio/game_music.ogg".to_string(),
            volume: 0.6,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the config file if present, otherwise fall back to defaults.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    if !path.exists() {
        log::info!("No config at '{}', using defaults", path.display());
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}; using defaults");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window size must be > 0".to_string());
    }
    if config.window.zoom <= 0.0 {
        return Err("Config validation failed: window.zoom must be > 0".to_string());
    }
    if config.levels.is_empty() {
        return Err("Config validation failed: levels list is empty".to_string());
    }
    if config.player.lives == 0 {
        return Err("Config validation failed: player.lives must be > 0".to_string());
    }
    if config.combat.projectile_speed <= 0.0 || config.combat.projectile_range <= 0.0 {
        return Err(
            "Config validation failed: projectile speed and range must be > 0".to_string(),
        );
    }
    Ok(())
}
