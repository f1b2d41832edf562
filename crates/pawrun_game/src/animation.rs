//! Animation library: sprite-sheet metadata for the player and enemies.
//!
//! Holds sheets from multiple animation definition files, keyed by the
//! file's `animation_id` and the sheet name. Built-in sheets for the dog and
//! the mushroom are registered up front, so a missing or broken file only
//! loses the overrides it would have provided.

use std::collections::HashMap;
use std::path::Path;

use pawrun_core::animation::{load_animation_file, SpriteSheet};

use crate::world::PlayerState;

pub const PLAYER_ANIMATION_ID: &str = "dog";
pub const ENEMY_ANIMATION_ID: &str = "mushroom";

pub struct AnimationLibrary {
    /// animation_id -> sheet name -> sheet
    sheets: HashMap<String, HashMap<String, SpriteSheet>>,
    fallback: SpriteSheet,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        let mut library = Self {
            sheets: HashMap::new(),
            fallback: sheet("", 1, 48.0, 48.0, 1.0, true),
        };
        library.insert_builtin();
        library
    }

    /// Load an animation file; its sheets replace same-named ones already
    /// registered under its `animation_id`.
    pub fn load_file(&mut self, path: &Path) -> Result<(), String> {
        let file = load_animation_file(path)?;
        log::info!(
            "Loaded animation '{}' ({} sheets) from '{}'",
            file.animation_id,
            file.sheets.len(),
            path.display()
        );
        self.sheets
            .entry(file.animation_id)
            .or_default()
            .extend(file.sheets);
        Ok(())
    }

    /// Load every file, logging failures and keeping whatever is already registered.
    pub fn load_files<P: AsRef<Path>>(&mut self, paths: &[P]) {
        for path in paths {
            if let Err(err) = self.load_file(path.as_ref()) {
                log::warn!("{err}; keeping built-in sheets");
            }
        }
    }

    pub fn resolve(&self, animation_id: &str, name: &str) -> Option<&SpriteSheet> {
        self.sheets.get(animation_id).and_then(|sheets| sheets.get(name))
    }

    pub fn player(&self, state: PlayerState) -> &SpriteSheet {
        self.resolve(PLAYER_ANIMATION_ID, state.label())
            .unwrap_or(&self.fallback)
    }

    pub fn enemy_walk(&self) -> &SpriteSheet {
        self.resolve(ENEMY_ANIMATION_ID, "run")
            .unwrap_or(&self.fallback)
    }

    /// Every texture path referenced by a registered sheet.
    pub fn texture_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .sheets
            .values()
            .flat_map(|sheets| sheets.values())
            .map(|sheet| sheet.texture.as_str())
            .filter(|path| !path.is_empty())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }

    fn insert_builtin(&mut self) {
        let dog = HashMap::from([
            ("idle".to_string(), sheet("assets/sprites/dog/Idle.png", 4, 48.0, 48.0, 8.0, true)),
            ("walk".to_string(), sheet("assets/sprites/dog/Walk.png", 6, 48.0, 48.0, 10.0, true)),
            ("death".to_string(), sheet("assets/sprites/dog/Death.png", 4, 48.0, 48.0, 8.0, false)),
        ]);
        let mushroom = HashMap::from([
            (
                "idle".to_string(),
                sheet("assets/sprites/mushroom/Mushroom-Idle.png", 7, 80.0, 64.0, 8.0, true),
            ),
            (
                "run".to_string(),
                sheet("assets/sprites/mushroom/Mushroom-Run.png", 8, 80.0, 64.0, 10.0, true),
            ),
            (
                "die".to_string(),
                sheet("assets/sprites/mushroom/Mushroom-Die.png", 15, 80.0, 64.0, 8.0, false),
            ),
        ]);
        self.sheets.insert(PLAYER_ANIMATION_ID.to_string(), dog);
        self.sheets.insert(ENEMY_ANIMATION_ID.to_string(), mushroom);
    }
}

impl Default for AnimationLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn sheet(
    texture: &str,
    frame_count: u32,
    frame_width: f32,
    frame_height: f32,
    frame_speed: f32,
    looping: bool,
) -> SpriteSheet {
    SpriteSheet {
        texture: texture.to_string(),
        frame_count,
        frame_width,
        frame_height,
        frame_speed,
        looping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pawrun_animlib_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn builtin_sheets_cover_player_states_and_enemy_walk() {
        let library = AnimationLibrary::new();
        assert_eq!(library.player(PlayerState::Idle).frame_count, 4);
        assert_eq!(library.player(PlayerState::Walk).frame_count, 6);
        let death = library.player(PlayerState::Death);
        assert_eq!(death.frame_count, 4);
        assert!(!death.looping);
        assert_eq!(library.enemy_walk().frame_count, 8);
        assert_eq!(library.enemy_walk().frame_speed, 10.0);
    }

    #[test]
    fn loaded_file_overrides_only_named_sheets() {
        let path = temp_file_path("override");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "animation_id": "dog",
              "sheets": {
                "walk": { "texture": "custom/walk.png", "frame_count": 8,
                          "frame_width": 32, "frame_height": 32, "frame_speed": 12 }
              }
            }"#,
        )
        .expect("write temp anim file");

        let mut library = AnimationLibrary::new();
        library.load_file(&path).expect("should load");
        assert_eq!(library.player(PlayerState::Walk).texture, "custom/walk.png");
        assert_eq!(library.player(PlayerState::Idle).frame_count, 4);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn broken_files_keep_builtin_sheets() {
        let path = temp_file_path("broken");
        fs::write(&path, "{ not json").expect("write temp anim file");

        let mut library = AnimationLibrary::new();
        library.load_files(&[path.clone(), temp_file_path("missing")]);
        assert_eq!(library.player(PlayerState::Walk).frame_count, 6);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn texture_paths_are_deduplicated() {
        let library = AnimationLibrary::new();
        let paths = library.texture_paths();
        assert_eq!(paths.len(), 6);
        assert!(paths.contains(&"assets/sprites/dog/Walk.png"));
    }
}
