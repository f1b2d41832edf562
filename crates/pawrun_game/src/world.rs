//! The world context: every gameplay entity of the running level plus the
//! tuning it was loaded with. Owned by `Game`, passed by `&mut` to the
//! controllers and by `&` to drawing.

use glam::Vec2;
use pawrun_core::animation::AnimationState;
use pawrun_core::geometry::Rect;

use crate::animation::AnimationLibrary;
use crate::collectible;
use crate::config::{CombatConfig, EnemyConfig, GameConfig, PhysicsConfig, PlayerConfig};
use crate::controller::{self, PlayerInput};
use crate::enemy;
use crate::level::{LevelFile, PlatformKind};
use crate::pool::FixedPool;
use crate::projectile;

pub const MAX_PLATFORMS: usize = 64;
pub const MAX_ENEMIES: usize = 16;
pub const MAX_PROJECTILES: usize = 50;
pub const MAX_COLLECTIBLES: usize = 32;

pub const COLLECTIBLE_SIZE: f32 = 16.0;

/// Gameplay tuning copied out of `GameConfig` when a world is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tuning {
    pub physics: PhysicsConfig,
    pub combat: CombatConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
}

impl Tuning {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            physics: config.physics,
            combat: config.combat,
            player: config.player,
            enemy: config.enemy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Platform {
    pub bounds: Rect,
    pub kind: PlatformKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Enemy {
    /// Feet position.
    pub position: Vec2,
    pub speed: f32,
    /// +1 walking right, -1 walking left.
    pub direction: f32,
    pub size: Vec2,
    pub hitbox: Rect,
    pub active: bool,
    pub animation: AnimationState,
}

impl Enemy {
    pub fn new(position: Vec2, speed: f32, direction: f32, size: Vec2) -> Self {
        let mut enemy = Self {
            position,
            speed,
            direction,
            size,
            hitbox: Rect::default(),
            active: true,
            animation: AnimationState::new(),
        };
        enemy.refresh_hitbox();
        enemy
    }

    pub fn refresh_hitbox(&mut self) {
        self.hitbox = Rect::from_feet(self.position, self.size.x, self.size.y);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Idle,
    Walk,
    Death,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Walk => "walk",
            PlayerState::Death => "death",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Feet position.
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub hitbox: Rect,
    pub on_ground: bool,
    pub lives: u32,
    pub score: u32,
    pub facing_right: bool,
    pub state: PlayerState,
    pub animation: AnimationState,
    pub shoot_cooldown: f32,
}

impl Player {
    pub fn new(spawn: Vec2, size: Vec2, lives: u32) -> Self {
        let mut player = Self {
            position: spawn,
            velocity: Vec2::ZERO,
            size,
            hitbox: Rect::default(),
            on_ground: false,
            lives,
            score: 0,
            facing_right: true,
            state: PlayerState::Idle,
            animation: AnimationState::new(),
            shoot_cooldown: 0.0,
        };
        player.refresh_hitbox();
        player
    }

    pub fn refresh_hitbox(&mut self) {
        self.hitbox = Rect::from_feet(self.position, self.size.x, self.size.y);
    }

    pub fn is_alive(&self) -> bool {
        self.state != PlayerState::Death
    }

    /// Costs one life and puts the player back on `spawn` at rest. The last
    /// life switches to the death state instead of continuing play.
    pub fn lose_life(&mut self, spawn: Vec2) {
        self.lives = self.lives.saturating_sub(1);
        self.position = spawn;
        self.velocity = Vec2::ZERO;
        self.on_ground = false;
        self.refresh_hitbox();
        if self.lives == 0 {
            self.set_state(PlayerState::Death);
            log::debug!("Player died");
        } else {
            log::debug!("Player respawned, {} lives left", self.lives);
        }
    }

    /// Switching state rewinds the play-head; re-entering the same state
    /// keeps it running.
    pub fn set_state(&mut self, state: PlayerState) {
        if self.state != state {
            self.state = state;
            self.animation.reset();
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(24.0, 32.0), 3)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projectile {
    pub bounds: Rect,
    pub velocity_x: f32,
    pub distance_travelled: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Collectible {
    pub position: Vec2,
    pub bounds: Rect,
    pub taken: bool,
}

impl Collectible {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            bounds: Rect::from_center(position, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE),
            taken: false,
        }
    }
}

/// Gameplay events of one fixed step, consumed by the screen layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    pub stomps: u32,
    pub shots_hit: u32,
    pub pickups: u32,
    pub lives_lost: u32,
    pub reached_goal: bool,
}

#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub level_id: String,
    pub level_name: String,
    pub spawn: Vec2,
    pub goal: Rect,
    pub platforms: FixedPool<Platform, MAX_PLATFORMS>,
    pub enemies: FixedPool<Enemy, MAX_ENEMIES>,
    pub projectiles: FixedPool<Projectile, MAX_PROJECTILES>,
    pub collectibles: FixedPool<Collectible, MAX_COLLECTIBLES>,
    pub player: Player,
    pub game_over: bool,
    pub level_complete: bool,
}

impl World {
    pub fn new(tuning: Tuning) -> Self {
        let player_size = Vec2::new(tuning.player.hitbox_width, tuning.player.hitbox_height);
        Self {
            tuning,
            level_id: String::new(),
            level_name: String::new(),
            spawn: Vec2::ZERO,
            goal: Rect::default(),
            platforms: FixedPool::new(),
            enemies: FixedPool::new(),
            projectiles: FixedPool::new(),
            collectibles: FixedPool::new(),
            player: Player::new(Vec2::ZERO, player_size, tuning.player.lives),
            game_over: false,
            level_complete: false,
        }
    }

    #[cfg(test)]
    pub fn from_level(tuning: Tuning, level: &LevelFile) -> Result<Self, String> {
        let mut world = Self::new(tuning);
        world.reset_level(level)?;
        Ok(world)
    }

    /// Repopulate every pool from `level` and reset the player to a fresh
    /// start (full lives, zero score).
    pub fn reset_level(&mut self, level: &LevelFile) -> Result<(), String> {
        self.platforms.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.collectibles.clear();

        for def in &level.platforms {
            self.platforms
                .push(Platform {
                    bounds: def.bounds(),
                    kind: def.kind,
                })
                .map_err(|e| format!("Level '{}' platforms: {e}", level.level_id))?;
        }

        let enemy_size = Vec2::new(
            self.tuning.enemy.hitbox_width,
            self.tuning.enemy.hitbox_height,
        );
        for def in &level.enemies {
            let speed = def.speed.unwrap_or(self.tuning.enemy.speed);
            let enemy = Enemy::new(
                Vec2::new(def.x, def.y),
                speed,
                f32::from(def.direction.signum()),
                enemy_size,
            );
            self.enemies
                .push(enemy)
                .map_err(|e| format!("Level '{}' enemies: {e}", level.level_id))?;
        }

        for point in &level.collectibles {
            self.collectibles
                .push(Collectible::new(point.to_vec2()))
                .map_err(|e| format!("Level '{}' collectibles: {e}", level.level_id))?;
        }

        self.level_id = level.level_id.clone();
        self.level_name = level.display_name().to_string();
        self.spawn = level.spawn.to_vec2();
        self.goal = level.goal;
        let player_size = Vec2::new(
            self.tuning.player.hitbox_width,
            self.tuning.player.hitbox_height,
        );
        self.player = Player::new(self.spawn, player_size, self.tuning.player.lives);
        self.game_over = false;
        self.level_complete = false;

        log::info!(
            "Level '{}' ready: {} platforms, {} enemies, {} collectibles",
            self.level_id,
            self.platforms.len(),
            self.enemies.len(),
            self.collectibles.len()
        );
        Ok(())
    }

    /// One gameplay step in the fixed order: player, enemies, collectibles,
    /// projectiles, goal.
    pub fn step(
        &mut self,
        input: PlayerInput,
        animations: &AnimationLibrary,
        dt: f32,
    ) -> StepEvents {
        let mut events = StepEvents::default();
        if self.game_over || self.level_complete {
            return events;
        }

        let lives_before = self.player.lives;

        let shot = controller::step_player(
            &mut self.player,
            input,
            self.platforms.as_slice(),
            self.spawn,
            &self.tuning,
            animations,
            dt,
        );
        if let Some(shot) = shot {
            projectile::spawn_projectile(&mut self.projectiles, shot, &self.tuning.combat);
        }

        events.stomps = enemy::update_enemies(
            self.enemies.as_mut_slice(),
            self.platforms.as_slice(),
            &mut self.player,
            self.spawn,
            &self.tuning,
            animations.enemy_walk(),
            dt,
        );

        if self.player.is_alive() {
            events.pickups = collectible::collect(
                self.collectibles.as_mut_slice(),
                &mut self.player,
                self.tuning.combat.collectible_score,
            );
        }

        events.shots_hit = projectile::update_projectiles(
            self.projectiles.as_mut_slice(),
            self.enemies.as_mut_slice(),
            &mut self.player.score,
            &self.tuning.combat,
            dt,
        );

        if self.player.is_alive() && self.player.hitbox.overlaps(&self.goal) {
            log::info!("Level '{}' complete", self.level_id);
            self.level_complete = true;
            events.reached_goal = true;
        }

        let death_sheet = animations.player(PlayerState::Death);
        if !self.player.is_alive() && self.player.animation.is_finished(death_sheet) {
            log::info!("Game over with score {}", self.player.score);
            self.game_over = true;
        }

        events.lives_lost = lives_before.saturating_sub(self.player.lives);
        events
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn active_projectile_count(&self) -> usize {
        self.projectiles.iter().filter(|p| p.active).count()
    }
}
