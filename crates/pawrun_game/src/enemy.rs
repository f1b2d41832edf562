//! Enemy patrol and platform adherence.
//!
//! Enemies are kinematic walkers: no gravity, constant speed, and a turn
//! decision each step. An enemy standing on a platform is snapped to its top
//! and turns before its projected position comes within `EDGE_MARGIN` of
//! either edge, or when its projected hitbox touches the 2 px sensor just past
//! the leading edge. An enemy with no support turns unless a platform lies under its
//! next position.

use glam::Vec2;
use pawrun_core::animation::SpriteSheet;
use pawrun_core::geometry::Rect;

use crate::world::{Enemy, Platform, Player, Tuning};

pub const EDGE_MARGIN: f32 = 6.0;
const WALL_SENSOR_WIDTH: f32 = 2.0;

/// Vertical offset `enemy.y - platform.top` accepted as standing on it.
const SUPPORT_BAND: (f32, f32) = (-8.0, 48.0);
/// Wider band used when looking for a platform to walk onto.
const LANDING_BAND: (f32, f32) = (-16.0, 48.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Player landed on the enemy fast enough to kill it.
    Stomp,
    /// Player touched the enemy any other way and lost a life.
    Damage,
}

/// First platform, in storage order, under `position` within the support band.
pub fn supporting_platform(position: Vec2, platforms: &[Platform]) -> Option<&Platform> {
    platforms.iter().find(|p| stands_on(&p.bounds, position))
}

/// Whether feet at `position` count as standing on `bounds`.
pub fn stands_on(bounds: &Rect, position: Vec2) -> bool {
    bounds.spans_x(position.x) && in_band(position.y - bounds.top(), SUPPORT_BAND)
}

/// Move one enemy one step, turning around where the walk must not continue.
pub fn patrol(enemy: &mut Enemy, platforms: &[Platform], dt: f32) {
    let next_x = enemy.position.x + enemy.speed * enemy.direction * dt;

    let reverse = match supporting_platform(enemy.position, platforms) {
        Some(platform) => {
            let bounds = platform.bounds;
            enemy.position.y = bounds.top();
            within_edge_margin(&bounds, next_x) || touches_wall_sensor(enemy, &bounds, next_x)
        }
        None => !platforms.iter().any(|p| {
            p.bounds.spans_x(next_x) && in_band(enemy.position.y - p.bounds.top(), LANDING_BAND)
        }),
    };

    if reverse {
        enemy.direction = -enemy.direction;
        enemy.position.x += enemy.speed * enemy.direction * dt;
    } else {
        enemy.position.x = next_x;
    }
    enemy.refresh_hitbox();
}

/// Resolve a touch between one enemy and the player. The player's hitbox is
/// refreshed on damage so later enemies in the same step test the respawned box.
pub fn resolve_player_contact(
    enemy: &mut Enemy,
    player: &mut Player,
    spawn: Vec2,
    tuning: &Tuning,
) -> Contact {
    if !enemy.active || !player.is_alive() || !enemy.hitbox.overlaps(&player.hitbox) {
        return Contact::None;
    }

    let combat = &tuning.combat;
    if player.velocity.y > combat.stomp_threshold {
        enemy.active = false;
        player.velocity.y = -combat.stomp_bounce_factor * tuning.physics.jump_speed;
        player.score += combat.stomp_score;
        log::debug!(
            "Stomped enemy at ({:.1}, {:.1})",
            enemy.position.x,
            enemy.position.y
        );
        Contact::Stomp
    } else {
        player.lose_life(spawn);
        Contact::Damage
    }
}

/// Patrol every active enemy, resolve its contact with the player and
/// advance its walk animation. Returns the number of stomps.
pub fn update_enemies(
    enemies: &mut [Enemy],
    platforms: &[Platform],
    player: &mut Player,
    spawn: Vec2,
    tuning: &Tuning,
    walk_sheet: &SpriteSheet,
    dt: f32,
) -> u32 {
    let mut stomps = 0;
    for enemy in enemies.iter_mut().filter(|e| e.active) {
        patrol(enemy, platforms, dt);
        if resolve_player_contact(enemy, player, spawn, tuning) == Contact::Stomp {
            stomps += 1;
            continue;
        }
        enemy.animation.update(walk_sheet, dt);
    }
    stomps
}

fn in_band(offset: f32, (low, high): (f32, f32)) -> bool {
    offset >= low && offset <= high
}

fn within_edge_margin(bounds: &Rect, next_x: f32) -> bool {
    next_x < bounds.left() + EDGE_MARGIN || next_x > bounds.right() - EDGE_MARGIN
}

/// The sensor sits past the edge in the direction of travel only, so an
/// enemy never flips twice at one wall.
fn touches_wall_sensor(enemy: &Enemy, bounds: &Rect, next_x: f32) -> bool {
    let h = enemy.size.y;
    let sensor = if enemy.direction > 0.0 {
        Rect::new(bounds.right(), bounds.top() - h, WALL_SENSOR_WIDTH, h - 1.0)
    } else {
        Rect::new(
            bounds.left() - WALL_SENSOR_WIDTH,
            bounds.top() - h,
            WALL_SENSOR_WIDTH,
            h - 1.0,
        )
    };
    let projected = Rect::from_feet(Vec2::new(next_x, enemy.position.y), enemy.size.x, h);
    projected.overlaps(&sensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::level::PlatformKind;
    use pawrun_core::animation::AnimationState;

    const DT: f32 = 1.0 / 60.0;
    const SPAWN: Vec2 = Vec2::new(120.0, 300.0);

    fn platform(x: f32, y: f32, width: f32) -> Platform {
        Platform {
            bounds: Rect::new(x, y, width, 20.0),
            kind: PlatformKind::Floating,
        }
    }

    fn enemy_at(x: f32, y: f32, direction: f32) -> Enemy {
        Enemy::new(Vec2::new(x, y), 60.0, direction, Vec2::new(20.0, 24.0))
    }

    fn tuning() -> Tuning {
        Tuning::from_config(&GameConfig::default())
    }

    #[test]
    fn patrol_stays_inside_edge_margins() {
        let platforms = [platform(100.0, 340.0, 200.0)];
        for &(start_x, dir) in &[(150.0, 1.0), (250.0, -1.0), (200.0, 1.0)] {
            let mut enemy = enemy_at(start_x, 340.0, dir);
            let mut turns = 0;
            let mut last_dir = enemy.direction;
            for _ in 0..2000 {
                patrol(&mut enemy, &platforms, DT);
                assert!(
                    enemy.position.x >= 106.0 && enemy.position.x <= 294.0,
                    "enemy left its platform: x={}",
                    enemy.position.x
                );
                if enemy.direction != last_dir {
                    turns += 1;
                    last_dir = enemy.direction;
                }
            }
            assert!(turns >= 4, "enemy should keep patrolling back and forth");
        }
    }

    #[test]
    fn supported_enemy_snaps_to_platform_top() {
        let platforms = [platform(0.0, 340.0, 400.0)];
        let mut enemy = enemy_at(200.0, 334.0, 1.0);
        patrol(&mut enemy, &platforms, DT);
        assert_eq!(enemy.position.y, 340.0);
        assert_eq!(enemy.hitbox.bottom(), 340.0);
        assert_eq!(enemy.direction, 1.0);
        assert!((enemy.position.x - 201.0).abs() < 1e-4);
    }

    #[test]
    fn reverse_steps_in_new_direction() {
        let platforms = [platform(0.0, 340.0, 200.0)];
        let mut enemy = enemy_at(189.5, 340.0, 1.0);
        patrol(&mut enemy, &platforms, DT);
        assert_eq!(enemy.direction, -1.0);
        assert!((enemy.position.x - 188.5).abs() < 1e-4);
    }

    #[test]
    fn unsupported_enemy_without_landing_reverses() {
        let platforms = [platform(0.0, 340.0, 100.0)];
        let mut enemy = enemy_at(500.0, 340.0, 1.0);
        patrol(&mut enemy, &platforms, DT);
        assert_eq!(enemy.direction, -1.0);
        assert!((enemy.position.x - 499.0).abs() < 1e-4);
    }

    #[test]
    fn unsupported_enemy_walks_onto_platform_ahead() {
        let platforms = [platform(100.0, 350.0, 100.0)];
        let mut enemy = enemy_at(99.5, 336.0, 1.0);
        patrol(&mut enemy, &platforms, DT);
        assert_eq!(enemy.direction, 1.0);
        assert!((enemy.position.x - 100.5).abs() < 1e-4);
    }

    #[test]
    fn first_platform_in_storage_order_supports() {
        let platforms = [platform(0.0, 340.0, 400.0), platform(0.0, 330.0, 400.0)];
        let enemy = enemy_at(200.0, 335.0, 1.0);
        let support = supporting_platform(enemy.position, &platforms).expect("supported");
        assert_eq!(support.bounds.top(), 340.0);
    }

    #[test]
    fn projected_step_into_trailing_margin_reverses() {
        let platforms = [platform(100.0, 340.0, 200.0)];
        let mut enemy = enemy_at(103.0, 340.0, 1.0);
        patrol(&mut enemy, &platforms, DT);
        assert_eq!(enemy.direction, -1.0);
        assert!((enemy.position.x - 102.0).abs() < 1e-4);
    }

    #[test]
    fn narrow_enemy_turns_exactly_at_edge_margin() {
        // A 4 px hitbox only reaches the wall sensor 2 px from the edge, so
        // the margin decides the turn. Step is exactly 1 px.
        const STEP_DT: f32 = 1.0 / 64.0;
        let platforms = [platform(100.0, 340.0, 200.0)];

        let mut right = Enemy::new(Vec2::new(293.0, 340.0), 64.0, 1.0, Vec2::new(4.0, 24.0));
        patrol(&mut right, &platforms, STEP_DT);
        assert_eq!(right.direction, 1.0);
        assert_eq!(right.position.x, 294.0);
        patrol(&mut right, &platforms, STEP_DT);
        assert_eq!(right.direction, -1.0);
        assert_eq!(right.position.x, 293.0);

        let mut left = Enemy::new(Vec2::new(107.0, 340.0), 64.0, -1.0, Vec2::new(4.0, 24.0));
        patrol(&mut left, &platforms, STEP_DT);
        assert_eq!(left.direction, -1.0);
        assert_eq!(left.position.x, 106.0);
        patrol(&mut left, &platforms, STEP_DT);
        assert_eq!(left.direction, 1.0);
        assert_eq!(left.position.x, 107.0);
    }

    #[test]
    fn fast_falling_player_stomps_enemy() {
        let tuning = tuning();
        let mut enemy = enemy_at(300.0, 340.0, 1.0);
        let mut player = Player::new(Vec2::new(300.0, 320.0), Vec2::new(24.0, 32.0), 3);
        player.velocity.y = 250.0;

        let contact = resolve_player_contact(&mut enemy, &mut player, SPAWN, &tuning);
        assert_eq!(contact, Contact::Stomp);
        assert!(!enemy.active);
        assert_eq!(player.lives, 3);
        assert_eq!(player.score, 100);
        assert!((player.velocity.y + 0.4 * 560.0).abs() < 1e-4);
    }

    #[test]
    fn slow_touch_damages_player_and_keeps_enemy() {
        let tuning = tuning();
        let mut enemy = enemy_at(300.0, 340.0, 1.0);
        let mut player = Player::new(Vec2::new(300.0, 320.0), Vec2::new(24.0, 32.0), 3);
        player.velocity = Vec2::new(240.0, 200.0);

        let contact = resolve_player_contact(&mut enemy, &mut player, SPAWN, &tuning);
        assert_eq!(contact, Contact::Damage);
        assert!(enemy.active);
        assert_eq!(player.lives, 2);
        assert_eq!(player.position, SPAWN);
        assert_eq!(player.velocity, Vec2::ZERO);
        assert_eq!(player.hitbox, Rect::from_feet(SPAWN, 24.0, 32.0));
    }

    #[test]
    fn respawned_player_is_not_hit_twice_in_one_step() {
        let tuning = tuning();
        let platforms = [platform(0.0, 340.0, 1000.0)];
        let mut enemies = [enemy_at(600.0, 340.0, 1.0), enemy_at(605.0, 340.0, -1.0)];
        let mut player = Player::new(Vec2::new(602.0, 340.0), Vec2::new(24.0, 32.0), 3);
        let sheet = crate::animation::AnimationLibrary::new().enemy_walk().clone();

        update_enemies(&mut enemies, &platforms, &mut player, SPAWN, &tuning, &sheet, DT);
        assert_eq!(player.lives, 2);
        assert!(enemies.iter().all(|e| e.active));
    }

    #[test]
    fn inactive_enemies_are_frozen() {
        let tuning = tuning();
        let platforms = [platform(0.0, 340.0, 1000.0)];
        let mut enemies = [enemy_at(600.0, 340.0, 1.0)];
        enemies[0].active = false;
        let before = enemies[0];
        let mut player = Player::new(SPAWN, Vec2::new(24.0, 32.0), 3);
        let sheet = crate::animation::AnimationLibrary::new().enemy_walk().clone();

        update_enemies(&mut enemies, &platforms, &mut player, SPAWN, &tuning, &sheet, DT);
        assert_eq!(enemies[0], before);
        assert_eq!(enemies[0].animation, AnimationState::new());
    }
}
