use glam::Vec2;
use pawrun_core::input::{InputState, Key, PadButton};

use crate::animation::AnimationLibrary;
use crate::world::{Platform, Player, PlayerState, Tuning};

/// Muzzle point relative to the player's feet, mirrored when facing left.
const MUZZLE_OFFSET: Vec2 = Vec2::new(16.0, -18.0);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// -1..=1, keyboard or left stick.
    pub move_x: f32,
    pub jump_pressed: bool,
    pub shoot_pressed: bool,
}

impl PlayerInput {
    pub fn from_input(input: &InputState) -> Self {
        let pad = &input.gamepad;
        let mut move_x = 0.0;
        if input.any_held(&[Key::Left, Key::A]) || pad.is_held(PadButton::DPadLeft) {
            move_x -= 1.0;
        }
        if input.any_held(&[Key::Right, Key::D]) || pad.is_held(PadButton::DPadRight) {
            move_x += 1.0;
        }
        // Digital input wins over the stick when both are active.
        if move_x == 0.0 && pad.connected {
            move_x = pad.axis_x;
        }

        Self {
            move_x: move_x.clamp(-1.0, 1.0),
            jump_pressed: input.any_just_pressed(&[Key::Space, Key::W, Key::Up])
                || pad.is_just_pressed(PadButton::South),
            shoot_pressed: input.any_just_pressed(&[Key::J, Key::X])
                || pad.is_just_pressed(PadButton::West),
        }
    }
}

/// A projectile request produced by the player this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: Vec2,
    /// +1 right, -1 left.
    pub direction: f32,
}

/// Advance the player one fixed step. Returns the shot fired this step, if any.
pub fn step_player(
    player: &mut Player,
    input: PlayerInput,
    platforms: &[Platform],
    spawn: Vec2,
    tuning: &Tuning,
    animations: &AnimationLibrary,
    dt: f32,
) -> Option<Shot> {
    if !player.is_alive() {
        player
            .animation
            .update(animations.player(PlayerState::Death), dt);
        return None;
    }

    let physics = &tuning.physics;

    player.velocity.x = input.move_x * physics.move_speed;
    if input.move_x > 0.0 {
        player.facing_right = true;
    } else if input.move_x < 0.0 {
        player.facing_right = false;
    }

    // Jump is edge-triggered and only legal from grounded state.
    if input.jump_pressed && player.on_ground {
        player.velocity.y = -physics.jump_speed;
        player.on_ground = false;
    }

    player.velocity.y = (player.velocity.y + physics.gravity * dt).min(physics.max_fall_speed);

    let previous_bottom = player.position.y;
    player.position += player.velocity * dt;
    player.position.x = player.position.x.max(player.size.x * 0.5);
    player.refresh_hitbox();
    resolve_vertical(player, platforms, previous_bottom);

    if player.position.y > physics.fall_limit {
        log::debug!("Player fell out of the world at y={:.1}", player.position.y);
        player.lose_life(spawn);
        if !player.is_alive() {
            return None;
        }
    }

    let state = if player.velocity.x.abs() > 0.0 {
        PlayerState::Walk
    } else {
        PlayerState::Idle
    };
    player.set_state(state);
    player.animation.update(animations.player(player.state), dt);

    player.shoot_cooldown = (player.shoot_cooldown - dt).max(0.0);
    if input.shoot_pressed && player.shoot_cooldown <= 0.0 {
        player.shoot_cooldown = tuning.combat.shoot_cooldown;
        let direction = if player.facing_right { 1.0 } else { -1.0 };
        let origin = player.position + Vec2::new(MUZZLE_OFFSET.x * direction, MUZZLE_OFFSET.y);
        return Some(Shot { origin, direction });
    }
    None
}

/// Land on any platform the player moved into from above. Downward only;
/// with several candidates the last one in storage order wins.
fn resolve_vertical(player: &mut Player, platforms: &[Platform], previous_bottom: f32) {
    player.on_ground = false;
    for platform in platforms {
        if !player.hitbox.overlaps(&platform.bounds) {
            continue;
        }
        if previous_bottom <= platform.bounds.top() && player.velocity.y >= 0.0 {
            player.position.y = platform.bounds.top();
            player.velocity.y = 0.0;
            player.on_ground = true;
            player.refresh_hitbox();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::level::PlatformKind;
    use pawrun_core::geometry::Rect;

    const DT: f32 = 1.0 / 60.0;
    const SPAWN: Vec2 = Vec2::new(120.0, 300.0);

    fn tuning() -> Tuning {
        Tuning::from_config(&GameConfig::default())
    }

    fn ground() -> Vec<Platform> {
        vec![Platform {
            bounds: Rect::new(0.0, 340.0, 2000.0, 60.0),
            kind: PlatformKind::Ground,
        }]
    }

    fn player_at(position: Vec2) -> Player {
        Player::new(position, Vec2::new(24.0, 32.0), 3)
    }

    fn walk_right() -> PlayerInput {
        PlayerInput {
            move_x: 1.0,
            ..PlayerInput::default()
        }
    }

    #[test]
    fn player_falls_and_lands_on_platform_top() {
        let animations = AnimationLibrary::new();
        let mut player = player_at(SPAWN);
        for _ in 0..120 {
            step_player(
                &mut player,
                PlayerInput::default(),
                &ground(),
                SPAWN,
                &tuning(),
                &animations,
                DT,
            );
        }
        assert!(player.on_ground);
        assert_eq!(player.position.y, 340.0);
        assert_eq!(player.velocity.y, 0.0);
        assert_eq!(player.hitbox.bottom(), 340.0);
    }

    #[test]
    fn jump_only_activates_when_grounded() {
        let animations = AnimationLibrary::new();
        let jump = PlayerInput {
            jump_pressed: true,
            ..PlayerInput::default()
        };

        let mut airborne = player_at(Vec2::new(120.0, 100.0));
        step_player(&mut airborne, jump, &ground(), SPAWN, &tuning(), &animations, DT);
        assert!(airborne.velocity.y > 0.0, "no jump while airborne");

        let mut grounded = player_at(Vec2::new(120.0, 340.0));
        grounded.on_ground = true;
        step_player(&mut grounded, jump, &ground(), SPAWN, &tuning(), &animations, DT);
        assert!(grounded.velocity.y < 0.0);
        assert!(!grounded.on_ground);
    }

    #[test]
    fn fall_past_limit_costs_one_life_and_respawns() {
        let animations = AnimationLibrary::new();
        let mut player = player_at(Vec2::new(500.0, 1401.0));
        player.velocity = Vec2::new(0.0, 800.0);
        step_player(&mut player, PlayerInput::default(), &[], SPAWN, &tuning(), &animations, DT);

        assert_eq!(player.lives, 2);
        assert_eq!(player.position, SPAWN);
        assert_eq!(player.velocity, Vec2::ZERO);
        assert_eq!(player.hitbox, Rect::from_feet(SPAWN, 24.0, 32.0));
    }

    #[test]
    fn respawned_player_does_not_keep_fall_speed() {
        let animations = AnimationLibrary::new();
        let tuning = tuning();
        let mut player = player_at(Vec2::new(500.0, 1401.0));
        player.velocity = Vec2::new(0.0, 900.0);
        step_player(
            &mut player,
            PlayerInput::default(),
            &ground(),
            SPAWN,
            &tuning,
            &animations,
            DT,
        );
        step_player(
            &mut player,
            PlayerInput::default(),
            &ground(),
            SPAWN,
            &tuning,
            &animations,
            DT,
        );

        // Starts falling from rest at the spawn point.
        assert_eq!(player.velocity.y, tuning.physics.gravity * DT);
        assert!(player.position.y < SPAWN.y + 1.0);
        assert_eq!(player.lives, 2);
    }

    #[test]
    fn walking_one_second_without_gravity_covers_move_speed() {
        let animations = AnimationLibrary::new();
        let mut tuning = tuning();
        tuning.physics.gravity = 0.0;
        let mut player = player_at(SPAWN);
        for _ in 0..60 {
            step_player(&mut player, walk_right(), &[], SPAWN, &tuning, &animations, DT);
        }
        assert!((player.position.x - 360.0).abs() < 1e-3);
        assert_eq!(player.position.y, 300.0);
        assert_eq!(player.state, PlayerState::Walk);
    }

    #[test]
    fn facing_follows_input_and_holds_when_idle() {
        let animations = AnimationLibrary::new();
        let mut player = player_at(Vec2::new(300.0, 340.0));
        let left = PlayerInput {
            move_x: -1.0,
            ..PlayerInput::default()
        };
        step_player(&mut player, left, &ground(), SPAWN, &tuning(), &animations, DT);
        assert!(!player.facing_right);
        step_player(
            &mut player,
            PlayerInput::default(),
            &ground(),
            SPAWN,
            &tuning(),
            &animations,
            DT,
        );
        assert!(!player.facing_right);
        assert_eq!(player.state, PlayerState::Idle);
    }

    #[test]
    fn player_cannot_walk_off_left_edge() {
        let animations = AnimationLibrary::new();
        let mut player = player_at(Vec2::new(13.0, 340.0));
        let left = PlayerInput {
            move_x: -1.0,
            ..PlayerInput::default()
        };
        for _ in 0..30 {
            step_player(&mut player, left, &ground(), SPAWN, &tuning(), &animations, DT);
        }
        assert_eq!(player.position.x, 12.0);
    }

    #[test]
    fn shooting_respects_cooldown_and_facing() {
        let animations = AnimationLibrary::new();
        let mut player = player_at(Vec2::new(300.0, 340.0));
        player.facing_right = false;
        let shoot = PlayerInput {
            shoot_pressed: true,
            ..PlayerInput::default()
        };

        let shot = step_player(&mut player, shoot, &ground(), SPAWN, &tuning(), &animations, DT)
            .expect("first shot fires");
        assert_eq!(shot.direction, -1.0);
        assert_eq!(shot.origin.x, 284.0);

        let blocked = step_player(&mut player, shoot, &ground(), SPAWN, &tuning(), &animations, DT);
        assert!(blocked.is_none(), "cooldown blocks the second shot");

        for _ in 0..20 {
            step_player(
                &mut player,
                PlayerInput::default(),
                &ground(),
                SPAWN,
                &tuning(),
                &animations,
                DT,
            );
        }
        let shot = step_player(&mut player, shoot, &ground(), SPAWN, &tuning(), &animations, DT);
        assert!(shot.is_some());
    }

    #[test]
    fn dead_player_ignores_input() {
        let animations = AnimationLibrary::new();
        let mut player = player_at(SPAWN);
        player.lives = 1;
        player.lose_life(SPAWN);
        step_player(&mut player, walk_right(), &ground(), SPAWN, &tuning(), &animations, DT);
        assert_eq!(player.position, SPAWN);
        assert_eq!(player.state, PlayerState::Death);
    }

    #[test]
    fn input_mapping_prefers_keys_over_stick() {
        let mut input = InputState::new();
        input.set_gamepad(true, -0.6, &[]);
        assert_eq!(PlayerInput::from_input(&input).move_x, -0.6);

        input.key_down(Key::D);
        input.key_down(Key::Space);
        let mapped = PlayerInput::from_input(&input);
        assert_eq!(mapped.move_x, 1.0);
        assert!(mapped.jump_pressed);
        assert!(!mapped.shoot_pressed);
    }
}
