//! Builds the frame's `DrawList` from the game state: world sprites through
//! the camera, screen-space shades and HUD text for menus and gameplay.

use pawrun_core::animation::{AnimationState, SpriteSheet};
use pawrun_core::geometry::Rect;
use pawrun_render::{colors, Camera2D, Color, CommandBuffer, DrawList};

use crate::animation::AnimationLibrary;
use crate::game::Game;
use crate::level::PlatformKind;
use crate::screen::Screen;
use crate::world::World;

const TITLE_SIZE: f32 = 56.0;
const HEADING_SIZE: f32 = 40.0;
const ITEM_SIZE: f32 = 28.0;
const BODY_SIZE: f32 = 22.0;
const HUD_SIZE: f32 = 22.0;
const GRASS_HEIGHT: f32 = 4.0;

const CONTROLS_LINES: [&str; 6] = [
    "Move: A / D, Left / Right, left stick or d-pad",
    "Jump: Space, W, Up or gamepad A",
    "Shoot: J, X or gamepad X",
    "Pause: Escape, P or Start",
    "Stomp mushrooms from above, avoid touching their sides",
    "Reach the flag to finish the level",
];

const CREDITS_LINES: [&str; 4] = [
    "PawRun",
    "Code: the PawRun developers",
    "Dog and mushroom sprite sheets: their respective artists",
    "Built with winit, wgpu, egui and kira",
];

pub fn build_draw_list(game: &Game, camera: &Camera2D) -> DrawList {
    let (width, height) = camera.viewport;
    match game.screen {
        Screen::Title => {
            let mut list = DrawList::new(colors::DARK_GRAY);
            list.text_centered("PawRun", width * 0.5, height * 0.18, TITLE_SIZE, colors::YELLOW);
            draw_menu(&mut list, game, width * 0.5, height * 0.42);
            list.text_centered(
                "Up / Down to choose, Enter to select",
                width * 0.5,
                height * 0.85,
                BODY_SIZE,
                colors::GRAY,
            );
            list
        }
        Screen::Controls => text_page(width, height, "Controls", &CONTROLS_LINES),
        Screen::Credits => text_page(width, height, "Credits", &CREDITS_LINES),
        Screen::Gameplay => {
            let mut list = DrawList::new(colors::SKY);
            draw_world(&mut list.world, &game.world, &game.animations, camera, game.show_hitboxes);
            draw_hud(&mut list, &game.world);
            list
        }
        Screen::Paused => {
            let mut list = DrawList::new(colors::SKY);
            draw_world(&mut list.world, &game.world, &game.animations, camera, game.show_hitboxes);
            draw_hud(&mut list, &game.world);
            list.screen.fill_rect(Rect::new(0.0, 0.0, width, height), colors::SHADE);
            list.text_centered("Paused", width * 0.5, height * 0.25, HEADING_SIZE, colors::WHITE);
            draw_menu(&mut list, game, width * 0.5, height * 0.42);
            list
        }
        Screen::GameOver | Screen::Victory => {
            let mut list = DrawList::new(colors::SKY);
            draw_world(&mut list.world, &game.world, &game.animations, camera, false);
            list.screen.fill_rect(Rect::new(0.0, 0.0, width, height), colors::SHADE);
            let (heading, color) = if game.screen == Screen::Victory {
                ("You Win!", colors::YELLOW)
            } else {
                ("Game Over", colors::RED)
            };
            list.text_centered(heading, width * 0.5, height * 0.3, TITLE_SIZE, color);
            list.text_centered(
                format!("Final score: {}", game.world.player.score),
                width * 0.5,
                height * 0.48,
                ITEM_SIZE,
                colors::WHITE,
            );
            list.text_centered(
                "Press Enter to return to the title",
                width * 0.5,
                height * 0.62,
                BODY_SIZE,
                colors::GRAY,
            );
            list
        }
    }
}

fn text_page(width: f32, height: f32, heading: &str, lines: &[&str]) -> DrawList {
    let mut list = DrawList::new(colors::DARK_GRAY);
    list.text_centered(heading, width * 0.5, height * 0.12, HEADING_SIZE, colors::YELLOW);
    for (i, line) in lines.iter().enumerate() {
        list.text_centered(
            *line,
            width * 0.5,
            height * 0.28 + i as f32 * BODY_SIZE * 1.8,
            BODY_SIZE,
            colors::WHITE,
        );
    }
    list.text_centered(
        "Press Escape to go back",
        width * 0.5,
        height * 0.88,
        BODY_SIZE,
        colors::GRAY,
    );
    list
}

fn draw_menu(list: &mut DrawList, game: &Game, center_x: f32, top: f32) {
    for (i, item) in game.screen.menu_items().iter().enumerate() {
        let selected = i == game.menu.selected;
        let (label, color) = if selected {
            (format!("> {item} <"), colors::YELLOW)
        } else {
            (item.to_string(), colors::WHITE)
        };
        list.text_centered(label, center_x, top + i as f32 * ITEM_SIZE * 1.6, ITEM_SIZE, color);
    }
}

fn draw_hud(list: &mut DrawList, world: &World) {
    let player = &world.player;
    list.text(format!("Score: {}", player.score), 16.0, 12.0, HUD_SIZE, colors::WHITE);
    list.text(format!("Lives: {}", player.lives), 16.0, 40.0, HUD_SIZE, colors::WHITE);
    list.text(world.level_name.clone(), 16.0, 68.0, HUD_SIZE, colors::DARK_GRAY);
}

/// World-space commands for everything visible through `camera`.
pub fn draw_world(
    buf: &mut CommandBuffer,
    world: &World,
    animations: &AnimationLibrary,
    camera: &Camera2D,
    show_hitboxes: bool,
) {
    let view = camera.visible_rect();

    for platform in world.platforms.iter().filter(|p| p.bounds.overlaps(&view)) {
        let bounds = platform.bounds;
        let (body, top) = platform_colors(platform.kind);
        buf.fill_rect(bounds, body);
        buf.fill_rect(
            Rect::new(bounds.x, bounds.y, bounds.width, GRASS_HEIGHT.min(bounds.height)),
            top,
        );
    }

    if world.goal.overlaps(&view) {
        let goal = world.goal;
        buf.fill_rect(Rect::new(goal.x, goal.y, 4.0, goal.height), colors::GRAY);
        buf.fill_rect(Rect::new(goal.x + 4.0, goal.y, goal.width - 4.0, 14.0), colors::GREEN);
    }

    for item in world.collectibles.iter().filter(|c| !c.taken && c.bounds.overlaps(&view)) {
        buf.fill_rect(item.bounds, colors::YELLOW);
    }

    let enemy_sheet = animations.enemy_walk();
    for enemy in world.enemies.iter().filter(|e| e.active && e.hitbox.overlaps(&view)) {
        draw_animated(
            buf,
            enemy_sheet,
            &enemy.animation,
            enemy.position,
            enemy.direction < 0.0,
            colors::RED,
        );
    }

    for projectile in world.projectiles.iter().filter(|p| p.active) {
        buf.fill_rect(projectile.bounds, colors::ORANGE);
    }

    let player = &world.player;
    draw_animated(
        buf,
        animations.player(player.state),
        &player.animation,
        player.position,
        !player.facing_right,
        colors::GREEN,
    );

    if show_hitboxes {
        for platform in world.platforms.iter() {
            buf.outline_rect(platform.bounds, 1.0, colors::WHITE);
        }
        for enemy in world.enemies.iter().filter(|e| e.active) {
            buf.outline_rect(enemy.hitbox, 1.0, colors::RED);
        }
        for item in world.collectibles.iter().filter(|c| !c.taken) {
            buf.outline_rect(item.bounds, 1.0, colors::YELLOW);
        }
        buf.outline_rect(world.goal, 1.0, colors::GREEN);
        buf.outline_rect(player.hitbox, 1.0, colors::BLACK);
    }
}

/// Current frame of `sheet`, bottom-centred on `feet`.
fn draw_animated(
    buf: &mut CommandBuffer,
    sheet: &SpriteSheet,
    animation: &AnimationState,
    feet: glam::Vec2,
    flip_x: bool,
    fallback: Color,
) {
    let source = sheet.source_rect(animation.current_frame);
    let dest = Rect::from_feet(feet, sheet.frame_width, sheet.frame_height);
    buf.sprite(&sheet.texture, source, dest, flip_x, fallback);
}

fn platform_colors(kind: PlatformKind) -> (Color, Color) {
    match kind {
        PlatformKind::Ground => (colors::BROWN, colors::DARK_GREEN),
        PlatformKind::Floating => (colors::BEIGE, colors::GREEN),
        PlatformKind::Small => (colors::GRAY, colors::GREEN),
    }
}
