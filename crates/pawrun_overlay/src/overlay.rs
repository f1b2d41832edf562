//! egui overlay rendered on top of the game: menu/HUD text every frame and
//! a debug window toggled with F3.
//!
//! egui needs a three-phase render split because
//! `egui_wgpu::Renderer::render()` wants a `RenderPass<'static>` while
//! `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic and paint text, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references

use pawrun_core::time::TimeState;
use pawrun_render::{Color, TextAlign, TextCmd};
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub quad_count: u32,
    pub screen_label: String,
    pub level_label: String,
    pub active_enemies: u32,
    pub active_projectiles: u32,
    pub player_position: (f32, f32),
    pub player_velocity: (f32, f32),
    pub on_ground: bool,
    pub gamepad_connected: bool,
    pub show_hitboxes: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_hitboxes: bool,
    /// Freeze or resume the simulation without leaving gameplay.
    pub toggle_freeze: bool,
    /// Advance one fixed step while frozen.
    pub single_step: bool,
}

pub struct Overlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl Overlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        texts: &[TextCmd],
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_texts(ctx, texts);
            if debug_visible {
                debug_window(ctx, time, stats, &mut actions);
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_texts(ctx: &egui::Context, texts: &[TextCmd]) {
    if texts.is_empty() {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("game_text"),
    ));
    for text in texts {
        let anchor = match text.align {
            TextAlign::Left => egui::Align2::LEFT_TOP,
            TextAlign::Center => egui::Align2::CENTER_TOP,
        };
        painter.text(
            egui::pos2(text.x, text.y),
            anchor,
            &text.text,
            egui::FontId::proportional(text.size),
            to_color32(text.color),
        );
    }
}

fn debug_window(
    ctx: &egui::Context,
    time: &TimeState,
    stats: &OverlayStats,
    actions: &mut OverlayActions,
) {
    egui::Window::new("Debug")
        .default_pos([10.0, 60.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
            ui.label(format!("Steps this frame: {}", time.steps_this_frame));
            ui.label(format!("Total steps: {}", time.fixed_step_count));

            ui.separator();
            ui.label(format!("Screen: {}", stats.screen_label));
            ui.label(format!("Level: {}", stats.level_label));
            ui.label(format!(
                "Player: ({:.1}, {:.1}) v=({:.1}, {:.1}) {}",
                stats.player_position.0,
                stats.player_position.1,
                stats.player_velocity.0,
                stats.player_velocity.1,
                if stats.on_ground { "grounded" } else { "airborne" }
            ));
            ui.label(format!("Enemies: {}", stats.active_enemies));
            ui.label(format!("Projectiles: {}", stats.active_projectiles));
            ui.label(format!(
                "Gamepad: {}",
                if stats.gamepad_connected { "connected" } else { "none" }
            ));

            ui.separator();
            ui.label(format!("Draw calls: {}", stats.draw_calls));
            ui.label(format!("Texture binds: {}", stats.texture_binds));
            ui.label(format!("Quads: {}", stats.quad_count));

            ui.separator();
            ui.horizontal(|ui| {
                let hitbox_label = if stats.show_hitboxes {
                    "Hide hitboxes"
                } else {
                    "Show hitboxes"
                };
                if ui.button(hitbox_label).clicked() {
                    actions.toggle_hitboxes = true;
                }
                let freeze_label = if stats.paused { "Resume" } else { "Freeze" };
                if ui.button(freeze_label).clicked() {
                    actions.toggle_freeze = true;
                }
                if stats.paused && ui.button("Step").clicked() {
                    actions.single_step = true;
                }
            });
        });
}

fn to_color32(color: Color) -> egui::Color32 {
    let [r, g, b, a] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_conversion_rounds_channels() {
        let c = to_color32([1.0, 0.5, 0.0, 1.0]);
        assert_eq!(c, egui::Color32::from_rgba_unmultiplied(255, 128, 0, 255));
    }

    #[test]
    fn color_conversion_clamps_out_of_range() {
        let c = to_color32([2.0, -1.0, 0.0, 1.0]);
        assert_eq!(c, egui::Color32::from_rgba_unmultiplied(255, 0, 0, 255));
    }
}
