//! PawRun -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. All simulation runs
//! inside `RedrawRequested` on a fixed timestep:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- one `Game::update` per fixed slice
//!   3. Build the frame's `DrawList` and flatten it into one sprite mesh
//!   4. Draw the world layer, then the screen layer, then composite egui
//!
//! Level files are polled for changes between frames and hot-reloaded.

mod animation;
mod audio;
mod collectible;
mod config;
mod controller;
mod draw;
mod enemy;
mod game;
mod level;
mod pool;
mod projectile;
#[cfg(test)]
mod replay;
mod screen;
mod world;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use audio::MusicPlayer;
use config::{load_config_or_default, GameConfig};
use game::Game;
use pawrun_core::input::{InputState, Key};
use pawrun_core::time::TimeState;
use pawrun_overlay::{Overlay, OverlayStats};
use pawrun_platform::gamepad::GamepadPoller;
use pawrun_platform::window::PlatformConfig;
use pawrun_render::{
    Camera2D, DrawList, GpuContext, Mesh, SpritePipeline, SpriteVertex, Texture,
    WHITE_TEXTURE_KEY,
};
use screen::Screen;

const CONFIG_PATH: &str = "assets/config/game.json";

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    gamepad: GamepadPoller,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    overlay: Overlay,
    game: Game,
    music: MusicPlayer,
    frozen: bool,
    single_step_requested: bool,

    textures: HashMap<String, GpuSpriteTexture>,
    missing_textures: HashSet<String>,

    // The mesh is rebuilt on the CPU each frame and streamed into these
    // buffers. Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    world_camera_buffer: wgpu::Buffer,
    world_camera_bind_group: wgpu::BindGroup,
    screen_camera_buffer: wgpu::Buffer,
    screen_camera_bind_group: wgpu::BindGroup,
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone(), config.window.vsync)?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let overlay = Overlay::new(&gpu.device, gpu.surface_format, &window);

        let scale = window.scale_factor() as f32;
        let camera = Camera2D::new(
            gpu.size.0 as f32 / scale,
            gpu.size.1 as f32 / scale,
            config.window.zoom,
        );

        let world_camera_buffer = create_camera_buffer(&gpu.device, "World Camera Buffer");
        let world_camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &world_camera_buffer);
        let screen_camera_buffer = create_camera_buffer(&gpu.device, "Screen Camera Buffer");
        let screen_camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &screen_camera_buffer);

        let white = Texture::from_rgba8(
            &gpu.device,
            &gpu.queue,
            &[255, 255, 255, 255],
            1,
            1,
            WHITE_TEXTURE_KEY,
        );
        let white_bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &white);
        let mut textures = HashMap::new();
        textures.insert(
            WHITE_TEXTURE_KEY.to_string(),
            GpuSpriteTexture {
                texture: white,
                bind_group: white_bind_group,
            },
        );

        let music = MusicPlayer::new(&config.music);
        let game = Game::new(config);
        log::info!(
            "Game ready: {} level(s), {} animation texture(s)",
            game.level_count(),
            game.animations.texture_paths().len()
        );

        let mesh_vertex_capacity = 1024;
        let mesh_index_capacity = 1536;
        let vertex_buffer = create_vertex_buffer(&gpu.device, mesh_vertex_capacity);
        let index_buffer = create_index_buffer(&gpu.device, mesh_index_capacity);

        Ok(Self {
            window,
            gpu,
            time: TimeState::default(),
            input: InputState::new(),
            gamepad: GamepadPoller::new(),
            camera,
            sprite_pipeline,
            overlay,
            game,
            music,
            frozen: false,
            single_step_requested: false,
            textures,
            missing_textures: HashSet::new(),
            vertex_buffer,
            index_buffer,
            mesh_vertex_capacity,
            mesh_index_capacity,
            world_camera_buffer,
            world_camera_bind_group,
            screen_camera_buffer,
            screen_camera_bind_group,
        })
    }

    /// Upload every texture the draw list needs that is not cached yet.
    /// A texture that fails to load is reported once and then drawn with its
    /// fallback colour.
    fn ensure_textures(&mut self, draw_list: &DrawList) {
        for path in draw_list.texture_paths() {
            if self.textures.contains_key(path) || self.missing_textures.contains(path) {
                continue;
            }
            match load_texture_asset(&self.gpu.device, &self.gpu.queue, &self.sprite_pipeline, path)
            {
                Ok(texture) => {
                    log::info!(
                        "Loaded texture '{}' ({}x{})",
                        path,
                        texture.texture.size.0,
                        texture.texture.size.1
                    );
                    self.textures.insert(path.to_string(), texture);
                }
                Err(err) => {
                    log::warn!("{err}. Drawing fallback colour instead.");
                    self.missing_textures.insert(path.to_string());
                }
            }
        }
    }

    fn build_mesh(&self, draw_list: &DrawList) -> (Mesh, usize) {
        let texture_size = |key: &str| self.textures.get(key).map(|t| t.texture.size);
        let mut mesh = Mesh::new();
        mesh.begin_layer();
        mesh.push_commands(&draw_list.world.commands, texture_size);
        let screen_start = mesh.begin_layer();
        mesh.push_commands(&draw_list.screen.commands, texture_size);
        (mesh, screen_start)
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn overlay_stats(&self, mesh: &Mesh) -> OverlayStats {
        let world = &self.game.world;
        OverlayStats {
            draw_calls: mesh.draw_calls.len() as u32,
            texture_binds: mesh.texture_bind_count() as u32,
            quad_count: mesh.quad_count() as u32,
            screen_label: self.game.screen.label().to_string(),
            level_label: format!(
                "{} ({}/{})",
                world.level_name,
                self.game.level_index + 1,
                self.game.level_count()
            ),
            active_enemies: world.active_enemy_count() as u32,
            active_projectiles: world.active_projectile_count() as u32,
            player_position: (world.player.position.x, world.player.position.y),
            player_velocity: (world.player.velocity.x, world.player.velocity.y),
            on_ground: world.player.on_ground,
            gamepad_connected: self.input.gamepad.connected,
            show_hitboxes: self.game.show_hitboxes,
            paused: self.frozen,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let scale = self.window.scale_factor() as f32;
        self.camera.viewport = (width as f32 / scale, height as f32 / scale);
        self.camera.min_target = self.camera.half_extents();
        log::info!("Resized to {}x{}", width, height);
    }

    /// Simulate, draw and present one frame. Returns `false` once the game
    /// asked to quit.
    fn frame(&mut self) -> bool {
        self.gamepad.poll(&mut self.input);

        self.time.begin_frame();
        while self.time.should_step() {
            // Frozen from the debug overlay; single-step advances one slice.
            if self.frozen && !self.single_step_requested {
                break;
            }
            self.single_step_requested = false;

            let dt = self.time.fixed_dt;
            self.game.update(&self.input, dt);
            if self.game.quit_requested {
                break;
            }
        }

        // Edge-triggered input is cleared only after a fixed step consumed
        // it, otherwise a press landing on a zero-step frame is lost.
        if self.time.steps_this_frame > 0 {
            self.input.end_frame();
        }
        self.game.end_frame();

        if let Some(track) = self.game.take_music_request() {
            self.music.play(track);
        }
        if self.game.quit_requested {
            return false;
        }
        self.game.poll_level_reload();

        if matches!(
            self.game.screen,
            Screen::Gameplay | Screen::Paused | Screen::GameOver | Screen::Victory
        ) {
            self.camera.follow(self.game.world.player.position);
        }

        let draw_list = draw::build_draw_list(&self.game, &self.camera);
        self.ensure_textures(&draw_list);
        let (mesh, screen_start) = self.build_mesh(&draw_list);
        self.render(&draw_list, &mesh, screen_start);
        true
    }

    fn render(&mut self, draw_list: &DrawList, mesh: &Mesh, screen_start: usize) {
        self.ensure_mesh_capacity(mesh.vertices.len(), mesh.indices.len());
        if !mesh.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&mesh.vertices),
            );
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        }
        self.gpu.queue.write_buffer(
            &self.world_camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );
        self.gpu.queue.write_buffer(
            &self.screen_camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.screen_uniform()]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats(mesh);
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.overlay
                .prepare(&self.window, &self.time, &draw_list.texts, &stats);

        if overlay_actions.toggle_hitboxes {
            self.game.toggle_hitboxes();
        }
        if overlay_actions.toggle_freeze {
            self.frozen = !self.frozen;
            log::info!(
                "Simulation {}",
                if self.frozen { "FROZEN" } else { "RUNNING" }
            );
        }
        if overlay_actions.single_step {
            self.single_step_requested = true;
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = draw_list.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            let mut last_bound_texture_key: Option<&str> = None;
            for (i, draw) in mesh.draw_calls.iter().enumerate() {
                if i == 0 {
                    render_pass.set_bind_group(0, &self.world_camera_bind_group, &[]);
                }
                if i == screen_start {
                    render_pass.set_bind_group(0, &self.screen_camera_bind_group, &[]);
                }
                let Some(texture) = self.textures.get(&*draw.texture_key) else {
                    continue;
                };
                if last_bound_texture_key != Some(&*draw.texture_key) {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound_texture_key = Some(&*draw.texture_key);
                }
                render_pass.draw_indexed(
                    draw.index_start..(draw.index_start + draw.index_count),
                    0,
                    0..1,
                );
            }
        }

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    config: GameConfig,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let platform = PlatformConfig {
            title: self.config.window.title.clone(),
            width: self.config.window.width,
            height: self.config.window.height,
        };
        let window = match pawrun_platform::window::create_window(event_loop, &platform) {
            Ok(window) => window,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };
        log::info!("Window created: {}x{}", platform.width, platform.height);

        match EngineState::new(window, self.config.clone()) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Failed to initialize renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if physical_size.width > 0 && physical_size.height > 0 {
                    state.resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if event.state == ElementState::Pressed && !event.repeat {
                        match debug_toggle(key_code) {
                            Some(DebugToggle::Overlay) => state.overlay.toggle_debug(),
                            Some(DebugToggle::Hitboxes) => state.game.toggle_hitboxes(),
                            None => {}
                        }
                    }
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                if !state.frame() {
                    log::info!("Quit selected, exiting.");
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn create_camera_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<pawrun_render::CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn load_texture_asset(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &SpritePipeline,
    asset_path: &str,
) -> Result<GpuSpriteTexture, String> {
    let bytes = std::fs::read(asset_path)
        .map_err(|e| format!("Failed to read texture '{}': {e}", asset_path))?;
    let texture = Texture::from_bytes(device, queue, &bytes, asset_path)?;
    let bind_group = pipeline.create_texture_bind_group(device, &texture);
    Ok(GpuSpriteTexture {
        texture,
        bind_group,
    })
}

/// Debug switches flip once per physical press, outside the fixed-step loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebugToggle {
    Overlay,
    Hitboxes,
}

fn debug_toggle(key_code: KeyCode) -> Option<DebugToggle> {
    match key_code {
        KeyCode::F3 => Some(DebugToggle::Overlay),
        KeyCode::F4 => Some(DebugToggle::Hitboxes),
        _ => None,
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyJ => Some(Key::J),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::KeyX => Some(Key::X),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("PawRun starting...");
    let config = load_config_or_default(Path::new(CONFIG_PATH));

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {e}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_keys_toggle_and_stay_out_of_game_input() {
        assert_eq!(debug_toggle(KeyCode::F3), Some(DebugToggle::Overlay));
        assert_eq!(debug_toggle(KeyCode::F4), Some(DebugToggle::Hitboxes));
        assert_eq!(debug_toggle(KeyCode::KeyR), None);
        assert_eq!(map_key(KeyCode::F3), None);
        assert_eq!(map_key(KeyCode::F4), None);
    }

    #[test]
    fn wasd_and_arrows_map_to_the_same_directions() {
        assert_eq!(map_key(KeyCode::ArrowLeft), Some(Key::Left));
        assert_eq!(map_key(KeyCode::KeyA), Some(Key::A));
        assert_eq!(map_key(KeyCode::NumpadEnter), Some(Key::Enter));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }
}
