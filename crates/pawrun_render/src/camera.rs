//! 2D follow camera for a y-down world.
//!
//! The camera's `target` is the world point shown at the centre of the
//! viewport. Following clamps the target from below so the view never shows
//! space left of or above the world origin.

use glam::{Mat4, Vec2};
use pawrun_core::geometry::Rect;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

pub struct Camera2D {
    pub target: Vec2,
    pub zoom: f32,
    /// Viewport size in logical pixels.
    pub viewport: (f32, f32),
    /// Smallest allowed target; half the visible world by default.
    pub min_target: Vec2,
}

impl Camera2D {
    pub fn new(viewport_width: f32, viewport_height: f32, zoom: f32) -> Self {
        let mut camera = Self {
            target: Vec2::ZERO,
            zoom,
            viewport: (viewport_width, viewport_height),
            min_target: Vec2::ZERO,
        };
        camera.min_target = camera.half_extents();
        camera.target = camera.min_target;
        camera
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(
            self.viewport.0 / (2.0 * self.zoom),
            self.viewport.1 / (2.0 * self.zoom),
        )
    }

    pub fn follow(&mut self, focus: Vec2) {
        self.target = focus.max(self.min_target);
    }

    /// World-space rectangle currently visible.
    pub fn visible_rect(&self) -> Rect {
        let half = self.half_extents();
        Rect::new(
            self.target.x - half.x,
            self.target.y - half.y,
            half.x * 2.0,
            half.y * 2.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let view = self.visible_rect();
        // Top edge maps to +1 in clip space because the world is y-down.
        let proj = Mat4::orthographic_rh(
            view.left(),
            view.right(),
            view.bottom(),
            view.top(),
            -1.0,
            1.0,
        );
        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }

    /// Projection for screen-space drawing in logical pixels, origin top-left.
    pub fn screen_uniform(&self) -> CameraUniform {
        let proj = Mat4::orthographic_rh(0.0, self.viewport.0, self.viewport.1, 0.0, -1.0, 1.0);
        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clamp_is_half_visible_world() {
        let camera = Camera2D::new(1024.0, 768.0, 2.0);
        assert_eq!(camera.min_target, Vec2::new(256.0, 192.0));
    }

    #[test]
    fn follow_tracks_focus_inside_world() {
        let mut camera = Camera2D::new(1024.0, 768.0, 2.0);
        camera.follow(Vec2::new(900.0, 400.0));
        assert_eq!(camera.target, Vec2::new(900.0, 400.0));
    }

    #[test]
    fn follow_clamps_each_axis_independently() {
        let mut camera = Camera2D::new(1024.0, 768.0, 2.0);
        camera.follow(Vec2::new(120.0, 300.0));
        assert_eq!(camera.target, Vec2::new(256.0, 300.0));
        camera.follow(Vec2::new(500.0, 50.0));
        assert_eq!(camera.target, Vec2::new(500.0, 192.0));
    }

    #[test]
    fn visible_rect_starts_at_origin_when_clamped() {
        let mut camera = Camera2D::new(1024.0, 768.0, 2.0);
        camera.follow(Vec2::ZERO);
        let view = camera.visible_rect();
        assert_eq!(view, Rect::new(0.0, 0.0, 512.0, 384.0));
    }

    #[test]
    fn world_uniform_maps_top_left_to_clip_corner() {
        let mut camera = Camera2D::new(1024.0, 768.0, 2.0);
        camera.follow(Vec2::ZERO);
        let m = Mat4::from_cols_array_2d(&camera.build_uniform().view_proj);
        let clip = m.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        assert!((clip.x + 1.0).abs() < 1e-5);
        assert!((clip.y - 1.0).abs() < 1e-5);
    }
}
