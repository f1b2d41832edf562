//! CPU-side quad batching.
//!
//! A `DrawList` is flattened into one vertex/index stream per frame. Runs of
//! consecutive quads that sample the same texture collapse into a single
//! draw call, so a frame of flat-coloured platforms costs one bind and one
//! `draw_indexed`. Layers (world, then screen) never merge across their
//! boundary because they are drawn with different camera bind groups.

use std::sync::Arc;

use pawrun_core::geometry::Rect;

use crate::draw_list::{Color, DrawCmd};
use crate::sprite_pipeline::SpriteVertex;

/// 1x1 white texture used for flat fills and missing-texture fallbacks.
pub const WHITE_TEXTURE_KEY: &str = "__white";

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
    layer_start: usize,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new layer; returns the index of its first draw call.
    pub fn begin_layer(&mut self) -> usize {
        self.layer_start = self.draw_calls.len();
        self.layer_start
    }

    /// Append every command. `texture_size` reports the pixel size of a
    /// loaded texture, or `None` when the sprite must use its fallback colour.
    pub fn push_commands<F>(&mut self, commands: &[DrawCmd], texture_size: F)
    where
        F: Fn(&str) -> Option<(u32, u32)>,
    {
        for cmd in commands {
            match cmd {
                DrawCmd::FillRect { rect, color } => {
                    self.push_quad(WHITE_TEXTURE_KEY, *rect, [0.0, 0.0, 1.0, 1.0], *color);
                }
                DrawCmd::Sprite {
                    texture,
                    source,
                    dest,
                    flip_x,
                    fallback,
                } => match texture_size(texture) {
                    Some((w, h)) if w > 0 && h > 0 => {
                        let uv = source_uv(*source, w as f32, h as f32, *flip_x);
                        self.push_quad(texture, *dest, uv, [1.0, 1.0, 1.0, 1.0]);
                    }
                    _ => {
                        self.push_quad(WHITE_TEXTURE_KEY, *dest, [0.0, 0.0, 1.0, 1.0], *fallback);
                    }
                },
            }
        }
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of texture bind switches the draw calls will need.
    pub fn texture_bind_count(&self) -> usize {
        let mut binds = 0usize;
        let mut current: Option<&str> = None;
        for draw in &self.draw_calls {
            let key: &str = &draw.texture_key;
            if current != Some(key) {
                current = Some(key);
                binds += 1;
            }
        }
        binds
    }

    fn push_quad(&mut self, texture_key: &str, dest: Rect, uv: [f32; 4], color: Color) {
        let [u0, v0, u1, v1] = uv;
        let base_index = self.vertices.len() as u32;
        let corners = [
            ([dest.left(), dest.top()], [u0, v0]),
            ([dest.right(), dest.top()], [u1, v0]),
            ([dest.right(), dest.bottom()], [u1, v1]),
            ([dest.left(), dest.bottom()], [u0, v1]),
        ];
        for (position, tex_coords) in corners {
            self.vertices.push(SpriteVertex {
                position,
                tex_coords,
                color,
            });
        }

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        self.push_draw_call(texture_key, draw_start, 6);
    }

    fn push_draw_call(&mut self, texture_key: &str, index_start: u32, index_count: u32) {
        if self.draw_calls.len() > self.layer_start {
            if let Some(last) = self.draw_calls.last_mut() {
                let contiguous = last.index_start + last.index_count == index_start;
                if &*last.texture_key == texture_key && contiguous {
                    last.index_count += index_count;
                    return;
                }
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key: Arc::from(texture_key),
            index_start,
            index_count,
        });
    }
}

/// Texture coordinates `[u0, v0, u1, v1]` for a pixel-space source region.
fn source_uv(source: Rect, tex_w: f32, tex_h: f32, flip_x: bool) -> [f32; 4] {
    let u0 = source.left() / tex_w;
    let u1 = source.right() / tex_w;
    let v0 = source.top() / tex_h;
    let v1 = source.bottom() / tex_h;
    if flip_x {
        [u1, v0, u0, v1]
    } else {
        [u0, v0, u1, v1]
    }
}
