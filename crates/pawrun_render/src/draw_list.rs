//! Renderer-independent drawing commands.
//!
//! Gameplay and menu code describe a frame as a `DrawList`; the GPU backend
//! turns it into batched quads and the overlay paints the text. Keeping the
//! list plain data lets draw code be tested without a window.

use pawrun_core::geometry::Rect;

pub type Color = [f32; 4];

pub mod colors {
    use super::Color;

    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
    pub const RED: Color = [0.9, 0.2, 0.2, 1.0];
    pub const GREEN: Color = [0.3, 0.8, 0.3, 1.0];
    pub const YELLOW: Color = [1.0, 0.85, 0.2, 1.0];
    pub const ORANGE: Color = [1.0, 0.55, 0.1, 1.0];
    pub const BROWN: Color = [0.55, 0.35, 0.2, 1.0];
    pub const DARK_GREEN: Color = [0.2, 0.5, 0.25, 1.0];
    pub const GRAY: Color = [0.5, 0.5, 0.5, 1.0];
    pub const DARK_GRAY: Color = [0.2, 0.2, 0.22, 1.0];
    pub const SKY: Color = [0.53, 0.75, 0.92, 1.0];
    pub const BEIGE: Color = [0.83, 0.69, 0.51, 1.0];
    pub const SHADE: Color = [0.0, 0.0, 0.0, 0.55];
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRect {
        rect: Rect,
        color: Color,
    },
    /// Region of a texture, optionally mirrored horizontally. Drawn as a flat
    /// `fallback` quad when the texture is not available.
    Sprite {
        texture: String,
        source: Rect,
        dest: Rect,
        flip_x: bool,
        fallback: Color,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text: String,
    /// Logical screen pixels; `y` is the top of the text.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
}

#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    pub commands: Vec<DrawCmd>,
}

impl CommandBuffer {
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCmd::FillRect { rect, color });
    }

    /// Outline drawn as four thin filled strips inside `rect`.
    pub fn outline_rect(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness.min(rect.width * 0.5).min(rect.height * 0.5);
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.fill_rect(
            Rect::new(rect.x, rect.bottom() - t, rect.width, t),
            color,
        );
        self.fill_rect(
            Rect::new(rect.x, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
        self.fill_rect(
            Rect::new(rect.right() - t, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
    }

    pub fn sprite(
        &mut self,
        texture: &str,
        source: Rect,
        dest: Rect,
        flip_x: bool,
        fallback: Color,
    ) {
        self.commands.push(DrawCmd::Sprite {
            texture: texture.to_string(),
            source,
            dest,
            flip_x,
            fallback,
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DrawList {
    pub clear_color: Color,
    /// Drawn through the follow camera.
    pub world: CommandBuffer,
    /// Drawn in logical window pixels, on top of the world.
    pub screen: CommandBuffer,
    pub texts: Vec<TextCmd>,
}

impl DrawList {
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            world: CommandBuffer::default(),
            screen: CommandBuffer::default(),
            texts: Vec::new(),
        }
    }

    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, color: Color) {
        self.push_text(text.into(), x, y, size, color, TextAlign::Left);
    }

    pub fn text_centered(
        &mut self,
        text: impl Into<String>,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    ) {
        self.push_text(text.into(), x, y, size, color, TextAlign::Center);
    }

    fn push_text(
        &mut self,
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
        align: TextAlign,
    ) {
        self.texts.push(TextCmd {
            text,
            x,
            y,
            size,
            color,
            align,
        });
    }

    /// Every texture path referenced by sprite commands, deduplicated in
    /// first-use order.
    pub fn texture_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for cmd in self.world.commands.iter().chain(&self.screen.commands) {
            if let DrawCmd::Sprite { texture, .. } = cmd {
                if !paths.contains(&texture.as_str()) {
                    paths.push(texture);
                }
            }
        }
        paths
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new(colors::SKY)
    }
}
