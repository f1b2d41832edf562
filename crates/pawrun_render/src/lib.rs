pub mod batch;
pub mod camera;
pub mod draw_list;
pub mod gpu_context;
pub mod sprite_pipeline;
pub mod texture;

pub use batch::{DrawCall, Mesh, WHITE_TEXTURE_KEY};
pub use camera::{Camera2D, CameraUniform};
pub use draw_list::{colors, Color, CommandBuffer, DrawCmd, DrawList, TextAlign, TextCmd};
pub use gpu_context::GpuContext;
pub use sprite_pipeline::{SpritePipeline, SpriteVertex};
pub use texture::Texture;
