//! GPU rendering helpers.
//!
//! Each helper owns its GPU resources and is created against a [`RenderCtx`].
//! Coordinates are the ones the shaders receive: positions in clip space,
//! texture coordinates with the origin at the bottom-left (GL convention).

mod color;
mod ctx;
mod mesh;
mod texture;
mod vertex;
mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub mod shader;

pub use color::Color;
pub use ctx::RenderCtx;
pub use mesh::Mesh;
pub use shader::{PipelineDesc, Shader, ShaderError};
pub use texture::{mip_level_count, Texture, TextureOptions};
pub use vertex::{PositionVertex, TexturedVertex, Vertex};
pub use viewport::Viewport;
