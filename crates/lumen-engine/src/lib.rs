//! Lumen engine crate.
//!
//! Window runtime, GPU context and the small set of rendering helpers
//! (shader programs, meshes, textures) shared by the demo binaries.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
