//! Shader programs.
//!
//! A [`Shader`] is built from a vertex and a fragment WGSL source:
//!
//! 1. each source is compiled on its own (parse + validate, entry point check),
//! 2. the two stages are linked: shared bindings must agree and every fragment
//!    input must be written by the vertex stage,
//! 3. a render pipeline and a single bind group (`@group(0)`) are created from
//!    the linked interface.
//!
//! Uniforms live in one uniform block per program and are set by member name,
//! similar to `glUniform*` with `glGetUniformLocation`.

mod error;
mod interface;
mod program;
mod stage;
mod uniforms;

pub use error::{ShaderError, StageKind};
pub use interface::{BindingKind, BindingSlot, ProgramInterface, UniformLayout, UniformMember, UniformType};
pub use program::{PipelineDesc, Shader};
pub use stage::{compile, read_source, CompiledStage};
pub use uniforms::UniformBlock;
