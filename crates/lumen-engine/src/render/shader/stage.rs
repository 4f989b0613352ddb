use std::path::Path;

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};

use super::{ShaderError, StageKind};

/// A parsed and validated single-stage WGSL module.
#[derive(Debug)]
pub struct CompiledStage {
    pub kind: StageKind,
    pub module: naga::Module,
    pub info: ModuleInfo,
    /// Index into `module.entry_points` of this stage's entry point.
    pub entry_index: usize,
}

impl CompiledStage {
    pub fn entry_point(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_point().name
    }
}

/// Reads a shader source file.
pub fn read_source(stage: StageKind, path: impl AsRef<Path>) -> Result<String, ShaderError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

/// Compiles `source` as a `kind` stage.
///
/// The first entry point of the matching stage is used; a source may carry
/// entry points for other stages as well.
pub fn compile(kind: StageKind, source: &str) -> Result<CompiledStage, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage: kind,
        message: e.emit_to_string(source),
    })?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage: kind,
            message: e.emit_to_string(source),
        })?;

    let entry_index = module
        .entry_points
        .iter()
        .position(|ep| ep.stage == kind.naga_stage())
        .ok_or(ShaderError::MissingEntryPoint { stage: kind })?;

    Ok(CompiledStage {
        kind,
        module,
        info,
        entry_index,
    })
}
