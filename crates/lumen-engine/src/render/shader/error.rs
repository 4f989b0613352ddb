use std::fmt;
use std::path::PathBuf;

/// Pipeline stage a source belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub(crate) fn visibility(self) -> wgpu::ShaderStages {
        match self {
            StageKind::Vertex => wgpu::ShaderStages::VERTEX,
            StageKind::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }

    /// The WGSL attribute marking this stage's entry point.
    pub fn attribute(self) -> &'static str {
        match self {
            StageKind::Vertex => "@vertex",
            StageKind::Fragment => "@fragment",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Why a shader program could not be built.
#[derive(Debug)]
pub enum ShaderError {
    /// A source file could not be read.
    Io {
        stage: StageKind,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Parse or validation failure. `message` is the rendered compiler
    /// diagnostic, including the offending source lines.
    Compile { stage: StageKind, message: String },

    /// The source compiled but has no entry point for its stage.
    MissingEntryPoint { stage: StageKind },

    /// The stages do not fit together.
    Link(String),
}

impl ShaderError {
    pub(crate) fn link(msg: impl Into<String>) -> Self {
        ShaderError::Link(msg.into())
    }

    pub fn stage(&self) -> Option<StageKind> {
        match self {
            ShaderError::Io { stage, .. }
            | ShaderError::Compile { stage, .. }
            | ShaderError::MissingEntryPoint { stage } => Some(*stage),
            ShaderError::Link(_) => None,
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Io { stage, path, source } => {
                write!(f, "failed to read {stage} shader {}: {source}", path.display())
            }
            ShaderError::Compile { stage, message } => {
                write!(f, "{stage} shader compilation failed:\n{message}")
            }
            ShaderError::MissingEntryPoint { stage } => {
                write!(f, "{stage} shader has no {} entry point", stage.attribute())
            }
            ShaderError::Link(msg) => write!(f, "shader program linking failed: {msg}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_stage_and_path() {
        let err = ShaderError::Io {
            stage: StageKind::Fragment,
            path: PathBuf::from("shaders/missing.wgsl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("fragment"), "{msg}");
        assert!(msg.contains("shaders/missing.wgsl"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_entry_point_mentions_attribute() {
        let err = ShaderError::MissingEntryPoint { stage: StageKind::Vertex };
        assert_eq!(err.to_string(), "vertex shader has no @vertex entry point");
        assert_eq!(err.stage(), Some(StageKind::Vertex));
    }

    #[test]
    fn link_errors_have_no_stage() {
        assert_eq!(ShaderError::link("x").stage(), None);
    }
}
