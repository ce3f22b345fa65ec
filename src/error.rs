/// Errors raised by the fallible surfaces of the engine: program binding,
/// draw-call input, scene buffer access and entity construction.
/// The per-vertex pipeline itself never fails.
use thiserror::Error;

use crate::program::UniformType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("program `{program}` declares uniform `{name}` but no value was bound")]
    MissingUniform { program: &'static str, name: &'static str },

    #[error("program `{program}` uniform `{name}` expects {expected:?}, got {found:?}")]
    UniformTypeMismatch {
        program: &'static str,
        name: &'static str,
        expected: UniformType,
        found: UniformType,
    },

    #[error("program `{program}` declares attribute `{name}` but the vertex data does not supply it")]
    MissingAttribute { program: &'static str, name: &'static str },

    #[error("program `{program}` attribute `{name}` has the wrong instancing step")]
    AttributeStepMismatch { program: &'static str, name: &'static str },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("index buffer length {index_count} is not a multiple of 3")]
    IncompleteTriangle { index_count: usize },

    #[error("invalid distance scale law: dMin={d_min}, dMax={d_max}")]
    InvalidScaleLaw { d_min: f32, d_max: f32 },

    #[error("invalid polyline order tag {0} (expected -2, -1, 1 or 2)")]
    InvalidOrder(i32),

    #[error("no geo object instance in slot {0}")]
    InstanceNotFound(usize),

    #[error("polyline path needs at least 2 points, got {points}")]
    PolylineTooShort { points: usize },

    #[error("polyline path has {points} points but {colors} colors")]
    ColorCountMismatch { points: usize, colors: usize },
}

pub type Result<T> = std::result::Result<T, RenderError>;
