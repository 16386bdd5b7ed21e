//! Error taxonomy shared by every Pixelet module.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::shapes::{ShapeKind, ShapeState};

/// Shader pipeline stage, used to say which half of a program failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Top-level error returned by fallible Pixelet operations.
#[derive(Debug, Error)]
pub enum PixeletError {
    /// The window, its surface, or the GPU device could not be created.
    #[error("failed to create window: {0}")]
    Creation(String),

    #[error("{stage} shader failed to compile: {message}")]
    Compile { stage: ShaderStage, message: String },

    #[error("shader program failed to link: {0}")]
    Link(String),

    #[error("shader source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The surface cannot be recovered (commonly out of memory).
    #[error("surface error: {0}")]
    Surface(String),
}

/// A caller broke a documented precondition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionError {
    #[error("unsupported axis `{0}`, expected `x` or `y`")]
    UnsupportedAxis(char),

    #[error("viewport must have a positive finite size, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("{kind} is not ready to draw (state: {state:?})")]
    NotReady { kind: ShapeKind, state: ShapeState },

    #[error("vertex attributes with {0} float components are not supported")]
    UnsupportedAttribute(u32),

    #[error("vertex data has {actual} floats, buffer layout expects {expected}")]
    VertexCountMismatch { expected: usize, actual: usize },
}

pub type Result<T, E = PixeletError> = std::result::Result<T, E>;
