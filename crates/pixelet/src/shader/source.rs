use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PixeletError, Result};

const SOLID_VERTEX: &str = include_str!("wgsl/solid.vert.wgsl");
const SOLID_FRAGMENT: &str = include_str!("wgsl/solid.frag.wgsl");

/// WGSL source pair for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Debug label; also names the program in logs.
    pub label: String,
    pub vertex: String,
    pub fragment: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
}

impl ShaderSource {
    /// Creates a source pair with the default `vs_main` / `fs_main` entry points.
    pub fn new(label: impl Into<String>, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
        }
    }

    /// Built-in program used by every shape: scaled positions, uniform fill color.
    pub fn solid_fill() -> Self {
        Self::new("solid fill", SOLID_VERTEX, SOLID_FRAGMENT)
    }

    /// Loads both stages from disk.
    pub fn from_files(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> Result<Self> {
        let vertex = vertex.as_ref();
        let label = vertex
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| vertex.display().to_string());
        Ok(Self::new(label, read_text(vertex)?, read_text(fragment)?))
    }

    pub fn with_entry_points(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }
}

/// Reads a whole text file.
///
/// A missing file is reported as [`PixeletError::NotFound`]; other failures keep
/// the underlying I/O error.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PixeletError::NotFound {
            path: PathBuf::from(path),
        },
        _ => PixeletError::Io {
            path: PathBuf::from(path),
            source,
        },
    })
}
