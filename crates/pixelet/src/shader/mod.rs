//! Shader sources, validation, and the per-shape program registry.
//!
//! Programs are WGSL vertex/fragment pairs. Each stage is validated on its own
//! with naga, then the pair is checked against the shape pipeline interface
//! (the "link" step) before any GPU object is created.

mod compile;
mod registry;
mod source;

pub use compile::{compile_and_link, ProgramInterface};
pub use registry::{ProgramId, ShaderRegistry};
pub use source::{read_text, ShaderSource};
