//! GPU rendering subsystem.
//!
//! Shapes talk to a [`Backend`] (buffers, programs, uniform blocks) and record
//! draws into a [`DrawTarget`]. [`WgpuBackend`] is the real implementation.
//!
//! A shape's own buffers serve its first draw in a frame. Repeat draws with
//! changed data, and all immediate-mode draws, read from per-frame transient
//! storage so every draw sees the data it was issued with.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex data is uploaded already in NDC; the shader only applies scale.

mod backend;
mod ctx;
mod geometry;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{
    AttributeLayout, Backend, DrawCall, DrawTarget, Primitive, ShapeUniforms, UniformSlice, VertexSlice,
};
pub use ctx::{Canvas, Gfx};
pub(crate) use ctx::rect_corners;
pub use geometry::GeometryBuffer;
pub use wgpu_backend::{WgpuBackend, WgpuProgram, WgpuUniforms};
