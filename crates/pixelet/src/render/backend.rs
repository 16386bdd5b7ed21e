use bytemuck::{Pod, Zeroable};

use crate::error::{PreconditionError, Result};
use crate::shader::ShaderSource;

/// GPU operations the shapes need.
///
/// Every handle type releases its GPU object when dropped, so ownership alone
/// decides lifetime: a shape's buffers go away with the shape, programs with the
/// registry that compiled them.
///
/// Writes are queued and land before any draw of the frame runs. A buffer a
/// draw has already bound this frame must not be written again; later draws
/// that need different data take it from the transient storage.
pub trait Backend {
    /// Linked vertex + fragment program with its fixed vertex layout.
    type Program;
    /// Vertex or index buffer.
    type Buffer;
    /// Per-shape uniform block bound to a program.
    type Uniforms;

    /// Compiles and links `source`; `layout` is baked into the program.
    fn create_program(&mut self, source: &ShaderSource, layout: &AttributeLayout) -> Result<Self::Program>;

    /// Creates a vertex buffer sized for and filled with `vertices`.
    fn create_vertex_buffer(&mut self, label: &str, vertices: &[f32]) -> Self::Buffer;

    /// Creates an index buffer. Its contents never change.
    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Self::Buffer;

    /// Replaces the whole contents of a vertex buffer.
    fn upload_vertices(&mut self, buffer: &Self::Buffer, vertices: &[f32]);

    /// Creates a uniform block compatible with `program`.
    fn create_uniforms(&mut self, label: &str, program: &Self::Program) -> Self::Uniforms;

    fn write_uniforms(&mut self, uniforms: &Self::Uniforms, values: &ShapeUniforms);

    /// Starts a frame. Transient storage handed out during the previous frame
    /// may be reused from here on.
    fn begin_frame(&mut self);

    /// Copies `vertices` into this frame's transient vertex storage.
    ///
    /// Returns the byte offset of the copy inside
    /// [`transient_vertex_buffer`](Self::transient_vertex_buffer). Each call gets
    /// its own range until the next [`begin_frame`](Self::begin_frame).
    fn push_vertices(&mut self, vertices: &[f32]) -> u64;

    /// Copies `values` into this frame's transient uniform storage and returns
    /// the dynamic offset to bind it with.
    fn push_uniforms(&mut self, values: &ShapeUniforms) -> u32;

    /// Buffer the last [`push_vertices`](Self::push_vertices) wrote into.
    fn transient_vertex_buffer(&self) -> &Self::Buffer;

    /// Uniform block the last [`push_uniforms`](Self::push_uniforms) wrote
    /// into. Compatible with every program.
    fn transient_uniforms(&self) -> &Self::Uniforms;
}

/// Something draw calls are recorded into (a render pass for wgpu).
pub trait DrawTarget<B: Backend> {
    /// Binds everything named in `call`, then issues its draw.
    fn draw(&mut self, call: DrawCall<'_, B>);
}

/// One fully described draw: program, uniforms, geometry, primitive.
pub struct DrawCall<'a, B: Backend> {
    pub program: &'a B::Program,
    pub uniforms: UniformSlice<'a, B>,
    pub vertices: VertexSlice<'a, B>,
    pub primitive: Primitive<'a, B>,
}

/// Vertex data starting `offset` bytes into `buffer`.
pub struct VertexSlice<'a, B: Backend> {
    pub buffer: &'a B::Buffer,
    pub offset: u64,
}

/// Uniform values at dynamic offset `offset` inside `block`.
pub struct UniformSlice<'a, B: Backend> {
    pub block: &'a B::Uniforms,
    pub offset: u32,
}

impl<'a, B: Backend> VertexSlice<'a, B> {
    #[inline]
    pub fn whole(buffer: &'a B::Buffer) -> Self {
        Self { buffer, offset: 0 }
    }
}

impl<'a, B: Backend> UniformSlice<'a, B> {
    #[inline]
    pub fn whole(block: &'a B::Uniforms) -> Self {
        Self { block, offset: 0 }
    }
}

pub enum Primitive<'a, B: Backend> {
    /// Non-indexed triangle list.
    Triangles { vertex_count: u32 },
    /// Indexed triangle list.
    IndexedTriangles { indices: &'a B::Buffer, index_count: u32 },
}

/// Uniform block shared by every shape program.
///
/// Layout matches the WGSL struct `ShapeUniforms` (16-byte aligned).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShapeUniforms {
    pub color: [f32; 4],
    pub scale: [f32; 2],
    pub _pad: [f32; 2],
}

impl ShapeUniforms {
    #[inline]
    pub fn new(color: [f32; 4], scale: [f32; 2]) -> Self {
        Self {
            color,
            scale,
            _pad: [0.0; 2],
        }
    }
}

/// Float vertex attribute: which shader slot reads it and where it sits in a vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLayout {
    pub slot: u32,
    pub components: u32,
    /// Bytes between consecutive vertices.
    pub stride: u64,
    /// Byte offset of the attribute inside a vertex.
    pub offset: u64,
}

impl AttributeLayout {
    /// `vec3<f32>` position at slot 0, tightly packed.
    pub const POSITION: AttributeLayout = AttributeLayout {
        slot: 0,
        components: 3,
        stride: 3 * std::mem::size_of::<f32>() as u64,
        offset: 0,
    };

    /// Rejects component counts that have no float vertex format.
    pub fn validated(self) -> std::result::Result<Self, PreconditionError> {
        match self.components {
            2..=4 => Ok(self),
            n => Err(PreconditionError::UnsupportedAttribute(n)),
        }
    }

    pub(crate) fn wgpu_format(self) -> std::result::Result<wgpu::VertexFormat, PreconditionError> {
        match self.components {
            2 => Ok(wgpu::VertexFormat::Float32x2),
            3 => Ok(wgpu::VertexFormat::Float32x3),
            4 => Ok(wgpu::VertexFormat::Float32x4),
            n => Err(PreconditionError::UnsupportedAttribute(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_wgsl_sized() {
        assert_eq!(std::mem::size_of::<ShapeUniforms>(), 32);
    }

    #[test]
    fn position_layout_is_packed_vec3() {
        let l = AttributeLayout::POSITION;
        assert_eq!((l.slot, l.components, l.stride, l.offset), (0, 3, 12, 0));
        assert_eq!(l.wgpu_format(), Ok(wgpu::VertexFormat::Float32x3));
    }

    #[test]
    fn odd_component_counts_are_rejected() {
        let l = AttributeLayout { components: 5, ..AttributeLayout::POSITION };
        assert_eq!(l.validated(), Err(PreconditionError::UnsupportedAttribute(5)));
        let l = AttributeLayout { components: 1, ..AttributeLayout::POSITION };
        assert!(l.validated().is_err());
    }
}
