use crate::error::PreconditionError;

use super::backend::{AttributeLayout, Backend, DrawCall, Primitive, UniformSlice, VertexSlice};

/// Vertex buffer + optional static index buffer + the layout they follow.
///
/// Upload policy is "respecify the whole buffer": every [`upload`](Self::upload)
/// replaces all vertices. The attribute layout is fixed at construction, and the
/// index buffer is written once and never resized.
pub struct GeometryBuffer<B: Backend> {
    vertices: B::Buffer,
    indices: Option<B::Buffer>,
    layout: AttributeLayout,
    vertex_count: u32,
    index_count: u32,
}

impl<B: Backend> GeometryBuffer<B> {
    /// Creates zero-filled vertex storage for `vertex_count` vertices and, when
    /// `indices` is given, uploads the index buffer.
    pub fn new(
        backend: &mut B,
        label: &str,
        layout: AttributeLayout,
        vertex_count: u32,
        indices: Option<&[u32]>,
    ) -> Self {
        let zeros = vec![0.0f32; vertex_count as usize * layout.components as usize];
        let vertices = backend.create_vertex_buffer(label, &zeros);

        let (indices, index_count) = match indices {
            Some(data) => (
                Some(backend.create_index_buffer(label, data)),
                data.len() as u32,
            ),
            None => (None, 0),
        };

        Self {
            vertices,
            indices,
            layout,
            vertex_count,
            index_count,
        }
    }

    /// Replaces all vertex data. `data` must hold exactly
    /// `vertex_count * components` floats.
    pub fn upload(&self, backend: &mut B, data: &[f32]) -> Result<(), PreconditionError> {
        let expected = self.float_count();
        if data.len() != expected {
            return Err(PreconditionError::VertexCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        backend.upload_vertices(&self.vertices, data);
        Ok(())
    }

    /// Describes a draw that binds this geometry with `program` and `uniforms`.
    ///
    /// Indexed geometry draws all of its indices; the rest draw every vertex.
    pub fn draw_call<'a>(&'a self, program: &'a B::Program, uniforms: UniformSlice<'a, B>) -> DrawCall<'a, B> {
        DrawCall {
            program,
            uniforms,
            vertices: VertexSlice::whole(&self.vertices),
            primitive: self.primitive(),
        }
    }

    /// Index topology of this geometry, independent of where the vertices live.
    pub fn primitive(&self) -> Primitive<'_, B> {
        match &self.indices {
            Some(indices) => Primitive::IndexedTriangles {
                indices,
                index_count: self.index_count,
            },
            None => Primitive::Triangles {
                vertex_count: self.vertex_count,
            },
        }
    }

    #[inline]
    pub fn layout(&self) -> AttributeLayout {
        self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    #[inline]
    fn float_count(&self) -> usize {
        self.vertex_count as usize * self.layout.components as usize
    }
}
