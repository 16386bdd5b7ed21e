//! In-memory backend that records every GPU operation instead of performing it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::shader::{compile_and_link, ShaderSource};

use super::backend::{AttributeLayout, Backend, DrawCall, DrawTarget, Primitive, ShapeUniforms};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Resource {
    Program(u32),
    Buffer(u32),
    Uniforms(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum RecordedPrimitive {
    Triangles { vertex_count: u32 },
    IndexedTriangles { indices: u32, index_count: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    CreateProgram { id: u32, label: String },
    CreateVertexBuffer { id: u32, floats: Vec<f32> },
    CreateIndexBuffer { id: u32, indices: Vec<u32> },
    Upload { id: u32, floats: Vec<f32> },
    CreateUniforms { id: u32, program: u32 },
    WriteUniforms { id: u32, values: ShapeUniforms },
    PushVertices { offset: u64, floats: Vec<f32> },
    PushUniforms { offset: u32, values: ShapeUniforms },
    Draw {
        program: u32,
        uniforms: u32,
        uniform_offset: u32,
        vertices: u32,
        vertex_offset: u64,
        primitive: RecordedPrimitive,
    },
    Release(Resource),
}

type Log = Rc<RefCell<Vec<Op>>>;

/// Dynamic offset step for transient uniforms, as on most wgpu adapters.
pub(crate) const TRANSIENT_UNIFORM_STRIDE: u32 = 256;

/// Recorded resource; logs its release on drop.
#[derive(Debug)]
pub(crate) struct Handle {
    resource: Resource,
    log: Log,
}

impl Handle {
    pub(crate) fn id(&self) -> u32 {
        match self.resource {
            Resource::Program(id) | Resource::Buffer(id) | Resource::Uniforms(id) => id,
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Op::Release(self.resource));
    }
}

/// Backend double. Transient storage is two fixed handles whose creation is
/// not logged; pushes into them are.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    log: Log,
    next_id: u32,
    transient_vertices: Handle,
    transient_uniforms: Handle,
    vertex_cursor: u64,
    uniform_cursor: u32,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        let log = Log::default();
        let transient = |resource| Handle {
            resource,
            log: Rc::clone(&log),
        };
        Self {
            transient_vertices: transient(Resource::Buffer(1)),
            transient_uniforms: transient(Resource::Uniforms(2)),
            log,
            next_id: 2,
            vertex_cursor: 0,
            uniform_cursor: 0,
        }
    }

    pub(crate) fn transient_vertices_id(&self) -> u32 {
        self.transient_vertices.id()
    }

    pub(crate) fn transient_uniforms_id(&self) -> u32 {
        self.transient_uniforms.id()
    }

    /// Snapshot of everything recorded so far.
    pub(crate) fn ops(&self) -> Vec<Op> {
        self.log.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Draw target writing into the same log.
    pub(crate) fn target(&self) -> RecordingTarget {
        RecordingTarget {
            log: Rc::clone(&self.log),
        }
    }

    fn handle(&mut self, make: fn(u32) -> Resource) -> Handle {
        self.next_id += 1;
        Handle {
            resource: make(self.next_id),
            log: Rc::clone(&self.log),
        }
    }

    fn record(&self, op: Op) {
        self.log.borrow_mut().push(op);
    }
}

impl Backend for RecordingBackend {
    type Program = Handle;
    type Buffer = Handle;
    type Uniforms = Handle;

    fn create_program(&mut self, source: &ShaderSource, layout: &AttributeLayout) -> Result<Handle> {
        let layout = layout.validated()?;
        compile_and_link(source, &layout)?;
        let h = self.handle(Resource::Program);
        self.record(Op::CreateProgram {
            id: h.id(),
            label: source.label.clone(),
        });
        Ok(h)
    }

    fn create_vertex_buffer(&mut self, _label: &str, vertices: &[f32]) -> Handle {
        let h = self.handle(Resource::Buffer);
        self.record(Op::CreateVertexBuffer {
            id: h.id(),
            floats: vertices.to_vec(),
        });
        h
    }

    fn create_index_buffer(&mut self, _label: &str, indices: &[u32]) -> Handle {
        let h = self.handle(Resource::Buffer);
        self.record(Op::CreateIndexBuffer {
            id: h.id(),
            indices: indices.to_vec(),
        });
        h
    }

    fn upload_vertices(&mut self, buffer: &Handle, vertices: &[f32]) {
        self.record(Op::Upload {
            id: buffer.id(),
            floats: vertices.to_vec(),
        });
    }

    fn create_uniforms(&mut self, _label: &str, program: &Handle) -> Handle {
        let h = self.handle(Resource::Uniforms);
        self.record(Op::CreateUniforms {
            id: h.id(),
            program: program.id(),
        });
        h
    }

    fn write_uniforms(&mut self, uniforms: &Handle, values: &ShapeUniforms) {
        self.record(Op::WriteUniforms {
            id: uniforms.id(),
            values: *values,
        });
    }

    fn begin_frame(&mut self) {
        self.vertex_cursor = 0;
        self.uniform_cursor = 0;
    }

    fn push_vertices(&mut self, vertices: &[f32]) -> u64 {
        let offset = self.vertex_cursor;
        self.vertex_cursor += std::mem::size_of_val(vertices) as u64;
        self.record(Op::PushVertices {
            offset,
            floats: vertices.to_vec(),
        });
        offset
    }

    fn push_uniforms(&mut self, values: &ShapeUniforms) -> u32 {
        let offset = self.uniform_cursor;
        self.uniform_cursor += TRANSIENT_UNIFORM_STRIDE;
        self.record(Op::PushUniforms {
            offset,
            values: *values,
        });
        offset
    }

    fn transient_vertex_buffer(&self) -> &Handle {
        &self.transient_vertices
    }

    fn transient_uniforms(&self) -> &Handle {
        &self.transient_uniforms
    }
}

pub(crate) struct RecordingTarget {
    log: Log,
}

impl DrawTarget<RecordingBackend> for RecordingTarget {
    fn draw(&mut self, call: DrawCall<'_, RecordingBackend>) {
        let primitive = match call.primitive {
            Primitive::Triangles { vertex_count } => RecordedPrimitive::Triangles { vertex_count },
            Primitive::IndexedTriangles {
                indices,
                index_count,
            } => RecordedPrimitive::IndexedTriangles {
                indices: indices.id(),
                index_count,
            },
        };

        self.log.borrow_mut().push(Op::Draw {
            program: call.program.id(),
            uniforms: call.uniforms.block.id(),
            uniform_offset: call.uniforms.offset,
            vertices: call.vertices.buffer.id(),
            vertex_offset: call.vertices.offset,
            primitive,
        });
    }
}

/// Draw ops in the log, in issue order.
pub(crate) fn draws(ops: &[Op]) -> Vec<RecordedPrimitive> {
    ops.iter()
        .filter_map(|op| match op {
            Op::Draw { primitive, .. } => Some(*primitive),
            _ => None,
        })
        .collect()
}
