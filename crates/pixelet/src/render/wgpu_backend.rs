use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::error::Result;
use crate::shader::{compile_and_link, ShaderSource};

use super::backend::{AttributeLayout, Backend, DrawCall, DrawTarget, Primitive, ShapeUniforms};

/// Binding size of the shape uniform block.
const UNIFORMS_SIZE: wgpu::BufferSize =
    NonZeroU64::MIN.saturating_add(std::mem::size_of::<ShapeUniforms>() as u64 - 1);

/// Initial transient vertex storage: room for a few thousand quads.
const TRANSIENT_VERTEX_BYTES: u64 = 64 * 1024;

/// Initial transient uniform slots.
const TRANSIENT_UNIFORM_SLOTS: u64 = 256;

/// wgpu implementation of [`Backend`].
///
/// Device and queue are cheap reference-counted handles; the backend keeps its
/// own clones so shapes can be built and drawn without borrowing the window.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    /// Shared by every program: the link step pins the uniform interface.
    uniforms_layout: wgpu::BindGroupLayout,
    arena: FrameArena,
}

/// Append-only per-frame storage for draws that cannot use a shape's own
/// buffers. Cursors rewind on `begin_frame`.
///
/// Growing replaces a buffer outright. Passes already recorded keep the old
/// one alive until they finish.
struct FrameArena {
    vertices: wgpu::Buffer,
    vertex_cursor: u64,
    uniforms: WgpuUniforms,
    uniform_cursor: u64,
    /// `ShapeUniforms` size rounded up to the device's offset alignment.
    uniform_stride: u64,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let uniforms_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixelet shape bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(UNIFORMS_SIZE),
                },
                count: None,
            }],
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
        let uniform_stride = UNIFORMS_SIZE.get().div_ceil(alignment) * alignment;

        let arena = FrameArena {
            vertices: transient_vertex_buffer(&device, TRANSIENT_VERTEX_BYTES),
            vertex_cursor: 0,
            uniforms: uniform_block(
                &device,
                &uniforms_layout,
                "pixelet transient uniforms",
                uniform_stride * TRANSIENT_UNIFORM_SLOTS,
            ),
            uniform_cursor: 0,
            uniform_stride,
        };

        Self {
            device,
            queue,
            surface_format,
            uniforms_layout,
            arena,
        }
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }
}

/// Render pipeline for one shader program.
pub struct WgpuProgram {
    pipeline: wgpu::RenderPipeline,
}

/// A uniform buffer and the bind group exposing it.
pub struct WgpuUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

fn transient_vertex_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pixelet transient vertices"),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_block(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, size: u64) -> WgpuUniforms {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: Some(UNIFORMS_SIZE),
            }),
        }],
    });

    WgpuUniforms { buffer, bind_group }
}

impl Backend for WgpuBackend {
    type Program = WgpuProgram;
    type Buffer = wgpu::Buffer;
    type Uniforms = WgpuUniforms;

    fn create_program(&mut self, source: &ShaderSource, layout: &AttributeLayout) -> Result<WgpuProgram> {
        let format = layout.wgpu_format()?;
        compile_and_link(source, layout)?;

        let label = source.label.as_str();

        let vs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.vertex.as_str().into()),
        });
        let fs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.fragment.as_str().into()),
        });

        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("pixelet shape pipeline layout"),
                    bind_group_layouts: &[&self.uniforms_layout],
                    immediate_size: 0,
                });

        let attributes = [wgpu::VertexAttribute {
            format,
            offset: layout.offset,
            shader_location: layout.slot,
        }];

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(source.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(source.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            // Shapes may be wound either way.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("created pipeline `{label}` ({:?} -> {:?})", format, self.surface_format);

        Ok(WgpuProgram { pipeline })
    }

    fn create_vertex_buffer(&mut self, label: &str, vertices: &[f32]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        })
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        })
    }

    fn upload_vertices(&mut self, buffer: &wgpu::Buffer, vertices: &[f32]) {
        self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(vertices));
    }

    fn create_uniforms(&mut self, label: &str, _program: &WgpuProgram) -> WgpuUniforms {
        uniform_block(&self.device, &self.uniforms_layout, label, UNIFORMS_SIZE.get())
    }

    fn write_uniforms(&mut self, uniforms: &WgpuUniforms, values: &ShapeUniforms) {
        self.queue.write_buffer(&uniforms.buffer, 0, bytemuck::bytes_of(values));
    }

    fn begin_frame(&mut self) {
        self.arena.vertex_cursor = 0;
        self.arena.uniform_cursor = 0;
    }

    fn push_vertices(&mut self, vertices: &[f32]) -> u64 {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let len = bytes.len() as u64;

        let arena = &mut self.arena;
        if arena.vertex_cursor + len > arena.vertices.size() {
            let size = (arena.vertices.size() * 2).max(len);
            log::debug!("transient vertex storage grown to {size} bytes");
            arena.vertices = transient_vertex_buffer(&self.device, size);
            arena.vertex_cursor = 0;
        }

        let offset = arena.vertex_cursor;
        self.queue.write_buffer(&arena.vertices, offset, bytes);
        // f32 data keeps the cursor on the 4-byte copy alignment.
        arena.vertex_cursor += len;
        offset
    }

    fn push_uniforms(&mut self, values: &ShapeUniforms) -> u32 {
        let arena = &mut self.arena;
        if arena.uniform_cursor + arena.uniform_stride > arena.uniforms.buffer.size() {
            let size = arena.uniforms.buffer.size() * 2;
            log::debug!("transient uniform storage grown to {size} bytes");
            arena.uniforms = uniform_block(&self.device, &self.uniforms_layout, "pixelet transient uniforms", size);
            arena.uniform_cursor = 0;
        }

        let offset = arena.uniform_cursor;
        self.queue
            .write_buffer(&arena.uniforms.buffer, offset, bytemuck::bytes_of(values));
        arena.uniform_cursor += arena.uniform_stride;
        // Bounded by the buffer size, which wgpu caps well below u32::MAX.
        offset as u32
    }

    fn transient_vertex_buffer(&self) -> &wgpu::Buffer {
        &self.arena.vertices
    }

    fn transient_uniforms(&self) -> &WgpuUniforms {
        &self.arena.uniforms
    }
}

impl DrawTarget<WgpuBackend> for wgpu::RenderPass<'_> {
    fn draw(&mut self, call: DrawCall<'_, WgpuBackend>) {
        self.set_pipeline(&call.program.pipeline);
        self.set_bind_group(0, &call.uniforms.block.bind_group, &[call.uniforms.offset]);
        self.set_vertex_buffer(0, call.vertices.buffer.slice(call.vertices.offset..));

        match call.primitive {
            Primitive::Triangles { vertex_count } => {
                wgpu::RenderPass::draw(self, 0..vertex_count, 0..1);
            }
            Primitive::IndexedTriangles {
                indices,
                index_count,
            } => {
                self.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                wgpu::RenderPass::draw_indexed(self, 0..index_count, 0, 0..1);
            }
        }
    }
}
