//! State and GPU plumbing shared by every shape.

use crate::coords::{Vec2, Viewport};
use crate::error::{PixeletError, Result};
use crate::paint::Color;
use crate::render::{AttributeLayout, Backend, Canvas, DrawCall, GeometryBuffer, ShapeUniforms, UniformSlice, VertexSlice};
use crate::shader::ProgramId;

use super::{DrawOutcome, ShapeKind, ShapeState};

/// Resources a shape holds once it has been drawn.
struct ShapeGpu<B: Backend> {
    geometry: GeometryBuffer<B>,
    uniforms: B::Uniforms,
    /// Program the uniform block was created against.
    program: ProgramId,
    /// Viewport the current vertex data was converted with.
    uploaded_for: Option<Viewport>,
    /// Values in `uniforms`, once written.
    written: Option<ShapeUniforms>,
}

pub(super) struct ShapeCore<B: Backend> {
    kind: ShapeKind,
    fill: Color,
    scale: Vec2,
    dirty: bool,
    warned_not_ready: bool,
    /// Frame of the last draw.
    last_frame: Option<u64>,
    gpu: Option<ShapeGpu<B>>,
}

impl<B: Backend> ShapeCore<B> {
    pub(super) fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            fill: Color::WHITE,
            scale: Vec2::new(1.0, 1.0),
            dirty: true,
            warned_not_ready: false,
            last_frame: None,
            gpu: None,
        }
    }

    #[inline]
    pub(super) fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub(super) fn fill(&self) -> Color {
        self.fill
    }

    #[inline]
    pub(super) fn set_fill(&mut self, color: Color) {
        self.fill = color;
    }

    #[inline]
    pub(super) fn scale(&self) -> Vec2 {
        self.scale
    }

    #[inline]
    pub(super) fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Geometry changed; the next draw re-uploads.
    #[inline]
    pub(super) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Shared draw path.
    ///
    /// `corners` yields the shape's vertices in pixels, in buffer order. They
    /// are only requested when an upload is needed.
    ///
    /// The first draw in a frame writes the shape's own buffers. A repeat draw
    /// in the same frame must not touch them, since the earlier draw still reads
    /// them; whatever changed since goes to the frame's transient storage.
    pub(super) fn draw<I>(
        &mut self,
        canvas: &mut Canvas<'_, B>,
        state: ShapeState,
        corners: impl FnOnce() -> I,
    ) -> Result<DrawOutcome>
    where
        I: IntoIterator<Item = Vec2>,
    {
        if state != ShapeState::Ready {
            if !self.warned_not_ready {
                log::debug!("{} drawn before it was ready ({state:?}); skipping", self.kind);
                self.warned_not_ready = true;
            }
            return Ok(DrawOutcome::Skipped(state));
        }

        let viewport = canvas.viewport().validated()?;
        let frame = canvas.frame();

        let gfx = &mut *canvas.gfx;
        let program_id = gfx.shaders.program_id(self.kind);
        let program = gfx
            .shaders
            .program(program_id)
            .ok_or_else(|| PixeletError::Link(format!("no program registered for {}", self.kind)))?;

        let kind = self.kind;
        let backend = &mut gfx.backend;
        let gpu = self.gpu.get_or_insert_with(|| {
            let label = kind.to_string();
            ShapeGpu {
                geometry: GeometryBuffer::new(
                    backend,
                    &label,
                    AttributeLayout::POSITION,
                    kind.vertex_count(),
                    kind.indices(),
                ),
                uniforms: backend.create_uniforms(&label, program),
                program: program_id,
                uploaded_for: None,
                written: None,
            }
        });

        if gpu.program != program_id {
            log::debug!("{kind} rebinding uniforms to program {}", program_id.index());
            gpu.uniforms = gfx.backend.create_uniforms(&kind.to_string(), program);
            gpu.program = program_id;
            gpu.written = None;
        }

        let repeat = self.last_frame.replace(frame) == Some(frame);

        let mut transient_vertices = None;
        if self.dirty || gpu.uploaded_for != Some(viewport) {
            let vertices: Vec<f32> = corners()
                .into_iter()
                .flat_map(|p| {
                    let ndc = viewport.to_ndc(p);
                    [ndc.x, ndc.y, 0.0]
                })
                .collect();
            if repeat {
                // Stays dirty: the next frame refreshes the owned buffer.
                transient_vertices = Some(gfx.backend.push_vertices(&vertices));
            } else {
                gpu.geometry.upload(&mut gfx.backend, &vertices)?;
                gpu.uploaded_for = Some(viewport);
                self.dirty = false;
            }
        }

        let values = ShapeUniforms::new(self.fill.to_array(), [self.scale.x, self.scale.y]);
        let mut transient_uniforms = None;
        if !repeat {
            gfx.backend.write_uniforms(&gpu.uniforms, &values);
            gpu.written = Some(values);
        } else if gpu.written != Some(values) {
            transient_uniforms = Some(gfx.backend.push_uniforms(&values));
        }

        let uniforms = match transient_uniforms {
            Some(offset) => UniformSlice {
                block: gfx.backend.transient_uniforms(),
                offset,
            },
            None => UniformSlice::whole(&gpu.uniforms),
        };
        let call = gpu.geometry.draw_call(program, uniforms);
        let call = match transient_vertices {
            Some(offset) => DrawCall {
                vertices: VertexSlice {
                    buffer: gfx.backend.transient_vertex_buffer(),
                    offset,
                },
                ..call
            },
            None => call,
        };

        canvas.target.draw(call);
        Ok(DrawOutcome::Drawn)
    }

    /// True once GPU resources exist.
    #[cfg(test)]
    pub(super) fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }
}
