use crate::coords::{Vec2, Viewport};
use crate::error::{PixeletError, Result};
use crate::paint::Color;
use crate::shader::{ProgramId, ShaderRegistry, ShaderSource};
use crate::shapes::{ShapeKind, QUAD_INDICES};

use super::backend::{Backend, DrawCall, DrawTarget, Primitive, ShapeUniforms, UniformSlice, VertexSlice};

/// Long-lived drawing context: backend, compiled programs, current viewport.
///
/// One exists per window. It replaces process-wide state: everything a shape
/// needs to turn pixels into a draw call is reachable from here, including the
/// fill color used by the immediate-mode calls on [`Canvas`].
pub struct Gfx<B: Backend> {
    pub(crate) backend: B,
    pub(crate) shaders: ShaderRegistry<B>,
    pub(crate) viewport: Viewport,
    pub(crate) frame: u64,
    fill: Color,
    /// Index buffer for immediate-mode rects, created on first use.
    quad_indices: Option<B::Buffer>,
}

impl<B: Backend> Gfx<B> {
    /// Compiles the built-in programs and wraps `backend`.
    pub fn new(mut backend: B, viewport: Viewport) -> Result<Self> {
        let shaders = ShaderRegistry::load(&mut backend)?;
        Ok(Self {
            backend,
            shaders,
            viewport,
            frame: 0,
            fill: Color::WHITE,
            quad_indices: None,
        })
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Updates the conversion basis. Shapes re-upload on their next draw.
    #[inline]
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Fill color for [`Canvas::rect`] and [`Canvas::triangle`]. Persists
    /// across frames.
    #[inline]
    pub fn fill(&self) -> Color {
        self.fill
    }

    /// Compiles `source` and makes it the program for `kind`.
    ///
    /// Shapes of that kind switch over on their next draw.
    pub fn register_shader(&mut self, kind: ShapeKind, source: &ShaderSource) -> Result<ProgramId> {
        self.shaders.register(&mut self.backend, kind, source)
    }

    #[inline]
    pub fn shaders(&self) -> &ShaderRegistry<B> {
        &self.shaders
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Starts a frame and pairs this context with its draw target.
    ///
    /// Every canvas is a new frame: transient storage from the previous one is
    /// recycled.
    pub fn canvas<'a>(&'a mut self, target: &'a mut dyn DrawTarget<B>) -> Canvas<'a, B> {
        self.frame = self.frame.wrapping_add(1);
        self.backend.begin_frame();
        Canvas { gfx: self, target }
    }
}

/// Per-frame drawing surface handed to shapes.
///
/// Besides retained [`Shape`](crate::shapes::Shape)s, it draws immediate-mode
/// rects and triangles with the context's fill color. Draws execute in call
/// order.
pub struct Canvas<'a, B: Backend> {
    pub(crate) gfx: &'a mut Gfx<B>,
    pub(crate) target: &'a mut dyn DrawTarget<B>,
}

impl<'a, B: Backend> Canvas<'a, B> {
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.gfx.viewport
    }

    /// Identifies the frame this canvas draws.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.gfx.frame
    }

    #[inline]
    pub fn gfx(&mut self) -> &mut Gfx<B> {
        &mut *self.gfx
    }

    /// Sets the fill color for the following immediate-mode draws.
    #[inline]
    pub fn fill(&mut self, color: Color) {
        self.gfx.fill = color;
    }

    /// Paints the whole viewport with `color`, covering everything drawn so
    /// far this frame. The fill color is left alone.
    pub fn background(&mut self, color: Color) -> Result<()> {
        let Viewport { width, height } = self.viewport();
        self.immediate(ShapeKind::Rect, color, &rect_corners(0.0, 0.0, width, height))
    }

    /// Draws a filled `width` x `height` rect with its top-left at `(x, y)`.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        let fill = self.gfx.fill;
        self.immediate(ShapeKind::Rect, fill, &rect_corners(x, y, width, height))
    }

    /// Draws a filled triangle.
    pub fn triangle(&mut self, p1: impl Into<Vec2>, p2: impl Into<Vec2>, p3: impl Into<Vec2>) -> Result<()> {
        let fill = self.gfx.fill;
        self.immediate(ShapeKind::Triangle, fill, &[p1.into(), p2.into(), p3.into()])
    }

    /// One draw whose vertices and uniforms live only in this frame's
    /// transient storage.
    fn immediate(&mut self, kind: ShapeKind, color: Color, corners: &[Vec2]) -> Result<()> {
        let viewport = self.viewport().validated()?;
        let gfx = &mut *self.gfx;

        if kind.indices().is_some() && gfx.quad_indices.is_none() {
            gfx.quad_indices = Some(gfx.backend.create_index_buffer("pixelet immediate quad", &QUAD_INDICES));
        }

        let vertices: Vec<f32> = corners
            .iter()
            .flat_map(|&p| {
                let ndc = viewport.to_ndc(p);
                [ndc.x, ndc.y, 0.0]
            })
            .collect();
        let vertex_offset = gfx.backend.push_vertices(&vertices);
        let uniform_offset = gfx
            .backend
            .push_uniforms(&ShapeUniforms::new(color.to_array(), [1.0, 1.0]));

        let program = gfx
            .shaders
            .program(gfx.shaders.program_id(kind))
            .ok_or_else(|| PixeletError::Link(format!("no program registered for {kind}")))?;

        let primitive = match (&gfx.quad_indices, kind.indices()) {
            (Some(indices), Some(list)) => Primitive::IndexedTriangles {
                indices,
                index_count: list.len() as u32,
            },
            _ => Primitive::Triangles {
                vertex_count: kind.vertex_count(),
            },
        };

        self.target.draw(DrawCall {
            program,
            uniforms: UniformSlice {
                block: gfx.backend.transient_uniforms(),
                offset: uniform_offset,
            },
            vertices: VertexSlice {
                buffer: gfx.backend.transient_vertex_buffer(),
                offset: vertex_offset,
            },
            primitive,
        });
        Ok(())
    }
}

/// Top-left, top-right, bottom-left, bottom-right.
pub(crate) fn rect_corners(x: f32, y: f32, width: f32, height: f32) -> [Vec2; 4] {
    [
        Vec2::new(x, y),
        Vec2::new(x + width, y),
        Vec2::new(x, y + height),
        Vec2::new(x + width, y + height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{Op, RecordingBackend, TRANSIENT_UNIFORM_STRIDE};

    fn gfx(w: f32, h: f32) -> Gfx<RecordingBackend> {
        Gfx::new(RecordingBackend::new(), Viewport::new(w, h)).unwrap()
    }

    fn pushed_vertices(ops: &[Op]) -> Vec<(u64, Vec<f32>)> {
        ops.iter()
            .filter_map(|op| match op {
                Op::PushVertices { offset, floats } => Some((*offset, floats.clone())),
                _ => None,
            })
            .collect()
    }

    fn pushed_colors(ops: &[Op]) -> Vec<[f32; 4]> {
        ops.iter()
            .filter_map(|op| match op {
                Op::PushUniforms { values, .. } => Some(values.color),
                _ => None,
            })
            .collect()
    }

    fn draw_offsets(ops: &[Op]) -> Vec<(u64, u32)> {
        ops.iter()
            .filter_map(|op| match op {
                Op::Draw {
                    vertex_offset,
                    uniform_offset,
                    ..
                } => Some((*vertex_offset, *uniform_offset)),
                _ => None,
            })
            .collect()
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn every_canvas_is_a_new_frame() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let first = gfx.canvas(&mut target).frame();
        let second = gfx.canvas(&mut target).frame();
        assert_ne!(first, second);
    }

    #[test]
    fn transient_offsets_rewind_each_frame() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        gfx.canvas(&mut target).rect(0.0, 0.0, 10.0, 10.0).unwrap();
        gfx.canvas(&mut target).rect(0.0, 0.0, 10.0, 10.0).unwrap();

        assert_eq!(draw_offsets(&gfx.backend().ops()), vec![(0, 0), (0, 0)]);
    }

    // ── immediate mode ────────────────────────────────────────────────────

    #[test]
    fn immediate_rects_in_one_frame_bind_distinct_data() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();
        {
            let mut canvas = gfx.canvas(&mut target);
            canvas.fill(Color::rgb(255.0, 0.0, 0.0));
            canvas.rect(0.0, 0.0, 50.0, 50.0).unwrap();
            canvas.fill(Color::rgb(0.0, 0.0, 255.0));
            canvas.rect(50.0, 50.0, 50.0, 50.0).unwrap();
        }

        let ops = gfx.backend().ops();
        let pushed = pushed_vertices(&ops);
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0].1[..3], [-1.0, 1.0, 0.0]);
        assert_eq!(pushed[1].1[..3], [0.0, 0.0, 0.0]);
        assert_eq!(pushed_colors(&ops), vec![[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]);

        // 4 vertices * 3 floats * 4 bytes.
        assert_eq!(draw_offsets(&ops), vec![(0, 0), (48, TRANSIENT_UNIFORM_STRIDE)]);
    }

    #[test]
    fn immediate_rects_share_one_index_buffer() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();
        for _ in 0..3 {
            gfx.canvas(&mut target).rect(1.0, 1.0, 2.0, 2.0).unwrap();
        }

        let ops = gfx.backend().ops();
        let index_buffers = ops
            .iter()
            .filter(|op| matches!(op, Op::CreateIndexBuffer { .. }))
            .count();
        assert_eq!(index_buffers, 1);
        assert!(!ops.iter().any(|op| matches!(op, Op::CreateVertexBuffer { .. })));
        assert_eq!(crate::render::recording::draws(&ops).len(), 3);
    }

    #[test]
    fn immediate_triangle_is_non_indexed() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();
        gfx.canvas(&mut target)
            .triangle((50.0, 0.0), (0.0, 100.0), (100.0, 100.0))
            .unwrap();

        let ops = gfx.backend().ops();
        assert_eq!(
            crate::render::recording::draws(&ops),
            vec![crate::render::recording::RecordedPrimitive::Triangles { vertex_count: 3 }]
        );
        assert_eq!(
            pushed_vertices(&ops)[0].1,
            vec![0.0, 1.0, 0.0, -1.0, -1.0, 0.0, 1.0, -1.0, 0.0]
        );
    }

    #[test]
    fn fill_defaults_to_white_and_persists_across_frames() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();
        assert_eq!(gfx.fill(), Color::WHITE);

        gfx.canvas(&mut target).fill(Color::rgb(0.0, 255.0, 0.0));
        gfx.canvas(&mut target).rect(0.0, 0.0, 1.0, 1.0).unwrap();

        assert_eq!(pushed_colors(&gfx.backend().ops()), vec![[0.0, 1.0, 0.0, 1.0]]);
    }

    #[test]
    fn background_covers_the_viewport_without_touching_fill() {
        let mut gfx = gfx(200.0, 100.0);
        let mut target = gfx.backend().target();
        gfx.canvas(&mut target)
            .background(Color::rgb(0.0, 0.0, 0.0))
            .unwrap();

        let ops = gfx.backend().ops();
        assert_eq!(
            pushed_vertices(&ops)[0].1,
            vec![-1.0, 1.0, 0.0, 1.0, 1.0, 0.0, -1.0, -1.0, 0.0, 1.0, -1.0, 0.0]
        );
        assert_eq!(pushed_colors(&ops), vec![[0.0, 0.0, 0.0, 1.0]]);
        assert_eq!(gfx.fill(), Color::WHITE);
    }

    #[test]
    fn immediate_draw_needs_a_valid_viewport() {
        let mut gfx = gfx(0.0, 0.0);
        let mut target = gfx.backend().target();
        let err = gfx.canvas(&mut target).rect(0.0, 0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, PixeletError::Precondition(_)));
        assert!(crate::render::recording::draws(&gfx.backend().ops()).is_empty());
    }
}
