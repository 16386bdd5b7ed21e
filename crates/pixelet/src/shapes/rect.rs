use crate::coords::Vec2;
use crate::error::Result;
use crate::paint::Color;
use crate::render::{rect_corners, Backend, Canvas, WgpuBackend};

use super::common::ShapeCore;
use super::{DrawOutcome, Shape, ShapeKind, ShapeState};

/// Axis-aligned filled rectangle: top-left origin plus size, in pixels.
///
/// Position and size may be set in either order; the rect draws once both are
/// known. Corners are rebuilt from the current origin and size on every upload.
pub struct Rect<B: Backend = WgpuBackend> {
    core: ShapeCore<B>,
    origin: Option<Vec2>,
    size: Option<Vec2>,
}

impl<B: Backend> Rect<B> {
    pub fn new() -> Self {
        Self {
            core: ShapeCore::new(ShapeKind::Rect),
            origin: None,
            size: None,
        }
    }

    /// Ready-to-draw rect.
    pub fn with_bounds(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut r = Self::new();
        r.set_position(x, y);
        r.set_size(width, height);
        r
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.origin = Some(Vec2::new(x, y));
        self.core.mark_dirty();
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Some(Vec2::new(width, height));
        self.core.mark_dirty();
    }

    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.origin
    }

    #[inline]
    pub fn size(&self) -> Option<Vec2> {
        self.size
    }

    #[inline]
    pub fn fill(&self) -> Color {
        self.core.fill()
    }

    #[inline]
    pub fn set_fill(&mut self, color: Color) {
        self.core.set_fill(color);
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.core.scale()
    }

    #[inline]
    pub fn set_scale(&mut self, scale: impl Into<Vec2>) {
        self.core.set_scale(scale.into());
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    fn corners(origin: Vec2, size: Vec2) -> [Vec2; 4] {
        rect_corners(origin.x, origin.y, size.x, size.y)
    }
}

impl<B: Backend> Default for Rect<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Shape<B> for Rect<B> {
    #[inline]
    fn kind(&self) -> ShapeKind {
        self.core.kind()
    }

    fn state(&self) -> ShapeState {
        match (self.origin, self.size) {
            (Some(_), Some(_)) => ShapeState::Ready,
            (Some(_), None) => ShapeState::PositionSet,
            (None, Some(_)) => ShapeState::SizeSet,
            (None, None) => ShapeState::Uninitialized,
        }
    }

    fn draw(&mut self, canvas: &mut Canvas<'_, B>) -> Result<DrawOutcome> {
        let state = self.state();
        let origin = self.origin.unwrap_or_default();
        let size = self.size.unwrap_or_default();
        self.core.draw(canvas, state, || Self::corners(origin, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::error::{PixeletError, PreconditionError};
    use crate::render::recording::{draws, Op, RecordedPrimitive, RecordingBackend, Resource};
    use crate::render::Gfx;
    use crate::shader::ShaderSource;

    fn gfx(w: f32, h: f32) -> Gfx<RecordingBackend> {
        Gfx::new(RecordingBackend::new(), Viewport::new(w, h)).unwrap()
    }

    fn uploads(ops: &[Op]) -> Vec<Vec<f32>> {
        ops.iter()
            .filter_map(|op| match op {
                Op::Upload { floats, .. } => Some(floats.clone()),
                _ => None,
            })
            .collect()
    }

    // ── readiness ─────────────────────────────────────────────────────────

    #[test]
    fn position_only_rect_touches_nothing() {
        let mut gfx = gfx(200.0, 200.0);
        gfx.backend().clear();
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::new();
        r.set_position(10.0, 10.0);

        let outcome = r.draw(&mut gfx.canvas(&mut target)).unwrap();
        assert_eq!(outcome, DrawOutcome::Skipped(ShapeState::PositionSet));
        assert!(gfx.backend().ops().is_empty());
        assert!(!r.core.has_gpu());
    }

    #[test]
    fn size_then_position_becomes_ready() {
        let mut r = Rect::<RecordingBackend>::new();
        assert_eq!(r.state(), ShapeState::Uninitialized);
        r.set_size(5.0, 5.0);
        assert_eq!(r.state(), ShapeState::SizeSet);
        r.set_position(1.0, 1.0);
        assert_eq!(r.state(), ShapeState::Ready);
        assert!(r.require_ready().is_ok());
    }

    #[test]
    fn require_ready_names_kind_and_state() {
        let mut r = Rect::<RecordingBackend>::new();
        r.set_position(0.0, 0.0);
        assert_eq!(
            r.require_ready(),
            Err(PreconditionError::NotReady {
                kind: ShapeKind::Rect,
                state: ShapeState::PositionSet,
            })
        );
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn ready_rect_issues_one_indexed_draw_of_six() {
        let mut gfx = gfx(200.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::new();
        r.set_position(10.0, 10.0);
        r.set_size(50.0, 30.0);

        assert!(r.draw(&mut gfx.canvas(&mut target)).unwrap().is_drawn());
        assert!(matches!(
            draws(&gfx.backend().ops())[..],
            [RecordedPrimitive::IndexedTriangles { index_count: 6, .. }]
        ));
    }

    #[test]
    fn corners_follow_origin_and_size() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 50.0, 50.0);
        r.draw(&mut gfx.canvas(&mut target)).unwrap();

        // TL, TR, BL, BR in NDC.
        assert_eq!(
            uploads(&gfx.backend().ops()),
            vec![vec![-1.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn moving_after_sizing_keeps_the_size() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 50.0, 50.0);
        r.draw(&mut gfx.canvas(&mut target)).unwrap();
        r.set_position(50.0, 50.0);
        r.draw(&mut gfx.canvas(&mut target)).unwrap();

        let last = uploads(&gfx.backend().ops()).pop().unwrap();
        assert_eq!(last, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, -1.0, 0.0]);
    }

    #[test]
    fn viewport_change_forces_reupload() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 50.0, 50.0);
        r.draw(&mut gfx.canvas(&mut target)).unwrap();
        r.draw(&mut gfx.canvas(&mut target)).unwrap();
        assert_eq!(uploads(&gfx.backend().ops()).len(), 1);

        gfx.set_viewport(Viewport::new(200.0, 200.0));
        r.draw(&mut gfx.canvas(&mut target)).unwrap();

        let all = uploads(&gfx.backend().ops());
        assert_eq!(all.len(), 2);
        assert_eq!(&all[1][..3], &[-1.0, 1.0, 0.0]);
        assert_eq!(&all[1][3..6], &[-0.5, 1.0, 0.0]);
    }

    #[test]
    fn zero_viewport_is_a_precondition_error() {
        let mut gfx = gfx(0.0, 100.0);
        let mut target = gfx.backend().target();
        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 1.0, 1.0);

        let err = r.draw(&mut gfx.canvas(&mut target)).unwrap_err();
        assert!(matches!(
            err,
            PixeletError::Precondition(PreconditionError::InvalidViewport { .. })
        ));
    }

    // ── repeat draws in one frame ─────────────────────────────────────────

    /// (vertex buffer, vertex offset, uniform block, uniform offset) per draw.
    fn draw_bindings(ops: &[Op]) -> Vec<(u32, u64, u32, u32)> {
        ops.iter()
            .filter_map(|op| match op {
                Op::Draw {
                    vertices,
                    vertex_offset,
                    uniforms,
                    uniform_offset,
                    ..
                } => Some((*vertices, *vertex_offset, *uniforms, *uniform_offset)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn moving_between_draws_in_one_frame_binds_distinct_vertices() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();
        let transient = gfx.backend().transient_vertices_id();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 50.0, 50.0);
        {
            let mut canvas = gfx.canvas(&mut target);
            r.draw(&mut canvas).unwrap();
            r.set_position(50.0, 50.0);
            r.draw(&mut canvas).unwrap();
        }

        let ops = gfx.backend().ops();
        // The owned buffer keeps the first position; the second draw reads its own copy.
        assert_eq!(uploads(&ops), vec![vec![-1.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
        let pushed: Vec<Vec<f32>> = ops
            .iter()
            .filter_map(|op| match op {
                Op::PushVertices { floats, .. } => Some(floats.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(pushed, vec![vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, -1.0, 0.0]]);

        let bindings = draw_bindings(&ops);
        assert_eq!(bindings.len(), 2);
        assert_ne!(bindings[0].0, transient);
        assert_eq!(bindings[1].0, transient);
    }

    #[test]
    fn refill_between_draws_in_one_frame_binds_distinct_uniforms() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();
        let transient = gfx.backend().transient_uniforms_id();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 10.0, 10.0);
        r.set_fill(Color::rgb(255.0, 0.0, 0.0));
        {
            let mut canvas = gfx.canvas(&mut target);
            r.draw(&mut canvas).unwrap();
            r.set_fill(Color::rgb(0.0, 255.0, 0.0));
            r.draw(&mut canvas).unwrap();
        }

        let ops = gfx.backend().ops();
        let written: Vec<[f32; 4]> = ops
            .iter()
            .filter_map(|op| match op {
                Op::WriteUniforms { values, .. } => Some(values.color),
                _ => None,
            })
            .collect();
        let pushed: Vec<[f32; 4]> = ops
            .iter()
            .filter_map(|op| match op {
                Op::PushUniforms { values, .. } => Some(values.color),
                _ => None,
            })
            .collect();
        assert_eq!(written, vec![[1.0, 0.0, 0.0, 1.0]]);
        assert_eq!(pushed, vec![[0.0, 1.0, 0.0, 1.0]]);

        let bindings = draw_bindings(&ops);
        assert_ne!(bindings[0].2, transient);
        assert_eq!(bindings[1].2, transient);
    }

    #[test]
    fn unchanged_repeat_draw_reuses_owned_buffers() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 10.0, 10.0);
        {
            let mut canvas = gfx.canvas(&mut target);
            r.draw(&mut canvas).unwrap();
            r.draw(&mut canvas).unwrap();
        }

        let ops = gfx.backend().ops();
        assert!(!ops
            .iter()
            .any(|op| matches!(op, Op::PushVertices { .. } | Op::PushUniforms { .. })));
        let bindings = draw_bindings(&ops);
        assert_eq!(bindings[0], bindings[1]);
    }

    #[test]
    fn next_frame_refreshes_owned_buffer_after_a_spill() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(0.0, 0.0, 50.0, 50.0);
        {
            let mut canvas = gfx.canvas(&mut target);
            r.draw(&mut canvas).unwrap();
            r.set_position(50.0, 50.0);
            r.draw(&mut canvas).unwrap();
        }
        gfx.backend().clear();
        r.draw(&mut gfx.canvas(&mut target)).unwrap();

        let ops = gfx.backend().ops();
        assert_eq!(
            uploads(&ops),
            vec![vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, -1.0, 0.0]]
        );
        assert!(!ops.iter().any(|op| matches!(op, Op::PushVertices { .. })));
    }

    // ── resources ─────────────────────────────────────────────────────────

    #[test]
    fn dropping_a_rect_releases_everything_it_created() {
        let mut gfx = gfx(100.0, 100.0);
        gfx.backend().clear();
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(1.0, 1.0, 2.0, 2.0);
        r.draw(&mut gfx.canvas(&mut target)).unwrap();
        drop(r);

        let ops = gfx.backend().ops();
        let mut created: Vec<Resource> = ops
            .iter()
            .filter_map(|op| match op {
                Op::CreateVertexBuffer { id, .. } | Op::CreateIndexBuffer { id, .. } => {
                    Some(Resource::Buffer(*id))
                }
                Op::CreateUniforms { id, .. } => Some(Resource::Uniforms(*id)),
                _ => None,
            })
            .collect();
        let mut released: Vec<Resource> = ops
            .iter()
            .filter_map(|op| match op {
                Op::Release(r) => Some(*r),
                _ => None,
            })
            .collect();

        let key = |r: &Resource| format!("{r:?}");
        created.sort_by_key(key);
        released.sort_by_key(key);
        assert_eq!(created.len(), 3);
        assert_eq!(created, released);
    }

    #[test]
    fn registering_a_shader_rebinds_uniforms() {
        let mut gfx = gfx(100.0, 100.0);
        let mut target = gfx.backend().target();

        let mut r = Rect::<RecordingBackend>::with_bounds(1.0, 1.0, 2.0, 2.0);
        r.draw(&mut gfx.canvas(&mut target)).unwrap();

        let id = gfx
            .register_shader(ShapeKind::Rect, &ShaderSource::solid_fill())
            .unwrap();
        gfx.backend().clear();
        r.draw(&mut gfx.canvas(&mut target)).unwrap();

        let ops = gfx.backend().ops();
        let new_program = match ops.iter().find(|op| matches!(op, Op::CreateUniforms { .. })) {
            Some(Op::CreateUniforms { program, .. }) => *program,
            other => panic!("expected a new uniform block, got {other:?}"),
        };
        assert!(matches!(ops.iter().find(|op| matches!(op, Op::Draw { .. })),
            Some(Op::Draw { program, .. }) if *program == new_program));
        assert!(ops.iter().any(|op| matches!(op, Op::Release(Resource::Uniforms(_)))));
        assert_eq!(gfx.shaders().program_id(ShapeKind::Rect), id);
    }
}
