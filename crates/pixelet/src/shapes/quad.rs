use crate::coords::Vec2;
use crate::error::Result;
use crate::paint::Color;
use crate::render::{Backend, Canvas, WgpuBackend};

use super::common::ShapeCore;
use super::{DrawOutcome, Shape, ShapeKind, ShapeState};

/// Filled quadrilateral given by four corners in perimeter order.
///
/// Corners p1..p4 are stored as `[p1, p2, p4, p3]` so that
/// [`QUAD_INDICES`](super::QUAD_INDICES) splits the quad along p2-p4.
pub struct Quad<B: Backend = WgpuBackend> {
    core: ShapeCore<B>,
    corners: Option<[Vec2; 4]>,
}

impl<B: Backend> Quad<B> {
    pub fn new() -> Self {
        Self {
            core: ShapeCore::new(ShapeKind::Quad),
            corners: None,
        }
    }

    pub fn with_corners(
        p1: impl Into<Vec2>,
        p2: impl Into<Vec2>,
        p3: impl Into<Vec2>,
        p4: impl Into<Vec2>,
    ) -> Self {
        let mut q = Self::new();
        q.set_position(p1, p2, p3, p4);
        q
    }

    /// Sets the four corners, walking the perimeter.
    pub fn set_position(
        &mut self,
        p1: impl Into<Vec2>,
        p2: impl Into<Vec2>,
        p3: impl Into<Vec2>,
        p4: impl Into<Vec2>,
    ) {
        self.corners = Some([p1.into(), p2.into(), p4.into(), p3.into()]);
        self.core.mark_dirty();
    }

    /// Corners in perimeter order.
    pub fn corners(&self) -> Option<[Vec2; 4]> {
        self.corners.map(|[v0, v1, v2, v3]| [v0, v1, v3, v2])
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
}

impl<B: Backend> Default for Quad<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Shape<B> for Quad<B> {
    #[inline]
    fn kind(&self) -> ShapeKind {
        self.core.kind()
    }

    fn state(&self) -> ShapeState {
        match self.corners {
            Some(_) => ShapeState::Ready,
            None => ShapeState::Uninitialized,
        }
    }

    fn draw(&mut self, canvas: &mut Canvas<'_, B>) -> Result<DrawOutcome> {
        let state = self.state();
        let corners = self.corners.unwrap_or_default();
        self.core.draw(canvas, state, || corners)
    }
}
