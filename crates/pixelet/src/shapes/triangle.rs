use crate::coords::Vec2;
use crate::error::Result;
use crate::paint::Color;
use crate::render::{Backend, Canvas, WgpuBackend};

use super::common::ShapeCore;
use super::{DrawOutcome, Shape, ShapeKind, ShapeState};

/// Filled triangle given by three pixel-space corners.
///
/// Drawn as one non-indexed triangle.
pub struct Triangle<B: Backend = WgpuBackend> {
    core: ShapeCore<B>,
    points: Option<[Vec2; 3]>,
}

impl<B: Backend> Triangle<B> {
    pub fn new() -> Self {
        Self {
            core: ShapeCore::new(ShapeKind::Triangle),
            points: None,
        }
    }

    /// Ready-to-draw triangle.
    pub fn with_points(p1: impl Into<Vec2>, p2: impl Into<Vec2>, p3: impl Into<Vec2>) -> Self {
        let mut t = Self::new();
        t.set_position(p1, p2, p3);
        t
    }

    pub fn set_position(&mut self, p1: impl Into<Vec2>, p2: impl Into<Vec2>, p3: impl Into<Vec2>) {
        self.points = Some([p1.into(), p2.into(), p3.into()]);
        self.core.mark_dirty();
    }

    #[inline]
    pub fn points(&self) -> Option<[Vec2; 3]> {
        self.points
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

impl<B: Backend> Default for Triangle<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Shape<B> for Triangle<B> {
    #[inline]
    fn kind(&self) -> ShapeKind {
        self.core.kind()
    }

    fn state(&self) -> ShapeState {
        match self.points {
            Some(_) => ShapeState::Ready,
            None => ShapeState::Uninitialized,
        }
    }

    fn draw(&mut self, canvas: &mut Canvas<'_, B>) -> Result<DrawOutcome> {
        let state = self.state();
        let points = self.points.unwrap_or_default();
        self.core.draw(canvas, state, || points)
    }
}
