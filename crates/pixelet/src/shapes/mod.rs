//! Drawable shapes.
//!
//! Every shape is built incrementally: create it, give it a position (and a
//! size for [`Rect`]), then draw it through a [`Canvas`] each frame. GPU
//! resources are created on the first draw that finds the shape ready, and are
//! released when the shape is dropped.

mod common;

pub mod quad;
pub mod rect;
pub mod triangle;

use core::fmt;

use crate::error::{PreconditionError, Result};
use crate::render::{Backend, Canvas, WgpuBackend};

pub use quad::Quad;
pub use rect::Rect;
pub use triangle::Triangle;

/// Static index topology shared by quads and rects: two triangles on the
/// v1-v2 diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 3, 2, 1];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShapeKind {
    Triangle,
    Quad,
    Rect,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Triangle, ShapeKind::Quad, ShapeKind::Rect];

    #[inline]
    pub fn vertex_count(self) -> u32 {
        match self {
            ShapeKind::Triangle => 3,
            ShapeKind::Quad | ShapeKind::Rect => 4,
        }
    }

    /// Index buffer contents, or `None` for non-indexed kinds.
    #[inline]
    pub fn indices(self) -> Option<&'static [u32]> {
        match self {
            ShapeKind::Triangle => None,
            ShapeKind::Quad | ShapeKind::Rect => Some(&QUAD_INDICES),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeKind::Triangle => "triangle",
            ShapeKind::Quad => "quad",
            ShapeKind::Rect => "rect",
        })
    }
}

/// Readiness of a shape's geometry.
///
/// Triangles and quads go straight from `Uninitialized` to `Ready` once their
/// corners are set. Rects need a position and a size, in either order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShapeState {
    Uninitialized,
    PositionSet,
    SizeSet,
    Ready,
}

/// Result of a [`Shape::draw`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    Drawn,
    /// The shape was not ready; nothing reached the GPU.
    Skipped(ShapeState),
}

impl DrawOutcome {
    #[inline]
    pub fn is_drawn(self) -> bool {
        self == DrawOutcome::Drawn
    }
}

pub trait Shape<B: Backend = WgpuBackend> {
    fn kind(&self) -> ShapeKind;

    fn state(&self) -> ShapeState;

    /// Records this shape into the canvas's frame.
    ///
    /// A shape that is not ready is skipped without error; see
    /// [`require_ready`](Self::require_ready) for the strict check.
    fn draw(&mut self, canvas: &mut Canvas<'_, B>) -> Result<DrawOutcome>;

    #[inline]
    fn is_ready(&self) -> bool {
        self.state() == ShapeState::Ready
    }

    fn require_ready(&self) -> Result<(), PreconditionError> {
        match self.state() {
            ShapeState::Ready => Ok(()),
            state => Err(PreconditionError::NotReady {
                kind: self.kind(),
                state,
            }),
        }
    }
}
