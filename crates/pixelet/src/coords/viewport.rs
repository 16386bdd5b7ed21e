use crate::error::PreconditionError;

use super::ndc::{to_ndc_x, to_ndc_y};
use super::Vec2;

/// Drawable size in logical pixels.
///
/// This is the basis for converting pixel positions to NDC. The window refreshes
/// it before every frame and hands it to shapes through the drawing context.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns `self` if it can be used as a conversion basis.
    pub fn validated(self) -> Result<Self, PreconditionError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(PreconditionError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Maps a pixel position to NDC.
    #[inline]
    pub fn to_ndc(self, p: Vec2) -> Vec2 {
        Vec2::new(to_ndc_x(p.x, self.width), to_ndc_y(p.y, self.height))
    }
}
