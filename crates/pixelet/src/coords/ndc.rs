use crate::error::PreconditionError;

use super::Viewport;

/// Axis selector for the coordinate mapper.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl TryFrom<char> for Axis {
    type Error = PreconditionError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'x' | 'X' => Ok(Axis::X),
            'y' | 'Y' => Ok(Axis::Y),
            other => Err(PreconditionError::UnsupportedAxis(other)),
        }
    }
}

/// Pixel x (origin left) to NDC x (origin center).
#[inline]
pub fn to_ndc_x(px: f32, width: f32) -> f32 {
    px / width * 2.0 - 1.0
}

/// Pixel y (grows down) to NDC y (grows up).
#[inline]
pub fn to_ndc_y(px: f32, height: f32) -> f32 {
    -(px / height * 2.0 - 1.0)
}

/// Inverse of [`to_ndc_x`].
#[inline]
pub fn from_ndc_x(ndc: f32, width: f32) -> f32 {
    (ndc + 1.0) / 2.0 * width
}

/// Inverse of [`to_ndc_y`].
#[inline]
pub fn from_ndc_y(ndc: f32, height: f32) -> f32 {
    (1.0 - ndc) / 2.0 * height
}

/// Converts one coordinate selected by an axis character (`'x'` or `'y'`).
///
/// Fails on any other selector and on a viewport without a positive finite size.
pub fn convert(axis: char, coord: f32, viewport: Viewport) -> Result<f32, PreconditionError> {
    let axis = Axis::try_from(axis)?;
    let viewport = viewport.validated()?;
    Ok(match axis {
        Axis::X => to_ndc_x(coord, viewport.width),
        Axis::Y => to_ndc_y(coord, viewport.height),
    })
}
