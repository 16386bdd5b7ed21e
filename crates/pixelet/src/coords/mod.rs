//! Coordinate types and the pixel-to-NDC mapping.
//!
//! Application space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Device space is NDC: origin at the center, +Y up, [-1, 1] on both axes.
//! Shapes convert on the CPU before uploading vertices, using the viewport
//! carried by the drawing context.

mod ndc;
mod vec2;
mod viewport;

pub use ndc::{convert, from_ndc_x, from_ndc_y, to_ndc_x, to_ndc_y, Axis};
pub use vec2::Vec2;
pub use viewport::Viewport;
