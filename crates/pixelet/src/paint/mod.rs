//! Fill colors.
//!
//! Colors are straight (non-premultiplied) RGBA in [0, 1]. Pipelines blend with
//! standard alpha blending.

pub mod color;

pub use color::Color;
