//! Pixelet: a window, filled triangles, rects and quads, and input.
//!
//! Open a [`Window`], build shapes in pixel coordinates, and draw them inside
//! [`Window::render`]. Everything a shape needs to reach the GPU travels through
//! the [`Canvas`] handed to that closure; there is no global state. The canvas
//! also draws immediate-mode rects and triangles with its fill color.

pub mod coords;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod shader;
pub mod shapes;
pub mod time;
pub mod window;

pub use coords::{Vec2, Viewport};
pub use error::{PixeletError, PreconditionError, Result, ShaderStage};
pub use input::{Key, MouseButton};
pub use paint::Color;
pub use render::{Canvas, Gfx};
pub use shader::ShaderSource;
pub use shapes::{DrawOutcome, Quad, Rect, Shape, ShapeKind, ShapeState, Triangle};
pub use time::{FrameClock, FrameTime};
pub use window::{Window, WindowConfig};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
