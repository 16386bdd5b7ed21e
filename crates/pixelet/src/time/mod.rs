//! Frame timing.
//!
//! One [`FrameClock`] per window: [`Window::poll_and_swap`](crate::Window::poll_and_swap)
//! ticks it once per loop iteration, and the frame rate is reported once per
//! second of wall time.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
