//! The application window.
//!
//! Owns the winit event loop and native window, the GPU surface, the drawing
//! context and input. Events are pumped on demand instead of handing control
//! to winit.

mod config;
mod runtime;

pub use config::WindowConfig;
pub use runtime::Window;
