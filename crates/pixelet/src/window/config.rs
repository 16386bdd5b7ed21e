use winit::dpi::{LogicalPosition, LogicalSize};
use winit::window::{Window as NativeWindow, WindowAttributes};

use crate::paint::Color;

/// Window options for [`Window::with_config`](super::Window::with_config).
///
/// Sizes and positions are logical pixels.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Outer top-left corner. `None` lets the platform place the window.
    pub position: Option<(f32, f32)>,
    pub size: (f32, f32),
    pub min_size: Option<(f32, f32)>,
    pub max_size: Option<(f32, f32)>,
    pub resizable: bool,
    /// Clear color for every frame.
    pub background: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "pixelet".to_string(),
            position: None,
            size: (800.0, 600.0),
            min_size: None,
            max_size: None,
            resizable: true,
            background: Color::BLACK,
        }
    }
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            title: title.into(),
            size: (width, height),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_size_limits(mut self, min: Option<(f32, f32)>, max: Option<(f32, f32)>) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    pub(crate) fn attributes(&self) -> WindowAttributes {
        let (w, h) = self.size;
        let mut attrs = NativeWindow::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(w, h))
            .with_resizable(self.resizable);

        if let Some((x, y)) = self.position {
            attrs = attrs.with_position(LogicalPosition::new(x, y));
        }
        if let Some((w, h)) = self.min_size {
            attrs = attrs.with_min_inner_size(LogicalSize::new(w, h));
        }
        if let Some((w, h)) = self.max_size {
            attrs = attrs.with_max_inner_size(LogicalSize::new(w, h));
        }
        attrs
    }
}

/// Largest extent used when only one side of a maximum is given.
const UNBOUNDED: f32 = u16::MAX as f32;

/// Turns a `(min_w, min_h, max_w, max_h)` request into winit limits.
///
/// A non-positive (or non-finite) value means "no limit" on that side, and a
/// pair with no limits at all becomes `None`.
pub(crate) fn size_limits(
    min_w: f32,
    min_h: f32,
    max_w: f32,
    max_h: f32,
) -> (Option<LogicalSize<f32>>, Option<LogicalSize<f32>>) {
    let limit = |v: f32| (v.is_finite() && v > 0.0).then_some(v);

    let min = match (limit(min_w), limit(min_h)) {
        (None, None) => None,
        (w, h) => Some(LogicalSize::new(w.unwrap_or(0.0), h.unwrap_or(0.0))),
    };
    let max = match (limit(max_w), limit(max_h)) {
        (None, None) => None,
        (w, h) => Some(LogicalSize::new(w.unwrap_or(UNBOUNDED), h.unwrap_or(UNBOUNDED))),
    };
    (min, max)
}
