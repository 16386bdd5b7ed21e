/// Straight-alpha RGBA color with channels in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_unit(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::from_unit(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::from_unit(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from channels already in [0, 1].
    #[inline]
    pub const fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from `0`–`255` channel values.
    #[inline]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 255.0)
    }

    /// Creates a color from `0`–`255` channel values.
    ///
    /// Channels are divided by 255 in floating point, so fractional inputs keep
    /// their precision and `255` maps to exactly `1.0`. Results are clamped to [0, 1].
    #[inline]
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: channel(a),
        }
    }

    /// Creates a color from bytes, e.g. a hex literal split into channels.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(r as f32, g as f32, b as f32, a as f32)
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: channel(a), ..self }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl Default for Color {
    /// Opaque white, the initial fill of every shape.
    fn default() -> Self {
        Color::WHITE
    }
}

#[inline]
fn channel(v: f32) -> f32 {
    (v / 255.0).clamp(0.0, 1.0)
}
