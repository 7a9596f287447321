/// Normalised RGBA colour (each channel in `[0.0, 1.0]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED:    Self = Self { r: 0.953, g: 0.545, b: 0.659, a: 1.0 }; // #f38ba8
    pub const GREEN:  Self = Self { r: 0.651, g: 0.890, b: 0.631, a: 1.0 }; // #a6e3a1
    pub const BLUE:   Self = Self { r: 0.537, g: 0.706, b: 0.980, a: 1.0 }; // #89b4fa
    pub const PEACH:  Self = Self { r: 0.980, g: 0.702, b: 0.529, a: 1.0 }; // #fab387
    pub const PURPLE: Self = Self { r: 0.796, g: 0.651, b: 0.969, a: 1.0 }; // #cba6f7
    pub const WHITE:  Self = Self { r: 0.804, g: 0.839, b: 0.957, a: 1.0 }; // #cdd6f4

    /// Parse a CSS-style hex color string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| -> Option<f32> { u8::from_str_radix(s, 16).ok().map(|b| b as f32 / 255.0) };

        match hex.len() {
            6 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: 1.0,
            }),
            8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    /// Straight (non-premultiplied) 8-bit channels.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Convert to a [`tiny_skia::Color`] for drawing.
    #[inline]
    pub fn to_skia(self) -> tiny_skia::Color {
        let [r, g, b, a] = self.to_rgba8();
        tiny_skia::Color::from_rgba8(r, g, b, a)
    }

    /// Return a copy with the alpha channel set to `alpha`.
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// Utilisation heat ramp: green at 0 %, yellow at 50 %, red at 100 %.
    ///
    /// Red rises over the first half, green falls over the second; blue stays
    /// zero throughout.
    pub fn heat(percent: f32) -> Self {
        let p = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        let (r, g) = if p <= 50.0 {
            (p / 50.0, 1.0)
        } else {
            (1.0, (100.0 - p) / 50.0)
        };
        Self { r, g, b: 0.0, a: 1.0 }
    }
}
