use tiny_skia::Pixmap;

/// Alpha of "empty" background pixels.
///
/// A layered window passes mouse input through pixels whose alpha is 0, so the
/// background is painted at 1/255: invisible, yet still clickable.
pub const BACKGROUND_ALPHA: u8 = 1;

/// One finished frame: premultiplied RGBA, immutable once rendered.
#[derive(Debug, Clone)]
pub struct Frame {
    pixmap: Pixmap,
}

impl Frame {
    pub(crate) fn new(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied `[r, g, b, a]` at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap
            .pixel(x, y)
            .map(|p| [p.red(), p.green(), p.blue(), p.alpha()])
    }

    /// Apply the global `opacity` and emit premultiplied BGRA rows, the layout
    /// a per-pixel-alpha layered window expects.
    ///
    /// Alpha never drops below [`BACKGROUND_ALPHA`], whatever the opacity.
    pub fn composite(&self, opacity: f32) -> Vec<u8> {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        let scale = |c: u8| (c as f32 * opacity).round() as u8;

        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let a = scale(px.alpha()).max(BACKGROUND_ALPHA);
            // Premultiplied channels may not exceed alpha.
            out.extend_from_slice(&[
                scale(px.blue()).min(a),
                scale(px.green()).min(a),
                scale(px.red()).min(a),
                a,
            ]);
        }
        out
    }
}
