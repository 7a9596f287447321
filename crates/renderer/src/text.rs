use cosmic_text::{Attrs, Buffer, Color as GlyphColor, FontSystem, Metrics, Shaping, SwashCache};
use taskmon_theme::Color;
use tiny_skia::{Paint, Pixmap, Rect, Transform};

/// Font size of section labels and values, in pixels.
pub const FONT_SIZE: f32 = 10.0;

/// Shapes and rasterises short labels with the system fonts.
///
/// Font discovery is slow, so one painter lives as long as the renderer.
pub struct TextPainter {
    fonts: FontSystem,
    cache: SwashCache,
}

impl TextPainter {
    pub fn new() -> Self {
        Self {
            fonts: FontSystem::new(),
            cache: SwashCache::new(),
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`, clipped to `max_width`.
    pub fn draw(&mut self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, max_width: f32, color: Color) {
        let metrics = Metrics::new(FONT_SIZE, FONT_SIZE * 1.2);
        let mut buffer = Buffer::new(&mut self.fonts, metrics);
        buffer.set_size(&mut self.fonts, Some(max_width), Some(metrics.line_height));
        buffer.set_text(&mut self.fonts, text, Attrs::new(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.fonts, false);

        let [r, g, b, a] = color.to_rgba8();
        let mut paint = Paint::default();
        paint.anti_alias = false;

        buffer.draw(
            &mut self.fonts,
            &mut self.cache,
            GlyphColor::rgba(r, g, b, a),
            |gx, gy, w, h, glyph: GlyphColor| {
                if glyph.a() == 0 {
                    return;
                }
                let Some(rect) = Rect::from_xywh(x + gx as f32, y + gy as f32, w as f32, h as f32) else {
                    return;
                };
                paint.set_color_rgba8(glyph.r(), glyph.g(), glyph.b(), glyph.a());
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            },
        );
    }
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::new()
    }
}
