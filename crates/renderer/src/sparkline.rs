use taskmon_theme::Color;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Alpha of the area under a sparkline.
pub const FILL_ALPHA: f32 = 0.25;

/// Screen coordinates of `values` inside `rect`, oldest at the left edge.
///
/// Each value is divided by `scale` and clamped to `[0, 1]`, so 0 sits on the
/// bottom edge and `scale` on the top edge.
pub fn points(values: &[f32], scale: f32, rect: Rect) -> Vec<(f32, f32)> {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let step = if values.len() > 1 {
        rect.width() / (values.len() - 1) as f32
    } else {
        0.0
    };

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let norm = if v.is_finite() { (v / scale).clamp(0.0, 1.0) } else { 0.0 };
            (rect.left() + i as f32 * step, rect.bottom() - norm * rect.height())
        })
        .collect()
}

/// Draw a filled area chart with a solid top edge.
pub fn draw(pixmap: &mut Pixmap, rect: Rect, values: &[f32], scale: f32, color: Color) {
    let pts = points(values, scale, rect);
    let (Some(&(first_x, _)), Some(&(last_x, _))) = (pts.first(), pts.last()) else {
        return;
    };

    let mut area = PathBuilder::new();
    area.move_to(first_x, rect.bottom());
    for &(x, y) in &pts {
        area.line_to(x, y);
    }
    area.line_to(last_x, rect.bottom());
    area.close();

    let mut edge = PathBuilder::new();
    edge.move_to(first_x, pts[0].1);
    for &(x, y) in &pts[1..] {
        edge.line_to(x, y);
    }

    let mut paint = Paint::default();
    paint.anti_alias = true;

    if let Some(path) = area.finish() {
        paint.set_color(color.with_alpha(FILL_ALPHA).to_skia());
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    if let Some(path) = edge.finish() {
        paint.set_color(color.with_alpha(1.0).to_skia());
        let stroke = Stroke { width: 1.0, ..Stroke::default() };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
