use crate::layout::{grid_cell, grid_columns, GRID_PADDING, GRID_ROWS};
use taskmon_theme::Color;
use tiny_skia::{Paint, Pixmap, Rect, Transform};

/// Alpha of the empty track behind each core bar.
const TRACK_ALPHA: f32 = 0.15;

/// Rectangle of one core's full-height track, snapped to whole pixels.
pub fn cell_rect(section: Rect, index: usize, core_count: usize) -> Option<Rect> {
    let columns = grid_columns(core_count);
    if columns == 0 {
        return None;
    }
    let pad = GRID_PADDING as f32;
    let cell_w = ((section.width() - 2.0 * pad) / columns as f32).floor();
    let cell_h = ((section.height() - 2.0 * pad) / GRID_ROWS as f32).floor();
    if cell_w < 1.0 || cell_h < 1.0 {
        return None;
    }

    let (row, col) = grid_cell(index, columns);
    // One pixel of spacing between neighbouring bars.
    Rect::from_xywh(
        (section.left() + pad).floor() + col as f32 * cell_w,
        (section.top() + pad).floor() + row as f32 * cell_h,
        (cell_w - 1.0).max(1.0),
        (cell_h - 1.0).max(1.0),
    )
}

/// Draw one vertical heat-colored bar per core, filled from the bottom.
pub fn draw(pixmap: &mut Pixmap, section: Rect, cores: &[f32], track: Color) {
    let mut paint = Paint::default();
    paint.anti_alias = false;

    for (i, &usage) in cores.iter().enumerate() {
        let Some(cell) = cell_rect(section, i, cores.len()) else {
            return;
        };

        paint.set_color(track.with_alpha(TRACK_ALPHA).to_skia());
        pixmap.fill_rect(cell, &paint, Transform::identity(), None);

        let fraction = if usage.is_finite() { (usage / 100.0).clamp(0.0, 1.0) } else { 0.0 };
        let height = (cell.height() * fraction).round();
        if height <= 0.0 {
            continue;
        }
        if let Some(bar) = Rect::from_xywh(cell.left(), cell.bottom() - height, cell.width(), height) {
            paint.set_color(Color::heat(usage).to_skia());
            pixmap.fill_rect(bar, &paint, Transform::identity(), None);
        }
    }
}
