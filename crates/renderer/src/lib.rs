//! Frame composition for the overlay.
//!
//! Every tick the enabled sections are laid out left to right and drawn into
//! an off-screen premultiplied-alpha bitmap:
//! - sparkline sections (network, aggregate CPU, GPU, memory): filled history
//!   chart plus a label and the current value
//! - the per-core grid: one heat-colored bar per logical core, under the same
//!   label and aggregate value
//!
//! Putting the bitmap on screen is the presenter's job (`taskmon-overlay`).

pub mod cores;
pub mod format;
pub mod frame;
pub mod layout;
pub mod sparkline;
pub mod text;

pub use frame::{Frame, BACKGROUND_ALPHA};
pub use layout::{Layout, Section, SectionKind};

use taskmon_config::Settings;
use taskmon_core::{History, MetricsSnapshot};
use taskmon_theme::{Color, Palette};
use text::TextPainter;
use tiny_skia::{Pixmap, Rect};

/// Inset between a section's edge and its label / value text.
const TEXT_INSET: f32 = 3.0;

/// Draws [`MetricsSnapshot`]s into [`Frame`]s using the current settings.
pub struct Renderer {
    text:     TextPainter,
    settings: Settings,
    palette:  Palette,
}

impl Renderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            text:     TextPainter::new(),
            settings: settings.clone(),
            palette:  Palette::from_config(&settings.colors),
        }
    }

    /// Swap in new display settings.
    pub fn configure(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.palette = Palette::from_config(&settings.colors);
    }

    /// Section layout for the current settings.
    pub fn layout(&self, core_count: usize) -> Layout {
        Layout::compute(&self.settings, core_count)
    }

    /// Compose one frame of exactly `width` × `height` pixels.
    ///
    /// Returns `None` for a non-positive size; the caller retries next tick.
    pub fn render(&mut self, snapshot: &MetricsSnapshot, width: i32, height: i32) -> Option<Frame> {
        if width <= 0 || height <= 0 {
            tracing::debug!("Skipping frame: surface is {width}x{height}");
            return None;
        }
        let mut pixmap = Pixmap::new(width as u32, height as u32)?;
        pixmap.fill(tiny_skia::Color::from_rgba8(0, 0, 0, BACKGROUND_ALPHA));

        let layout = self.layout(snapshot.core_count());
        for section in &layout.sections {
            if section.x >= width {
                break;
            }
            let visible = section.width.min(width - section.x);
            let Some(area) = Rect::from_xywh(section.x as f32, 0.0, visible as f32, height as f32) else {
                continue;
            };
            self.draw_section(&mut pixmap, section.kind, area, snapshot);
        }

        Some(Frame::new(pixmap))
    }

    fn draw_section(&mut self, pixmap: &mut Pixmap, kind: SectionKind, area: Rect, s: &MetricsSnapshot) {
        let p = &self.palette;
        let chart: Option<(&History, f32, Color)> = match kind {
            SectionKind::NetUp => Some((&s.net_up_history, s.net_peak, p.net_up)),
            SectionKind::NetDown => Some((&s.net_down_history, s.net_peak, p.net_down)),
            SectionKind::Cpu => Some((&s.cpu_history, 100.0, p.cpu)),
            SectionKind::Gpu => Some((&s.gpu_history, 100.0, p.gpu)),
            SectionKind::Memory => Some((&s.memory_history, 100.0, p.memory)),
            SectionKind::CpuCores => None,
        };
        let value = match kind {
            SectionKind::NetUp => format::format_rate(s.net_up),
            SectionKind::NetDown => format::format_rate(s.net_down),
            SectionKind::Cpu | SectionKind::CpuCores => format::format_percent(s.cpu_total),
            SectionKind::Gpu => format::format_gpu(s.gpu_util, s.gpu_temp),
            SectionKind::Memory => format::format_percent(s.memory_percent),
        };

        match chart {
            Some((history, scale, color)) => {
                if let Some(chart) = inset(area, 1.0) {
                    sparkline::draw(pixmap, chart, &history.read_ordered(), scale, color);
                }
            }
            None => cores::draw(pixmap, area, &s.cpu_per_core, p.text),
        }

        // Label and value go on top, the grid included.
        let ink = self.palette.text;
        let max_width = area.width() - 2.0 * TEXT_INSET;
        let x = area.left() + TEXT_INSET;
        self.text.draw(pixmap, kind.label(), x, 1.0, max_width, ink);
        self.text.draw(pixmap, &value, x, 1.0 + text::FONT_SIZE * 1.2, max_width, ink);
    }
}

fn inset(rect: Rect, by: f32) -> Option<Rect> {
    Rect::from_ltrb(rect.left() + by, rect.top() + by, rect.right() - by, rect.bottom() - by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::{SECTION_GAP, SECTION_WIDTH};
    use taskmon_config::CpuMode;

    const HEIGHT: i32 = 40;

    fn busy_snapshot() -> MetricsSnapshot {
        let mut s = MetricsSnapshot {
            cpu_total: 80.0,
            cpu_per_core: vec![10.0, 50.0, 90.0, 100.0],
            memory_percent: 60.0,
            net_up: 20_000.0,
            net_down: 40_000.0,
            net_peak: 50_000.0,
            ..MetricsSnapshot::default()
        };
        for _ in 0..60 {
            s.cpu_history.push(80.0);
            s.memory_history.push(60.0);
            s.net_up_history.push(20_000.0);
            s.net_down_history.push(40_000.0);
        }
        s
    }

    #[test]
    fn non_positive_size_renders_nothing() {
        let mut r = Renderer::new(&Settings::default());
        let s = MetricsSnapshot::default();
        assert!(r.render(&s, 0, HEIGHT).is_none());
        assert!(r.render(&s, 100, 0).is_none());
        assert!(r.render(&s, -5, -5).is_none());
    }

    #[test]
    fn frame_matches_requested_size() {
        let mut r = Renderer::new(&Settings::default());
        let width = r.layout(4).total_width();
        let frame = r.render(&busy_snapshot(), width, HEIGHT).unwrap();
        assert_eq!((frame.width(), frame.height()), (width as u32, HEIGHT as u32));
    }

    #[test]
    fn gaps_keep_background_alpha_of_one() {
        let mut r = Renderer::new(&Settings::default());
        let width = r.layout(4).total_width();
        let frame = r.render(&busy_snapshot(), width, HEIGHT).unwrap();

        let gap_x = (SECTION_WIDTH + SECTION_GAP / 2) as u32;
        for y in 0..HEIGHT as u32 {
            assert_eq!(frame.pixel(gap_x, y), Some([0, 0, 0, BACKGROUND_ALPHA]));
        }
        assert!(frame.composite(0.5).chunks(4).all(|px| px[3] >= 1));
    }

    #[test]
    fn sparkline_area_is_painted() {
        let mut r = Renderer::new(&Settings::default());
        let width = r.layout(4).total_width();
        let frame = r.render(&busy_snapshot(), width, HEIGHT).unwrap();

        // Bottom of the CPU section, under an 80 % line.
        let cpu_x = (2 * (SECTION_WIDTH + SECTION_GAP) + SECTION_WIDTH / 2) as u32;
        let [_, _, _, a] = frame.pixel(cpu_x, HEIGHT as u32 - 3).unwrap();
        assert!(a > BACKGROUND_ALPHA);
    }

    #[test]
    fn per_core_mode_draws_heat_bars() {
        let settings = Settings {
            cpu_mode: CpuMode::PerCore,
            show_net_up: false,
            show_net_down: false,
            show_gpu: false,
            show_memory: false,
            ..Settings::default()
        };
        let mut r = Renderer::new(&settings);
        let mut snapshot = busy_snapshot();
        snapshot.cpu_per_core = vec![10.0; 24];
        snapshot.cpu_per_core[23] = 100.0;
        let layout = r.layout(snapshot.core_count());
        assert_eq!(layout.sections[0].kind, SectionKind::CpuCores);

        let frame = r.render(&snapshot, layout.total_width(), HEIGHT).unwrap();
        // Core 23 (100 %) is the bottom-right cell of an 8 x 3 grid, clear of the text.
        let area = Rect::from_xywh(0.0, 0.0, layout.total_width() as f32, HEIGHT as f32).unwrap();
        let cell = cores::cell_rect(area, 23, 24).unwrap();
        for x in cell.left() as u32..cell.right() as u32 {
            let px = frame.pixel(x, cell.bottom() as u32 - 1).unwrap();
            assert_eq!(px, [255, 0, 0, 255], "x = {x}");
        }
    }

    #[test]
    fn gpu_section_renders_with_default_values() {
        let settings = Settings {
            show_net_up: false,
            show_net_down: false,
            show_cpu: false,
            show_memory: false,
            ..Settings::default()
        };
        let mut r = Renderer::new(&settings);
        let frame = r.render(&MetricsSnapshot::default(), SECTION_WIDTH, HEIGHT);
        assert!(frame.is_some());
    }

    #[test]
    fn narrower_surface_clips_trailing_sections() {
        let mut r = Renderer::new(&Settings::default());
        let frame = r.render(&busy_snapshot(), SECTION_WIDTH + 10, HEIGHT).unwrap();
        assert_eq!(frame.width(), (SECTION_WIDTH + 10) as u32);
    }

    #[test]
    fn configure_swaps_palette() {
        let mut r = Renderer::new(&Settings::default());
        let mut settings = Settings::default();
        settings.colors.cpu = "#010203".into();
        r.configure(&settings);
        assert_eq!(r.palette.cpu.to_rgba8(), [1, 2, 3, 255]);
    }
}
