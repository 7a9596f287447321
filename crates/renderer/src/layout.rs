use taskmon_config::{CpuMode, Settings};

/// Width of every section except the per-core grid.
pub const SECTION_WIDTH: i32 = 72;
/// Horizontal gap between adjacent sections.
pub const SECTION_GAP: i32 = 4;
/// Rows in the per-core grid.
pub const GRID_ROWS: usize = 3;
/// Width of one per-core grid column (bar plus spacing).
pub const GRID_COLUMN_WIDTH: i32 = 7;
/// Padding on each side of the per-core grid.
pub const GRID_PADDING: i32 = 4;

/// What a section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    NetUp,
    NetDown,
    Cpu,
    CpuCores,
    Gpu,
    Memory,
}

impl SectionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::NetUp => "UP",
            Self::NetDown => "DN",
            Self::Cpu | Self::CpuCores => "CPU",
            Self::Gpu => "GPU",
            Self::Memory => "MEM",
        }
    }
}

/// A section's horizontal slot; sections span the full frame height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub kind:  SectionKind,
    pub x:     i32,
    pub width: i32,
}

/// Left-to-right arrangement of the enabled sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub sections: Vec<Section>,
}

impl Layout {
    /// Lay out sections in the fixed order: network up, network down, CPU,
    /// GPU, memory. Disabled sections take no space.
    pub fn compute(settings: &Settings, core_count: usize) -> Self {
        let cpu = match settings.cpu_mode {
            CpuMode::Aggregate => SectionKind::Cpu,
            CpuMode::PerCore => SectionKind::CpuCores,
        };
        let order = [
            (settings.show_net_up, SectionKind::NetUp),
            (settings.show_net_down, SectionKind::NetDown),
            (settings.show_cpu, cpu),
            (settings.show_gpu, SectionKind::Gpu),
            (settings.show_memory, SectionKind::Memory),
        ];

        let mut sections = Vec::new();
        let mut x = 0;
        for kind in order.into_iter().filter_map(|(on, kind)| on.then_some(kind)) {
            let width = match kind {
                SectionKind::CpuCores => grid_width(core_count),
                _ => SECTION_WIDTH,
            };
            sections.push(Section { kind, x, width });
            x += width + SECTION_GAP;
        }

        Self { sections }
    }

    /// Width the overlay window needs for this layout.
    pub fn total_width(&self) -> i32 {
        self.sections.last().map_or(0, |s| s.x + s.width)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Number of grid columns: `ceil(cores / 3)`.
pub fn grid_columns(core_count: usize) -> usize {
    core_count.div_ceil(GRID_ROWS)
}

/// Width of the per-core grid section.
pub fn grid_width(core_count: usize) -> i32 {
    grid_columns(core_count) as i32 * GRID_COLUMN_WIDTH + 2 * GRID_PADDING
}

/// `(row, column)` of core `index` in a grid with `columns` columns; cores
/// fill rows left to right.
pub fn grid_cell(index: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    (index / columns, index % columns)
}
