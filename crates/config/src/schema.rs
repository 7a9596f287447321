use serde::{Deserialize, Serialize};

/// Shortest accepted tick interval in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 250;
/// Accepted opacity range for the overlay.
pub const OPACITY_RANGE: (f32, f32) = (0.30, 1.00);

/// Root configuration structure parsed from `taskmon.toml`.
///
/// Every field has a default, so missing keys are filled in and unknown keys
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub show_net_up:   bool,
    pub show_net_down: bool,
    pub show_cpu:      bool,
    pub show_gpu:      bool,
    pub show_memory:   bool,
    /// Single aggregate sparkline or a per-core bar grid.
    pub cpu_mode: CpuMode,
    /// `"auto"` or a (case-insensitive) fragment of the adapter name.
    pub network_adapter: String,
    /// Tick interval in milliseconds.
    pub update_interval_ms: u64,
    /// Overall overlay opacity (0.30 – 1.00).
    pub opacity: f32,
    /// Start with the user session. Consumed by the installer.
    pub launch_at_startup: bool,
    /// Per-series colors.
    pub colors: ColorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_net_up:        true,
            show_net_down:      true,
            show_cpu:           true,
            show_gpu:           true,
            show_memory:        true,
            cpu_mode:           CpuMode::Aggregate,
            network_adapter:    AUTO_ADAPTER.to_string(),
            update_interval_ms: 1_000,
            opacity:            0.85,
            launch_at_startup:  false,
            colors:             ColorConfig::default(),
        }
    }
}

/// Value of `network_adapter` that selects the adapter automatically.
pub const AUTO_ADAPTER: &str = "auto";

impl Settings {
    /// Clamp numeric fields into their accepted ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.update_interval_ms = self.update_interval_ms.max(MIN_INTERVAL_MS);
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(OPACITY_RANGE.0, OPACITY_RANGE.1)
        } else {
            Self::default().opacity
        };
        if self.network_adapter.trim().is_empty() {
            self.network_adapter = AUTO_ADAPTER.to_string();
        }
        self
    }

    /// `None` in automatic mode, otherwise the configured name fragment.
    pub fn adapter_filter(&self) -> Option<&str> {
        let name = self.network_adapter.trim();
        if name.eq_ignore_ascii_case(AUTO_ADAPTER) {
            None
        } else {
            Some(name)
        }
    }

    /// `true` when `other` would produce a different section layout.
    pub fn layout_differs(&self, other: &Self) -> bool {
        self.show_net_up != other.show_net_up
            || self.show_net_down != other.show_net_down
            || self.show_cpu != other.show_cpu
            || self.show_gpu != other.show_gpu
            || self.show_memory != other.show_memory
            || self.cpu_mode != other.cpu_mode
    }
}

/// How the CPU section is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CpuMode {
    #[default]
    Aggregate,
    PerCore,
}

/// Hex colors for each plotted series plus the label text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub net_up:   String,
    pub net_down: String,
    pub cpu:      String,
    pub gpu:      String,
    pub memory:   String,
    pub text:     String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            net_up:   "#f38ba8".to_string(), // Catppuccin Mocha red
            net_down: "#a6e3a1".to_string(), // Catppuccin Mocha green
            cpu:      "#89b4fa".to_string(), // Catppuccin Mocha blue
            gpu:      "#fab387".to_string(), // Catppuccin Mocha peach
            memory:   "#cba6f7".to_string(), // Catppuccin Mocha mauve
            text:     "#cdd6f4".to_string(), // Catppuccin Mocha text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_interval_and_opacity() {
        let s = Settings {
            update_interval_ms: 10,
            opacity: 0.05,
            ..Settings::default()
        }
        .normalized();
        assert_eq!(s.update_interval_ms, MIN_INTERVAL_MS);
        assert_eq!(s.opacity, OPACITY_RANGE.0);

        let s = Settings { opacity: 4.0, ..Settings::default() }.normalized();
        assert_eq!(s.opacity, OPACITY_RANGE.1);

        let s = Settings { opacity: f32::NAN, ..Settings::default() }.normalized();
        assert_eq!(s.opacity, Settings::default().opacity);
    }

    #[test]
    fn adapter_filter_auto_is_case_insensitive() {
        let s = Settings { network_adapter: "AUTO".into(), ..Settings::default() };
        assert_eq!(s.adapter_filter(), None);

        let s = Settings { network_adapter: " Wi-Fi ".into(), ..Settings::default() };
        assert_eq!(s.adapter_filter(), Some("Wi-Fi"));

        let s = Settings { network_adapter: "".into(), ..Settings::default() }.normalized();
        assert_eq!(s.adapter_filter(), None);
    }

    #[test]
    fn layout_differs_ignores_colors_and_interval() {
        let a = Settings::default();
        let mut b = a.clone();
        b.update_interval_ms = 2_000;
        b.colors.cpu = "#000000".into();
        assert!(!a.layout_differs(&b));

        b.cpu_mode = CpuMode::PerCore;
        assert!(a.layout_differs(&b));
    }
}
