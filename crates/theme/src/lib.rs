pub mod colors;

pub use colors::Color;

use taskmon_config::ColorConfig;

/// Compiled palette derived from the `[colors]` settings table.
///
/// All colors are pre-parsed from hex strings into normalised `[0, 1]` RGBA.
/// Calling [`Palette::from_config`] is infallible: invalid color strings fall
/// back to the built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub net_up:   Color,
    pub net_down: Color,
    pub cpu:      Color,
    pub gpu:      Color,
    pub memory:   Color,
    /// Label and value text.
    pub text:     Color,
}

impl Palette {
    pub fn from_config(cfg: &ColorConfig) -> Self {
        Self {
            net_up:   parse_or(&cfg.net_up, Color::RED),
            net_down: parse_or(&cfg.net_down, Color::GREEN),
            cpu:      parse_or(&cfg.cpu, Color::BLUE),
            gpu:      parse_or(&cfg.gpu, Color::PEACH),
            memory:   parse_or(&cfg.memory, Color::PURPLE),
            text:     parse_or(&cfg.text, Color::WHITE),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&ColorConfig::default())
    }
}

fn parse_or(hex: &str, fallback: Color) -> Color {
    Color::from_hex(hex).unwrap_or(fallback)
}
