//! Color mapping for terminal output
//!
//! Maps RGB colors to terminal color codes based on color depth.

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

/// Colors the terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorDepth {
    /// Black and white
    Monochrome,
    /// 16 ANSI colors
    Basic,
    /// 256-color palette
    Extended,
    /// 24-bit RGB
    #[default]
    TrueColor,
}

impl ColorDepth {
    /// Guess the depth from `NO_COLOR`, `COLORTERM` and `TERM`
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return Self::Monochrome;
        }
        let colorterm = std::env::var("COLORTERM").ok();
        let term = std::env::var("TERM").ok();
        Self::from_env_values(colorterm.as_deref(), term.as_deref())
    }

    fn from_env_values(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if matches!(colorterm, Some("truecolor" | "24bit")) {
            return Self::TrueColor;
        }
        match term {
            Some(t) if t.contains("truecolor") || t.contains("direct") => Self::TrueColor,
            Some(t) if t.contains("256color") => Self::Extended,
            Some("dumb") => Self::Monochrome,
            Some(_) => Self::Basic,
            None => Self::Monochrome,
        }
    }
}

/// Color mapper for terminal output
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorMapper {
    depth: ColorDepth,
}

impl ColorMapper {
    /// Create a new color mapper
    pub fn new(depth: ColorDepth) -> Self {
        Self { depth }
    }

    /// Map RGB color to terminal color based on depth
    pub fn map_color(&self, rgb: [u8; 3]) -> MappedColor {
        match self.depth {
            ColorDepth::Monochrome => to_monochrome(rgb),
            ColorDepth::Basic => to_basic_16(rgb),
            ColorDepth::Extended => to_256(rgb),
            ColorDepth::TrueColor => MappedColor::TrueColor(rgb),
        }
    }

    /// Mapped color as a crossterm color
    pub fn to_crossterm(&self, rgb: [u8; 3]) -> Color {
        match self.map_color(rgb) {
            MappedColor::Basic(idx) | MappedColor::Extended(idx) => Color::AnsiValue(idx),
            MappedColor::TrueColor([r, g, b]) => Color::Rgb { r, g, b },
        }
    }

    /// Get ANSI escape sequence for foreground color
    pub fn fg_escape(&self, rgb: [u8; 3]) -> String {
        match self.map_color(rgb) {
            MappedColor::Basic(idx) if idx < 8 => format!("\x1b[{}m", 30 + idx),
            MappedColor::Basic(idx) => format!("\x1b[{}m", 82 + idx), // 90-97
            MappedColor::Extended(idx) => format!("\x1b[38;5;{}m", idx),
            MappedColor::TrueColor([r, g, b]) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        }
    }

    /// Get ANSI escape sequence for background color
    pub fn bg_escape(&self, rgb: [u8; 3]) -> String {
        match self.map_color(rgb) {
            MappedColor::Basic(idx) if idx < 8 => format!("\x1b[{}m", 40 + idx),
            MappedColor::Basic(idx) => format!("\x1b[{}m", 92 + idx), // 100-107
            MappedColor::Extended(idx) => format!("\x1b[48;5;{}m", idx),
            MappedColor::TrueColor([r, g, b]) => format!("\x1b[48;2;{};{};{}m", r, g, b),
        }
    }

    /// Get color depth
    pub fn depth(&self) -> ColorDepth {
        self.depth
    }
}

/// Mapped terminal color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedColor {
    /// Basic 16-color (0-15)
    Basic(u8),
    /// Extended 256-color (0-255)
    Extended(u8),
    /// True color RGB
    TrueColor([u8; 3]),
}

const BASIC_COLORS: [[u8; 3]; 16] = [
    [0, 0, 0],
    [128, 0, 0],
    [0, 128, 0],
    [128, 128, 0],
    [0, 0, 128],
    [128, 0, 128],
    [0, 128, 128],
    [192, 192, 192],
    [128, 128, 128],
    [255, 0, 0],
    [0, 255, 0],
    [255, 255, 0],
    [0, 0, 255],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
];

fn to_monochrome(rgb: [u8; 3]) -> MappedColor {
    let brightness = (rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16) / 3;
    if brightness > 127 {
        MappedColor::Basic(15)
    } else {
        MappedColor::Basic(0)
    }
}

fn to_basic_16(rgb: [u8; 3]) -> MappedColor {
    let idx = BASIC_COLORS
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| color_distance(rgb, **c))
        .map_or(0, |(i, _)| i as u8);
    MappedColor::Basic(idx)
}

/// 16 basic + 216 color cube + 24 grayscale
fn to_256(rgb: [u8; 3]) -> MappedColor {
    let gray_diff = (rgb[0] as i32 - rgb[1] as i32).abs()
        + (rgb[1] as i32 - rgb[2] as i32).abs()
        + (rgb[0] as i32 - rgb[2] as i32).abs();

    if gray_diff < 30 {
        let avg = (rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16) / 3;
        let gray_idx = ((avg as f32 / 255.0 * 23.0) as u8).min(23);
        return MappedColor::Extended(232 + gray_idx);
    }

    let r = (rgb[0] as f32 / 255.0 * 5.0).round() as u8;
    let g = (rgb[1] as f32 / 255.0 * 5.0).round() as u8;
    let b = (rgb[2] as f32 / 255.0 * 5.0).round() as u8;
    MappedColor::Extended(16 + 36 * r + 6 * g + b)
}

/// Squared Euclidean distance
fn color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_color_passthrough() {
        let mapper = ColorMapper::new(ColorDepth::TrueColor);
        assert_eq!(
            mapper.map_color([100, 150, 200]),
            MappedColor::TrueColor([100, 150, 200])
        );
        assert_eq!(
            mapper.to_crossterm([1, 2, 3]),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }

    #[test]
    fn test_monochrome() {
        let mapper = ColorMapper::new(ColorDepth::Monochrome);
        assert_eq!(mapper.map_color([200, 200, 200]), MappedColor::Basic(15));
        assert_eq!(mapper.map_color([50, 50, 50]), MappedColor::Basic(0));
    }

    #[test]
    fn test_basic_16() {
        let mapper = ColorMapper::new(ColorDepth::Basic);
        // Default node and edge colors
        assert_eq!(mapper.map_color([0, 255, 0]), MappedColor::Basic(10));
        assert_eq!(mapper.map_color([255, 0, 0]), MappedColor::Basic(9));
        assert_eq!(mapper.fg_escape([255, 0, 0]), "\x1b[91m");
        assert_eq!(mapper.bg_escape([0, 0, 0]), "\x1b[40m");
    }

    #[test]
    fn test_256() {
        let mapper = ColorMapper::new(ColorDepth::Extended);
        match mapper.map_color([128, 128, 128]) {
            MappedColor::Extended(idx) => assert!(idx >= 232),
            other => panic!("Expected grayscale, got {:?}", other),
        }
        assert_eq!(mapper.map_color([255, 0, 0]), MappedColor::Extended(196));
        assert_eq!(mapper.fg_escape([255, 0, 0]), "\x1b[38;5;196m");
    }

    #[test]
    fn test_escape_sequences() {
        let mapper = ColorMapper::default();
        assert!(mapper.fg_escape([100, 150, 200]).contains("38;2;100;150;200"));
        assert!(mapper.bg_escape([100, 150, 200]).contains("48;2;100;150;200"));
    }

    #[test]
    fn test_depth_from_env() {
        assert_eq!(
            ColorDepth::from_env_values(Some("truecolor"), Some("xterm")),
            ColorDepth::TrueColor
        );
        assert_eq!(
            ColorDepth::from_env_values(None, Some("xterm-256color")),
            ColorDepth::Extended
        );
        assert_eq!(
            ColorDepth::from_env_values(None, Some("vt100")),
            ColorDepth::Basic
        );
        assert_eq!(
            ColorDepth::from_env_values(None, Some("dumb")),
            ColorDepth::Monochrome
        );
        assert_eq!(ColorDepth::from_env_values(None, None), ColorDepth::Monochrome);
    }
}
