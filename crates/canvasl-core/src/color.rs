//! Record color parsing
//!
//! CanvasL colors are hex-like strings. Anything unreadable falls back to the
//! caller's default rather than rejecting the record.

use serde_json::Value;

/// Bright green, used for nodes without a readable color
pub const DEFAULT_NODE_COLOR: [u8; 3] = [0x00, 0xff, 0x00];

/// Default edge color (red)
pub const DEFAULT_EDGE_COLOR: [u8; 3] = [0xff, 0x00, 0x00];

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// Parse a JSON color value into RGB
///
/// Accepts `"#rrggbb"`, `"#rgb"`, `"0xrrggbb"`, bare `"rrggbb"`, an integer
/// `0xRRGGBB`, or a basic CSS color name.
pub fn parse_color(value: &Value) -> Option<[u8; 3]> {
    match value {
        Value::String(s) => parse_color_str(s),
        Value::Number(n) => n
            .as_u64()
            .filter(|v| *v <= 0xff_ffff)
            .map(|v| rgb_from_u32(v as u32)),
        _ => None,
    }
}

/// Parse a color string
pub fn parse_color_str(s: &str) -> Option<[u8; 3]> {
    let s = s.trim();
    let hex = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if hex.chars().all(|c| c.is_ascii_hexdigit()) {
        match hex.len() {
            6 => return u32::from_str_radix(hex, 16).ok().map(rgb_from_u32),
            3 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                let (r, g, b) = ((v >> 8) & 0xf, (v >> 4) & 0xf, v & 0xf);
                return Some([(r * 17) as u8, (g * 17) as u8, (b * 17) as u8]);
            }
            _ => {}
        }
    }

    let lower = s.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| *rgb)
}

/// Format RGB as `#rrggbb`
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn rgb_from_u32(v: u32) -> [u8; 3] {
    [(v >> 16) as u8, (v >> 8) as u8, v as u8]
}
