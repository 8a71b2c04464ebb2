//! Character-cell frames
//!
//! The display surface the terminal backend draws into. A frame is a
//! row-major grid of colored cells.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A single character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalCell {
    /// Glyph
    pub char: char,
    /// Foreground color (RGB)
    pub fg: [u8; 3],
    /// Background color (RGB, None for transparent)
    pub bg: Option<[u8; 3]>,
    /// Bold glyph
    pub bold: bool,
}

impl Default for TerminalCell {
    fn default() -> Self {
        Self {
            char: ' ',
            fg: [200, 200, 200],
            bg: None,
            bold: false,
        }
    }
}

impl TerminalCell {
    /// Cell with a glyph and default colors
    pub fn new(char: char) -> Self {
        Self {
            char,
            ..Default::default()
        }
    }

    /// Set foreground color
    pub fn with_fg(mut self, fg: [u8; 3]) -> Self {
        self.fg = fg;
        self
    }

    /// Set background color
    pub fn with_bg(mut self, bg: [u8; 3]) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Space with no background
    pub fn is_empty(&self) -> bool {
        self.char == ' ' && self.bg.is_none()
    }
}

/// Grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalFrame {
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    /// Row-major cells
    pub cells: Vec<TerminalCell>,
}

impl TerminalFrame {
    /// Blank frame
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![TerminalCell::default(); width as usize * height as usize],
        }
    }

    /// Fill every cell
    pub fn fill(&mut self, cell: TerminalCell) {
        self.cells.fill(cell);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Cell at position
    pub fn get(&self, x: u32, y: u32) -> Option<&TerminalCell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at position
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut TerminalCell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Set a cell; out-of-bounds writes are ignored
    pub fn set(&mut self, x: u32, y: u32, cell: TerminalCell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Draw a string starting at a position, clipped to the frame
    pub fn draw_str(&mut self, x: u32, y: u32, s: &str, fg: [u8; 3]) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as u32, y, TerminalCell::new(ch).with_fg(fg));
        }
    }

    /// Copy another frame in with its top-left corner at `(x, y)`
    pub fn blit(&mut self, x: u32, y: u32, other: &TerminalFrame) {
        for oy in 0..other.height {
            for ox in 0..other.width {
                if let Some(cell) = other.get(ox, oy) {
                    self.set(x + ox, y + oy, *cell);
                }
            }
        }
    }

    /// Rows as plain text, without colors
    pub fn to_plain_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|c| c.char));
            out.push('\n');
        }
        out
    }

    /// Whole frame as 24-bit ANSI escape text
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        let mut last_fg: Option<[u8; 3]> = None;
        let mut last_bg: Option<[u8; 3]> = None;

        for row in self.cells.chunks(self.width.max(1) as usize) {
            for cell in row {
                if last_fg != Some(cell.fg) {
                    let _ = write!(out, "\x1b[38;2;{};{};{}m", cell.fg[0], cell.fg[1], cell.fg[2]);
                    last_fg = Some(cell.fg);
                }
                if last_bg != cell.bg {
                    match cell.bg {
                        Some(bg) => {
                            let _ = write!(out, "\x1b[48;2;{};{};{}m", bg[0], bg[1], bg[2]);
                        }
                        None => out.push_str("\x1b[49m"),
                    }
                    last_bg = cell.bg;
                }
                if cell.bold {
                    out.push_str("\x1b[1m");
                    out.push(cell.char);
                    out.push_str("\x1b[22m");
                } else {
                    out.push(cell.char);
                }
            }
            out.push('\n');
        }

        out.push_str("\x1b[0m");
        out
    }
}
