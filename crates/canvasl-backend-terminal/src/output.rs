//! Terminal output handling
//!
//! Writes frames to the terminal using crossterm. Raw mode is left alone so
//! the usual interrupt keys keep working while the view is up.

use crate::color::{ColorDepth, ColorMapper};
use canvasl_core::{TerminalCell, TerminalFrame};
use canvasl_pipeline::{FrameSink, SinkError};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::debug;

/// Terminal output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Terminal not available")]
    NotAvailable,
}

impl From<OutputError> for SinkError {
    fn from(e: OutputError) -> Self {
        match e {
            OutputError::Io(e) => SinkError::Io(e),
            OutputError::NotAvailable => SinkError::Closed,
        }
    }
}

/// Full-screen terminal output handler
pub struct TerminalOutput {
    mapper: ColorMapper,
    /// Whether we're in alternate screen mode
    alternate_screen: bool,
    /// Whether cursor is hidden
    cursor_hidden: bool,
    /// Last frame for diff rendering
    last_frame: Option<TerminalFrame>,
    /// Only update changed cells
    diff_mode: bool,
    /// Set by a [`RedrawHandle`]; the next frame clears and repaints everything
    redraw: Arc<AtomicBool>,
}

/// Asks a [`TerminalOutput`] to repaint the whole surface on its next frame
///
/// Text written to the terminal outside the output (log lines on stderr)
/// survives diff rendering until the next full redraw.
#[derive(Debug, Clone)]
pub struct RedrawHandle(Arc<AtomicBool>);

impl RedrawHandle {
    /// Request a full redraw
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl TerminalOutput {
    /// Create a new terminal output handler
    pub fn new(depth: ColorDepth) -> Self {
        Self {
            mapper: ColorMapper::new(depth),
            alternate_screen: false,
            cursor_hidden: false,
            last_frame: None,
            diff_mode: true,
            redraw: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting a full redraw from another task
    pub fn redraw_handle(&self) -> RedrawHandle {
        RedrawHandle(self.redraw.clone())
    }

    /// Whether the next frame will be a full redraw request
    pub fn redraw_pending(&self) -> bool {
        self.redraw.load(Ordering::Acquire)
    }

    /// Enable or disable diff mode
    pub fn set_diff_mode(&mut self, enabled: bool) {
        self.diff_mode = enabled;
        if !enabled {
            self.last_frame = None;
        }
    }

    /// Switch to the alternate screen and hide the cursor
    pub fn init(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        execute!(stdout, EnterAlternateScreen)?;
        self.alternate_screen = true;

        execute!(stdout, Hide)?;
        self.cursor_hidden = true;

        execute!(stdout, Clear(ClearType::All))?;
        debug!(depth = ?self.mapper.depth(), "Terminal output initialized");
        Ok(())
    }

    /// Restore the terminal
    pub fn cleanup(&mut self) -> Result<(), OutputError> {
        let mut stdout = io::stdout();

        if self.cursor_hidden {
            execute!(stdout, Show)?;
            self.cursor_hidden = false;
        }

        if self.alternate_screen {
            execute!(stdout, LeaveAlternateScreen)?;
            self.alternate_screen = false;
        }

        Ok(())
    }

    /// Render a frame to the terminal
    pub fn render(&mut self, frame: &TerminalFrame) -> Result<(), OutputError> {
        let mut stdout = io::stdout().lock();
        self.render_to(&mut stdout, frame)
    }

    fn render_to<W: Write>(&mut self, out: &mut W, frame: &TerminalFrame) -> Result<(), OutputError> {
        if self.redraw.swap(false, Ordering::AcqRel) {
            debug!("Full redraw requested");
            queue!(out, Clear(ClearType::All))?;
            self.last_frame = None;
        }

        match self.last_frame.as_ref() {
            Some(last) if self.diff_mode && same_size(last, frame) => {
                write_diff(out, &self.mapper, last, frame)?;
            }
            _ => write_full(out, &self.mapper, frame)?,
        }
        out.flush()?;

        if self.diff_mode {
            self.last_frame = Some(frame.clone());
        }
        Ok(())
    }

    /// Get terminal size
    pub fn size() -> Result<(u32, u32), OutputError> {
        let (cols, rows) = terminal::size().map_err(|_| OutputError::NotAvailable)?;
        Ok((cols as u32, rows as u32))
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(ColorDepth::detect())
    }
}

impl Drop for TerminalOutput {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

impl FrameSink<TerminalFrame> for TerminalOutput {
    fn present(&mut self, frame: &TerminalFrame) -> Result<(), SinkError> {
        Ok(self.render(frame)?)
    }
}

/// Writes whole frames as ANSI text to any writer
///
/// Used when stdout is not a terminal. With `home` set, every frame starts
/// with a cursor-home sequence so a terminal at the other end redraws in
/// place.
pub struct AnsiOutput<W: Write> {
    writer: W,
    mapper: ColorMapper,
    home: bool,
}

impl<W: Write> AnsiOutput<W> {
    /// Create an output over a writer
    pub fn new(writer: W, depth: ColorDepth) -> Self {
        Self {
            writer,
            mapper: ColorMapper::new(depth),
            home: false,
        }
    }

    /// Prefix every frame with cursor-home
    pub fn with_home(mut self, home: bool) -> Self {
        self.home = home;
        self
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> FrameSink<TerminalFrame> for AnsiOutput<W> {
    fn present(&mut self, frame: &TerminalFrame) -> Result<(), SinkError> {
        if self.home {
            self.writer.write_all(b"\x1b[H")?;
        }
        self.writer
            .write_all(frame_to_ansi(frame, &self.mapper).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Frame as ANSI text, one line per row
pub fn frame_to_ansi(frame: &TerminalFrame, mapper: &ColorMapper) -> String {
    if mapper.depth() == ColorDepth::TrueColor {
        return frame.to_ansi();
    }

    let mut out = String::new();
    let mut last: Option<([u8; 3], Option<[u8; 3]>)> = None;
    for row in frame.cells.chunks(frame.width.max(1) as usize) {
        for cell in row {
            if last != Some((cell.fg, cell.bg)) {
                out.push_str("\x1b[0m");
                out.push_str(&mapper.fg_escape(cell.fg));
                if let Some(bg) = cell.bg {
                    out.push_str(&mapper.bg_escape(bg));
                }
                last = Some((cell.fg, cell.bg));
            }
            out.push(cell.char);
        }
        out.push('\n');
    }
    out.push_str("\x1b[0m");
    out
}

fn same_size(a: &TerminalFrame, b: &TerminalFrame) -> bool {
    a.width == b.width && a.height == b.height
}

fn write_cell<W: Write>(
    out: &mut W,
    mapper: &ColorMapper,
    cell: &TerminalCell,
) -> io::Result<()> {
    queue!(out, SetForegroundColor(mapper.to_crossterm(cell.fg)))?;
    match cell.bg {
        Some(bg) => queue!(out, SetBackgroundColor(mapper.to_crossterm(bg)))?,
        None => queue!(out, SetBackgroundColor(crossterm::style::Color::Reset))?,
    }
    if cell.bold {
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            Print(cell.char),
            SetAttribute(Attribute::NormalIntensity)
        )
    } else {
        queue!(out, Print(cell.char))
    }
}

fn write_full<W: Write>(out: &mut W, mapper: &ColorMapper, frame: &TerminalFrame) -> io::Result<()> {
    for (y, row) in frame.cells.chunks(frame.width.max(1) as usize).enumerate() {
        queue!(out, MoveTo(0, y as u16))?;
        for cell in row {
            write_cell(out, mapper, cell)?;
        }
    }
    queue!(out, ResetColor)
}

fn write_diff<W: Write>(
    out: &mut W,
    mapper: &ColorMapper,
    last: &TerminalFrame,
    frame: &TerminalFrame,
) -> io::Result<()> {
    let width = frame.width.max(1) as usize;
    for (i, (current, previous)) in frame.cells.iter().zip(&last.cells).enumerate() {
        if current != previous {
            queue!(out, MoveTo((i % width) as u16, (i / width) as u16))?;
            write_cell(out, mapper, current)?;
        }
    }
    queue!(out, ResetColor)
}
