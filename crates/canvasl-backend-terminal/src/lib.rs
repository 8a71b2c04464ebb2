//! CanvasL Terminal Backend
//!
//! Character-cell software rendering of a CanvasL scene. Supports true
//! color, 256 color, 16 color and monochrome terminals, and a side-by-side
//! stereo layout for immersive sessions.

pub mod color;
pub mod output;
pub mod renderer;

// Re-export commonly used types
pub use color::{ColorDepth, ColorMapper, MappedColor};
pub use output::{AnsiOutput, OutputError, RedrawHandle, TerminalOutput, frame_to_ansi};
pub use renderer::{CELL_ASPECT, EYE_SEPARATION, TerminalRenderer};
