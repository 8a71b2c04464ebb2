//! CanvasL Core - Records, classification and the scene model
//!
//! CanvasL is a line-delimited JSON format: one structured record per line,
//! describing the nodes and edges of a graph laid out on a 2D canvas. This
//! crate holds the pieces every other crate agrees on:
//!
//! ```text
//! raw text → Records → RecordKind (Node | Edge | Ignored) → SceneEntity → Scene
//! ```
//!
//! Parsing is best-effort: a line that is not a JSON object contributes
//! nothing and is never an error. Classification is a pure function of one
//! record. The [`Scene`] is append-only; producers share it through a
//! [`SceneHandle`] rather than through global state.

pub mod classify;
pub mod color;
pub mod entity;
pub mod media;
pub mod output;
pub mod record;
pub mod scene;

// Re-export commonly used types
pub use classify::{RecordKind, classify, classify_all};
pub use color::{DEFAULT_NODE_COLOR, parse_color};
pub use entity::{EntityId, EntityOrigin, Material, SceneEntity, Shape};
pub use media::{MediaKind, ModelAsset, Texture, VideoContainer, VideoStream};
pub use output::{TerminalCell, TerminalFrame};
pub use record::{Record, Records, parse_records};
pub use scene::{Camera, RenderTarget, Scene, SceneHandle};
