//! CanvasL Pipeline - From records to pixels
//!
//! Three independent producers and one observer share a single scene:
//!
//! ```text
//! Records ─► SceneProjector ─┐                 (runs once, in order)
//!                            ├─► SceneHandle ─► DisplayLoop ─► FrameSink
//! MediaStage (4 tasks) ──────┘                 (reads every frame)
//! ```
//!
//! The projector and the media stage only append. The display loop only
//! reads. Nothing here tears the scene down; it lives as long as the
//! process.

pub mod decode;
pub mod display;
pub mod media;
pub mod projector;
pub mod scheduler;
pub mod session;

// Re-export commonly used types
pub use display::{
    DisplayConfig, DisplayError, DisplayLoop, FrameSink, LoopStats, RenderError, SceneRenderer,
    SinkError,
};
pub use media::{
    AttachReport, ImageSource, MediaAnchors, MediaAsset, MediaConfig, MediaError, MediaLocation,
    MediaSource, MediaStage, ModelSource, SyntheticSource, VideoSource,
};
pub use projector::{ProjectionReport, ProjectorConfig, SceneProjector};
pub use scheduler::{FrameResult, FrameScheduler, MAX_TARGET_FPS, SchedulerConfig};
pub use session::{SessionControl, SessionError, SessionMode};
