//! Display loop
//!
//! Re-renders the shared scene from its fixed camera at a steady cadence.
//! The loop only ever reads the scene; producers may still be appending
//! while it runs, so an empty or half-populated scene is a normal frame.

use crate::scheduler::{FrameScheduler, SchedulerConfig};
use crate::session::SessionMode;
use canvasl_core::{Scene, SceneHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, Level, debug, info, span, warn};

/// Draws a scene into a frame
///
/// Implementations must return quickly; the scene is read-locked for the
/// duration of the call.
pub trait SceneRenderer: Send {
    /// Frame type produced
    type Frame: Send;

    /// Renderer name for logs
    fn name(&self) -> &'static str;

    /// Render the current scene state
    fn render(&mut self, scene: &Scene, mode: SessionMode) -> Result<Self::Frame, RenderError>;
}

/// Presents frames on a surface
pub trait FrameSink<F>: Send {
    /// Show a frame
    fn present(&mut self, frame: &F) -> Result<(), SinkError>;
}

/// Rendering errors; a failed frame is skipped
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface: {0}")]
    InvalidSurface(String),

    #[error("Rendering failed: {0}")]
    Failed(String),
}

/// Presentation errors; the surface is unusable
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Surface closed")]
    Closed,
}

/// Display loop errors
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Presentation failed: {0}")]
    Sink(#[from] SinkError),
}

/// Display loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Frame cadence
    pub scheduler: SchedulerConfig,
    /// Stop after this many frames; `None` runs until the process exits
    pub max_frames: Option<u64>,
    /// Surface width; `None` uses the terminal size
    pub width: Option<u32>,
    /// Surface height; `None` uses the terminal size
    pub height: Option<u32>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::terminal(),
            max_frames: None,
            width: None,
            height: None,
        }
    }
}

/// Statistics from a finished loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopStats {
    /// Frames attempted
    pub frames: u64,
    /// Frames over budget
    pub dropped: u64,
    /// Frames skipped because rendering failed
    pub render_errors: u64,
    /// Achieved frame rate
    pub average_fps: f64,
}

/// Continuously renders a scene to a sink
pub struct DisplayLoop<R, S> {
    config: DisplayConfig,
    renderer: R,
    sink: S,
    scheduler: FrameScheduler,
    session: watch::Receiver<SessionMode>,
}

impl<R, S> DisplayLoop<R, S>
where
    R: SceneRenderer,
    S: FrameSink<R::Frame>,
{
    /// Create a loop
    pub fn new(
        config: DisplayConfig,
        renderer: R,
        sink: S,
        session: watch::Receiver<SessionMode>,
    ) -> Self {
        let scheduler = FrameScheduler::new(config.scheduler.clone());
        Self {
            config,
            renderer,
            sink,
            scheduler,
            session,
        }
    }

    /// Frame timing so far
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Render until `max_frames` is reached, or forever
    pub async fn run(self, scene: SceneHandle) -> Result<LoopStats, DisplayError> {
        let span = span!(Level::DEBUG, "display_loop", renderer = self.renderer.name());
        self.run_frames(scene).instrument(span).await
    }

    async fn run_frames(mut self, scene: SceneHandle) -> Result<LoopStats, DisplayError> {
        let mut interval = tokio::time::interval(self.scheduler.frame_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut render_errors = 0u64;

        info!(
            renderer = self.renderer.name(),
            target_fps = self.scheduler.target_fps(),
            max_frames = ?self.config.max_frames,
            "Display loop started"
        );

        loop {
            if self
                .config
                .max_frames
                .is_some_and(|max| self.scheduler.frames_rendered() >= max)
            {
                break;
            }

            interval.tick().await;
            self.scheduler.begin_frame();

            let mode = *self.session.borrow();
            let frame = {
                let scene = scene.read().await;
                self.renderer.render(&scene, mode)
            };

            match frame {
                Ok(frame) => self.sink.present(&frame)?,
                Err(e) => {
                    render_errors += 1;
                    warn!(error = %e, "Frame skipped");
                }
            }

            let result = self.scheduler.end_frame();
            if result.dropped {
                debug!(
                    frame = result.frame,
                    frame_time_ms = result.frame_time_ms,
                    "Frame over budget"
                );
            }
        }

        let stats = LoopStats {
            frames: self.scheduler.frames_rendered(),
            dropped: self.scheduler.frames_dropped(),
            render_errors,
            average_fps: self.scheduler.current_fps(),
        };
        info!(frames = stats.frames, dropped = stats.dropped, "Display loop finished");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionControl;
    use canvasl_core::SceneEntity;
    use std::sync::{Arc, Mutex};

    /// Renders the entity count and session mode
    struct CountingRenderer {
        fail_on: Option<usize>,
        calls: usize,
    }

    impl SceneRenderer for CountingRenderer {
        type Frame = (usize, SessionMode);

        fn name(&self) -> &'static str {
            "counting"
        }

        fn render(&mut self, scene: &Scene, mode: SessionMode) -> Result<Self::Frame, RenderError> {
            self.calls += 1;
            if self.fail_on == Some(self.calls) {
                return Err(RenderError::Failed("boom".into()));
            }
            Ok((scene.len(), mode))
        }
    }

    #[derive(Clone, Default)]
    struct CaptureSink(Arc<Mutex<Vec<(usize, SessionMode)>>>);

    impl FrameSink<(usize, SessionMode)> for CaptureSink {
        fn present(&mut self, frame: &(usize, SessionMode)) -> Result<(), SinkError> {
            self.0.lock().map_err(|_| SinkError::Closed)?.push(*frame);
            Ok(())
        }
    }

    struct ClosedSink;

    impl FrameSink<(usize, SessionMode)> for ClosedSink {
        fn present(&mut self, _frame: &(usize, SessionMode)) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    fn fast_config(frames: u64) -> DisplayConfig {
        DisplayConfig {
            scheduler: SchedulerConfig {
                target_fps: 500.0,
                ..Default::default()
            },
            max_frames: Some(frames),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_renders_empty_scene() {
        let (_control, rx) = SessionControl::new(true);
        let sink = CaptureSink::default();
        let display = DisplayLoop::new(
            fast_config(3),
            CountingRenderer {
                fail_on: None,
                calls: 0,
            },
            sink.clone(),
            rx,
        );

        let stats = display.run(SceneHandle::default()).await.unwrap();
        assert_eq!(stats.frames, 3);
        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![(0, SessionMode::Inline); 3]
        );
    }

    #[tokio::test]
    async fn test_unbounded_target_fps() {
        for target_fps in [1e12, f64::INFINITY] {
            let (_control, rx) = SessionControl::new(true);
            let config = DisplayConfig {
                scheduler: SchedulerConfig {
                    target_fps,
                    ..Default::default()
                },
                max_frames: Some(2),
                ..Default::default()
            };
            let display = DisplayLoop::new(
                config,
                CountingRenderer {
                    fail_on: None,
                    calls: 0,
                },
                CaptureSink::default(),
                rx,
            );

            let stats = display.run(SceneHandle::default()).await.unwrap();
            assert_eq!(stats.frames, 2);
        }
    }

    #[tokio::test]
    async fn test_observes_appends_and_session() {
        let (control, rx) = SessionControl::new(true);
        let scene = SceneHandle::default();
        let sink = CaptureSink::default();

        scene
            .append(SceneEntity::node([0.0; 3], 1.0, [0, 255, 0], None))
            .await;
        control.enter_immersive().unwrap();

        let display = DisplayLoop::new(
            fast_config(2),
            CountingRenderer {
                fail_on: None,
                calls: 0,
            },
            sink.clone(),
            rx,
        );
        display.run(scene.clone()).await.unwrap();

        // Reading never mutates
        assert_eq!(scene.len().await, 1);
        assert!(
            sink.0
                .lock()
                .unwrap()
                .iter()
                .all(|f| *f == (1, SessionMode::Immersive))
        );
    }

    #[tokio::test]
    async fn test_render_error_skips_frame() {
        let (_control, rx) = SessionControl::new(true);
        let sink = CaptureSink::default();
        let display = DisplayLoop::new(
            fast_config(3),
            CountingRenderer {
                fail_on: Some(2),
                calls: 0,
            },
            sink.clone(),
            rx,
        );

        let stats = display.run(SceneHandle::default()).await.unwrap();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.render_errors, 1);
        assert_eq!(sink.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sink_error_ends_loop() {
        let (_control, rx) = SessionControl::new(true);
        let display = DisplayLoop::new(
            fast_config(5),
            CountingRenderer {
                fail_on: None,
                calls: 0,
            },
            ClosedSink,
            rx,
        );

        assert!(matches!(
            display.run(SceneHandle::default()).await,
            Err(DisplayError::Sink(SinkError::Closed))
        ));
    }
}
