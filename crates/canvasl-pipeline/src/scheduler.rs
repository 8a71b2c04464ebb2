//! Frame scheduling
//!
//! Tracks frame timing for the display loop: cadence, dropped frames and
//! achieved frame rate.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Upper bound on the frame cadence
pub const MAX_TARGET_FPS: f64 = 1000.0;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Target frame rate
    pub target_fps: f64,
    /// Frames slower than this rate count as dropped
    pub min_fps: f64,
    /// Frame time history size for averaging
    pub history_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            min_fps: 30.0,
            history_size: 30,
        }
    }
}

impl SchedulerConfig {
    /// Terminal surfaces do not need more than 30fps
    pub fn terminal() -> Self {
        Self {
            target_fps: 30.0,
            min_fps: 15.0,
            history_size: 30,
        }
    }
}

/// Frame timing tracker
#[derive(Debug)]
pub struct FrameScheduler {
    config: SchedulerConfig,
    /// Frame time history (in milliseconds)
    frame_times: VecDeque<f64>,
    /// Start of the frame in progress
    frame_start: Option<Instant>,
    frames_rendered: u64,
    frames_dropped: u64,
}

impl FrameScheduler {
    /// Create a scheduler
    pub fn new(config: SchedulerConfig) -> Self {
        let history = config.history_size;
        Self {
            config,
            frame_times: VecDeque::with_capacity(history),
            frame_start: None,
            frames_rendered: 0,
            frames_dropped: 0,
        }
    }

    /// Target rate limited to `1..=MAX_TARGET_FPS`; NaN counts as 1
    pub fn target_fps(&self) -> f64 {
        self.config.target_fps.max(1.0).min(MAX_TARGET_FPS)
    }

    /// Interval between frames at the target rate, never zero
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps())
    }

    /// Target frame time in milliseconds
    pub fn target_frame_time_ms(&self) -> f64 {
        1000.0 / self.target_fps()
    }

    /// Longest acceptable frame time in milliseconds
    pub fn max_frame_time_ms(&self) -> f64 {
        1000.0 / self.config.min_fps.max(1.0)
    }

    /// Mark the start of a frame
    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Mark the end of a frame and record its time
    pub fn end_frame(&mut self) -> FrameResult {
        let frame_time_ms = self
            .frame_start
            .take()
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.record(frame_time_ms)
    }

    fn record(&mut self, frame_time_ms: f64) -> FrameResult {
        self.frames_rendered += 1;
        self.frame_times.push_back(frame_time_ms);
        while self.frame_times.len() > self.config.history_size.max(1) {
            self.frame_times.pop_front();
        }

        let dropped = frame_time_ms > self.max_frame_time_ms();
        if dropped {
            self.frames_dropped += 1;
        }

        FrameResult {
            frame: self.frames_rendered,
            frame_time_ms,
            dropped,
        }
    }

    /// Average frame time over the history window
    pub fn average_frame_time(&self) -> f64 {
        if self.frame_times.is_empty() {
            0.0
        } else {
            self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64
        }
    }

    /// Frame rate implied by the average frame time
    pub fn current_fps(&self) -> f64 {
        let avg = self.average_frame_time();
        if avg > 0.0 { 1000.0 / avg } else { 0.0 }
    }

    /// Frames completed
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Frames over budget
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Fraction of frames over budget
    pub fn drop_rate(&self) -> f64 {
        if self.frames_rendered == 0 {
            0.0
        } else {
            self.frames_dropped as f64 / self.frames_rendered as f64
        }
    }
}

/// Timing of one completed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameResult {
    /// 1-based frame number
    pub frame: u64,
    /// Time spent rendering and presenting
    pub frame_time_ms: f64,
    /// Over the maximum frame time
    pub dropped: bool,
}
