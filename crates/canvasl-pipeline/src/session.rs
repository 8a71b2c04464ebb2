//! Immersive session control
//!
//! Entering an immersive session redirects rendering to an immersive surface
//! showing the same scene. What triggers entry is up to the host; the
//! display loop only observes the current mode.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// How frames are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Single full-viewport view
    #[default]
    Inline,
    /// Stereo immersive view
    Immersive,
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Immersive sessions are disabled on this render target")]
    XrDisabled,
}

/// Switches the display loop between inline and immersive presentation
#[derive(Debug)]
pub struct SessionControl {
    xr_enabled: bool,
    mode: watch::Sender<SessionMode>,
}

impl SessionControl {
    /// Create a control and the receiver the display loop watches
    pub fn new(xr_enabled: bool) -> (Self, watch::Receiver<SessionMode>) {
        let (mode, rx) = watch::channel(SessionMode::Inline);
        (Self { xr_enabled, mode }, rx)
    }

    /// Another receiver for an additional observer
    pub fn subscribe(&self) -> watch::Receiver<SessionMode> {
        self.mode.subscribe()
    }

    /// Current mode
    pub fn mode(&self) -> SessionMode {
        *self.mode.borrow()
    }

    /// Start an immersive session
    pub fn enter_immersive(&self) -> Result<(), SessionError> {
        if !self.xr_enabled {
            return Err(SessionError::XrDisabled);
        }
        if self.mode.send_replace(SessionMode::Immersive) != SessionMode::Immersive {
            info!("Entered immersive session");
        }
        Ok(())
    }

    /// Return to inline presentation
    pub fn exit_immersive(&self) {
        if self.mode.send_replace(SessionMode::Inline) != SessionMode::Inline {
            info!("Left immersive session");
        }
    }
}
