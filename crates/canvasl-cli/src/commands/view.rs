//! View command

use crate::config::ViewerConfig;
use crate::input::InputSource;
use canvasl_backend_terminal::{AnsiOutput, RedrawHandle, TerminalOutput, TerminalRenderer};
use canvasl_core::{Camera, RenderTarget, Scene, SceneHandle, TerminalFrame, parse_records};
use canvasl_pipeline::{
    AttachReport, DisplayConfig, DisplayError, DisplayLoop, FrameSink, LoopStats, MediaStage,
    SceneProjector, SessionControl, SessionMode,
};
use clap::Args;
use std::io::IsTerminal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const FALLBACK_SIZE: (u32, u32) = (80, 24);

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ViewArgs {
    /// CanvasL file or automaton key; the built-in sample when absent
    pub input: Option<String>,

    /// Stop after this many frames
    #[arg(short, long)]
    pub frames: Option<u64>,

    /// Target frame rate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Surface width in cells (default: terminal width)
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Surface height in cells (default: terminal height)
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in an immersive (stereo) session
    #[arg(long)]
    pub immersive: bool,

    /// Skip media attachment
    #[arg(long)]
    pub no_media: bool,

    /// Image location (file path or URL)
    #[arg(long)]
    pub image: Option<String>,

    /// Video location (file path or URL)
    #[arg(long)]
    pub video: Option<String>,

    /// Model location (file path or URL)
    #[arg(long)]
    pub model: Option<String>,
}

impl ViewArgs {
    /// Command-line values take precedence over the config file
    fn apply(&self, config: &mut ViewerConfig) {
        let display = &mut config.display;
        if let Some(frames) = self.frames {
            display.max_frames = Some(frames);
        }
        if let Some(fps) = self.fps {
            display.scheduler.target_fps = fps;
        }
        if let Some(width) = self.width {
            display.width = Some(width);
        }
        if let Some(height) = self.height {
            display.height = Some(height);
        }

        let media = &mut config.media;
        if self.no_media {
            media.enabled = false;
        }
        for (arg, slot) in [
            (&self.image, &mut media.image),
            (&self.video, &mut media.video),
            (&self.model, &mut media.model),
        ] {
            if let Some(location) = arg {
                *slot = Some(location.clone());
            }
        }
    }
}

pub async fn run(args: ViewArgs, mut config: ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    args.apply(&mut config);

    let source = InputSource::resolve(args.input.as_deref(), &config.registry())?;
    let text = source.read().await?;
    info!("Viewing {}", source);

    let target = RenderTarget::default();
    let (session, session_rx) = SessionControl::new(target.xr_enabled);
    let scene = SceneHandle::new(Scene::new(Camera::default(), target));

    // Graph first, so the first frame already shows it
    let mut records = parse_records(&text);
    let report = SceneProjector::new(config.projector.clone())
        .project(records.by_ref(), &scene)
        .await;
    if records.dropped() > 0 {
        warn!(dropped = records.dropped(), "Skipped malformed lines");
    }
    debug!(entities = report.entities(), "Graph projected");

    let depth = config.color_depth();
    let terminal = std::io::stdout()
        .is_terminal()
        .then(|| TerminalOutput::new(depth));
    let redraw = terminal.as_ref().map(TerminalOutput::redraw_handle);

    let media = if config.media.enabled {
        let stage = MediaStage::from_config(&config.media);
        info!(sources = stage.source_count(), "Attaching media");
        Some(tokio::spawn(attach_media(stage, scene.clone(), redraw)))
    } else {
        None
    };

    if args.immersive {
        session.enter_immersive()?;
    }

    let (width, height) = surface_size(&config.display);
    let renderer = TerminalRenderer::new(width, height);

    let stats = match terminal {
        Some(mut output) => {
            output.init()?;
            display(config.display, renderer, output, session_rx, scene).await?
        }
        None => {
            let output = AnsiOutput::new(std::io::stdout(), depth);
            display(config.display, renderer, output, session_rx, scene).await?
        }
    };

    if let Some(stats) = stats {
        info!(
            frames = stats.frames,
            dropped = stats.dropped,
            average_fps = stats.average_fps,
            "Viewer finished"
        );
    }

    if let Some(handle) = media {
        if handle.is_finished() {
            match handle.await {
                Ok(report) => info!(
                    attached = report.attached.len(),
                    failed = report.failed.len(),
                    "Media attachment finished"
                ),
                Err(e) => warn!(error = %e, "Media task failed"),
            }
        } else {
            debug!("Media still loading at exit");
            handle.abort();
        }
    }

    Ok(())
}

/// Attach media, then repaint the surface over any log lines it produced
async fn attach_media(
    stage: MediaStage,
    scene: SceneHandle,
    redraw: Option<RedrawHandle>,
) -> AttachReport {
    let report = stage.attach_all(scene).await;
    if let Some(redraw) = redraw {
        redraw.request();
    }
    report
}

/// Run the display loop until it finishes or the user interrupts
///
/// Returns `None` on interrupt. The sink is dropped before returning either
/// way, which restores the terminal.
async fn display<S>(
    config: DisplayConfig,
    renderer: TerminalRenderer,
    sink: S,
    session: watch::Receiver<SessionMode>,
    scene: SceneHandle,
) -> Result<Option<LoopStats>, DisplayError>
where
    S: FrameSink<TerminalFrame>,
{
    let display = DisplayLoop::new(config, renderer, sink, session);

    tokio::select! {
        result = display.run(scene) => result.map(Some),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(None)
        }
    }
}

fn surface_size(config: &DisplayConfig) -> (u32, u32) {
    let detected = TerminalOutput::size().ok();
    let (fallback_w, fallback_h) = detected.unwrap_or(FALLBACK_SIZE);
    (
        config.width.unwrap_or(fallback_w),
        config.height.unwrap_or(fallback_h),
    )
}
