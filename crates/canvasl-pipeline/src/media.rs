//! Media attachment
//!
//! Four kinds of auxiliary content are fetched independently of the graph
//! and attached at fixed anchors. Each fetch is its own task: a failure is
//! logged and recorded, never propagated, and never holds back the others.
//!
//! ```text
//! ImageSource ─┐
//! VideoSource ─┼─► JoinSet ─► coordinator ─► SceneHandle::append
//! ModelSource ─┤                   │
//! Synthetic  ──┘                   └─► AttachReport (successes + failures)
//! ```

use crate::decode;
use async_trait::async_trait;
use canvasl_core::{
    EntityOrigin, MediaKind, Material, ModelAsset, SceneEntity, SceneHandle, Shape, Texture,
    VideoStream,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Payload used by the default synthetic source
pub const DEFAULT_SYNTHETIC_PAYLOAD: &str = "Dynamic metaverse data";

/// Media fetch/decode errors
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Attachment task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Where a piece of media lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLocation {
    /// Local file
    Path(PathBuf),
    /// HTTP(S) resource
    Url(String),
}

impl MediaLocation {
    /// Parse a location; `http://` and `https://` prefixes mean a URL
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }

    /// Fetch the raw bytes
    pub async fn fetch(&self) -> Result<Vec<u8>, MediaError> {
        match self {
            Self::Path(path) => Ok(tokio::fs::read(path).await?),
            Self::Url(url) => {
                let response = reqwest::get(url.as_str()).await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

impl fmt::Display for MediaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// A fetched, decoded piece of media
#[derive(Debug, Clone)]
pub enum MediaAsset {
    /// Still image
    Image(Texture),
    /// Video stream
    Video(VideoStream),
    /// Model package
    Model(ModelAsset),
    /// Generated texture
    Synthetic(Texture),
}

impl MediaAsset {
    /// Kind of this asset
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
            Self::Model(_) => MediaKind::Model,
            Self::Synthetic(_) => MediaKind::Synthetic,
        }
    }
}

/// An independently fetchable piece of media
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Which anchor the result attaches to
    fn kind(&self) -> MediaKind;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    /// Fetch and decode
    async fn fetch(&self) -> Result<MediaAsset, MediaError>;
}

/// Still image decoded with the `image` crate
pub struct ImageSource {
    location: MediaLocation,
}

impl ImageSource {
    /// Create an image source
    pub fn new(location: MediaLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl MediaSource for ImageSource {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn describe(&self) -> String {
        self.location.to_string()
    }

    async fn fetch(&self) -> Result<MediaAsset, MediaError> {
        let bytes = self.location.fetch().await?;
        let texture = tokio::task::spawn_blocking(move || decode::decode_image(&bytes))
            .await
            .map_err(|e| MediaError::Task(e.to_string()))??;
        Ok(MediaAsset::Image(texture))
    }
}

/// Video stream, recognised by container
pub struct VideoSource {
    location: MediaLocation,
}

impl VideoSource {
    /// Create a video source
    pub fn new(location: MediaLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl MediaSource for VideoSource {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn describe(&self) -> String {
        self.location.to_string()
    }

    async fn fetch(&self) -> Result<MediaAsset, MediaError> {
        let bytes = self.location.fetch().await?;
        decode::sniff_video(&self.describe(), &bytes).map(MediaAsset::Video)
    }
}

/// glTF / GLB model package
pub struct ModelSource {
    location: MediaLocation,
}

impl ModelSource {
    /// Create a model source
    pub fn new(location: MediaLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl MediaSource for ModelSource {
    fn kind(&self) -> MediaKind {
        MediaKind::Model
    }

    fn describe(&self) -> String {
        self.location.to_string()
    }

    async fn fetch(&self) -> Result<MediaAsset, MediaError> {
        let bytes = self.location.fetch().await?;
        decode::parse_model(&self.describe(), &bytes).map(MediaAsset::Model)
    }
}

/// Texture generated from an in-memory payload
pub struct SyntheticSource {
    payload: Vec<u8>,
}

impl SyntheticSource {
    /// Create a synthetic source
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

#[async_trait]
impl MediaSource for SyntheticSource {
    fn kind(&self) -> MediaKind {
        MediaKind::Synthetic
    }

    fn describe(&self) -> String {
        format!("in-memory payload ({} bytes)", self.payload.len())
    }

    async fn fetch(&self) -> Result<MediaAsset, MediaError> {
        Ok(MediaAsset::Synthetic(decode::synthesize_texture(
            &self.payload,
        )))
    }
}

/// Fixed placement for each media kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaAnchors {
    /// Image plane center
    pub image: [f64; 3],
    /// Image plane size
    pub image_size: [f64; 2],
    /// Video plane center
    pub video: [f64; 3],
    /// Video plane size
    pub video_size: [f64; 2],
    /// Model origin
    pub model: [f64; 3],
    /// Synthetic sphere center
    pub synthetic: [f64; 3],
    /// Synthetic sphere radius
    pub synthetic_radius: f64,
}

impl Default for MediaAnchors {
    fn default() -> Self {
        Self {
            image: [0.0, 0.0, -5.0],
            image_size: [5.0, 5.0],
            video: [10.0, 0.0, -5.0],
            video_size: [16.0, 9.0],
            model: [-10.0, 0.0, -5.0],
            synthetic: [0.0, 10.0, -5.0],
            synthetic_radius: 2.0,
        }
    }
}

impl MediaAnchors {
    /// Place an asset at its anchor
    pub fn place(&self, asset: MediaAsset) -> SceneEntity {
        let kind = asset.kind();
        let shape = match asset {
            MediaAsset::Image(texture) => Shape::Plane {
                center: self.image,
                size: self.image_size,
                material: Material::Texture(Arc::new(texture)),
                double_sided: true,
            },
            MediaAsset::Video(stream) => Shape::Plane {
                center: self.video,
                size: self.video_size,
                material: Material::Video(stream),
                double_sided: false,
            },
            MediaAsset::Model(asset) => Shape::Model {
                origin: self.model,
                asset,
            },
            MediaAsset::Synthetic(texture) => Shape::Sphere {
                center: self.synthetic,
                radius: self.synthetic_radius,
                material: Material::Texture(Arc::new(texture)),
                label: None,
            },
        };
        SceneEntity::new(EntityOrigin::Media(kind), shape)
    }
}

/// Media locations and anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Attach media at all
    pub enabled: bool,
    /// Image location (file path or URL)
    pub image: Option<String>,
    /// Video location
    pub video: Option<String>,
    /// Model location
    pub model: Option<String>,
    /// Payload for the synthetic texture; `None` skips it
    pub synthetic_payload: Option<String>,
    /// Placement
    pub anchors: MediaAnchors,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: Some("example.png".to_string()),
            video: Some("example.webm".to_string()),
            model: Some("example.glb".to_string()),
            synthetic_payload: Some(DEFAULT_SYNTHETIC_PAYLOAD.to_string()),
            anchors: MediaAnchors::default(),
        }
    }
}

/// Outcome of one attachment pass
#[derive(Debug, Clone, Default)]
pub struct AttachReport {
    /// Kinds attached, in completion order
    pub attached: Vec<MediaKind>,
    /// Kinds that failed, with the reason
    pub failed: Vec<(MediaKind, String)>,
}

impl AttachReport {
    /// Whether a kind made it into the scene
    pub fn is_attached(&self, kind: MediaKind) -> bool {
        self.attached.contains(&kind)
    }
}

/// Coordinator for the independent media fetches
pub struct MediaStage {
    anchors: MediaAnchors,
    sources: Vec<Arc<dyn MediaSource>>,
}

impl MediaStage {
    /// Stage with no sources
    pub fn new(anchors: MediaAnchors) -> Self {
        Self {
            anchors,
            sources: Vec::new(),
        }
    }

    /// Stage with the sources named in the config
    pub fn from_config(config: &MediaConfig) -> Self {
        let mut stage = Self::new(config.anchors.clone());
        if !config.enabled {
            return stage;
        }
        if let Some(image) = &config.image {
            stage = stage.with_source(ImageSource::new(MediaLocation::parse(image)));
        }
        if let Some(video) = &config.video {
            stage = stage.with_source(VideoSource::new(MediaLocation::parse(video)));
        }
        if let Some(model) = &config.model {
            stage = stage.with_source(ModelSource::new(MediaLocation::parse(model)));
        }
        if let Some(payload) = &config.synthetic_payload {
            stage = stage.with_source(SyntheticSource::new(payload.as_bytes()));
        }
        stage
    }

    /// Add a source
    pub fn with_source(mut self, source: impl MediaSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Number of sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fetch every source concurrently and append each success as it lands
    ///
    /// Never fails; failures are logged and listed in the report.
    pub async fn attach_all(self, scene: SceneHandle) -> AttachReport {
        let mut tasks = JoinSet::new();
        for source in self.sources {
            let kind = source.kind();
            debug!(kind = %kind, source = %source.describe(), "Fetching media");
            tasks.spawn(async move {
                // Inner task so a panicking decoder still reports its kind
                let outcome = match tokio::spawn(async move { source.fetch().await }).await {
                    Ok(result) => result,
                    Err(e) => Err(MediaError::Task(e.to_string())),
                };
                (kind, outcome)
            });
        }

        let mut report = AttachReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((kind, Ok(asset))) => {
                    scene.append(self.anchors.place(asset)).await;
                    info!(kind = %kind, "Media attached");
                    report.attached.push(kind);
                }
                Ok((kind, Err(e))) => {
                    warn!(kind = %kind, error = %e, "Media attachment skipped");
                    report.failed.push((kind, e.to_string()));
                }
                Err(e) => warn!(error = %e, "Media coordinator task aborted"),
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::fixtures;
    use canvasl_core::Scene;
    use std::io::Write;

    struct FailingSource(MediaKind);

    #[async_trait]
    impl MediaSource for FailingSource {
        fn kind(&self) -> MediaKind {
            self.0
        }

        fn describe(&self) -> String {
            "always fails".to_string()
        }

        async fn fetch(&self) -> Result<MediaAsset, MediaError> {
            Err(MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "gone",
            )))
        }
    }

    /// Synthetic texture that arrives after a delay
    struct DelayedSource(std::time::Duration);

    #[async_trait]
    impl MediaSource for DelayedSource {
        fn kind(&self) -> MediaKind {
            MediaKind::Synthetic
        }

        fn describe(&self) -> String {
            format!("delayed by {:?}", self.0)
        }

        async fn fetch(&self) -> Result<MediaAsset, MediaError> {
            tokio::time::sleep(self.0).await;
            Ok(MediaAsset::Synthetic(decode::synthesize_texture(b"late")))
        }
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> MediaLocation {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        MediaLocation::Path(path)
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(
            MediaLocation::parse("https://example.com/a.png"),
            MediaLocation::Url("https://example.com/a.png".into())
        );
        assert_eq!(
            MediaLocation::parse("assets/a.png"),
            MediaLocation::Path(PathBuf::from("assets/a.png"))
        );
    }

    #[test]
    fn test_place_at_anchors() {
        let anchors = MediaAnchors::default();
        let entity = anchors.place(MediaAsset::Synthetic(Texture::solid(1, 1, [0; 3])));
        assert_eq!(entity.origin, EntityOrigin::Media(MediaKind::Synthetic));
        match entity.shape {
            Shape::Sphere { center, radius, .. } => {
                assert_eq!(center, [0.0, 10.0, -5.0]);
                assert_eq!(radius, 2.0);
            }
            other => panic!("expected sphere, got {other:?}"),
        }

        let entity = anchors.place(MediaAsset::Image(Texture::solid(1, 1, [0; 3])));
        match entity.shape {
            Shape::Plane {
                center,
                size,
                double_sided,
                ..
            } => {
                assert_eq!(center, [0.0, 0.0, -5.0]);
                assert_eq!(size, [5.0, 5.0]);
                assert!(double_sided);
            }
            other => panic!("expected plane, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_video_failure_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let stage = MediaStage::new(MediaAnchors::default())
            .with_source(ImageSource::new(write_temp(&dir, "a.png", &fixtures::png())))
            .with_source(VideoSource::new(MediaLocation::Path(
                dir.path().join("missing.webm"),
            )))
            .with_source(ModelSource::new(write_temp(
                &dir,
                "a.glb",
                &fixtures::glb(r#"{"asset":{"version":"2.0"},"nodes":[{}]}"#),
            )))
            .with_source(SyntheticSource::new(DEFAULT_SYNTHETIC_PAYLOAD));

        let scene = SceneHandle::new(Scene::default());
        let report = stage.attach_all(scene.clone()).await;

        assert!(report.is_attached(MediaKind::Image));
        assert!(report.is_attached(MediaKind::Model));
        assert!(report.is_attached(MediaKind::Synthetic));
        assert!(!report.is_attached(MediaKind::Video));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, MediaKind::Video);
        assert_eq!(scene.read().await.media_entity_count(), 3);
    }

    #[tokio::test]
    async fn test_all_failures_leave_graph_intact() {
        let scene = SceneHandle::new(Scene::default());
        scene
            .append(SceneEntity::node([0.0; 3], 1.0, [0, 255, 0], None))
            .await;

        let stage = MediaStage::new(MediaAnchors::default())
            .with_source(FailingSource(MediaKind::Image))
            .with_source(FailingSource(MediaKind::Model));
        let report = stage.attach_all(scene.clone()).await;

        assert!(report.attached.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(scene.len().await, 1);
    }

    #[tokio::test]
    async fn test_unsupported_video_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = VideoSource::new(write_temp(&dir, "a.webm", b"not a video"));
        assert!(matches!(
            source.fetch().await,
            Err(MediaError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_config() {
        assert_eq!(MediaStage::from_config(&MediaConfig::default()).source_count(), 4);

        let disabled = MediaConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(MediaStage::from_config(&disabled).source_count(), 0);

        let partial = MediaConfig {
            video: None,
            synthetic_payload: None,
            ..Default::default()
        };
        assert_eq!(MediaStage::from_config(&partial).source_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_graph_order_survives_concurrent_media() {
        use crate::projector::SceneProjector;
        use canvasl_core::{Record, RecordKind, classify, parse_records};
        use std::time::Duration;

        let mut text = String::new();
        for i in 0..200 {
            text.push_str(&format!("{{\"id\":\"n{i}\",\"x\":{}}}\n", i * 10));
            if i > 0 {
                text.push_str(&format!("{{\"from\":\"n{}\",\"to\":\"n{i}\"}}\n", i - 1));
            }
        }
        let records: Vec<Record> = parse_records(&text).collect();
        let expected: Vec<RecordKind> = records.iter().map(classify).collect();

        let scene = SceneHandle::default();
        let stage = MediaStage::new(MediaAnchors::default())
            .with_source(SyntheticSource::new("early"))
            .with_source(FailingSource(MediaKind::Image))
            .with_source(DelayedSource(Duration::from_millis(1)))
            .with_source(DelayedSource(Duration::from_millis(5)));
        let media = tokio::spawn(stage.attach_all(scene.clone()));
        tokio::task::yield_now().await;

        let projected = SceneProjector::default().project(records, &scene).await;
        let report = media.await.unwrap();
        assert_eq!(report.attached.len(), 3);
        assert_eq!(report.failed.len(), 1);

        let scene = scene.read().await;
        assert_eq!(scene.len(), projected.entities() + 3);

        let graph: Vec<usize> = scene
            .entities()
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e.origin, EntityOrigin::Graph(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(graph.len(), expected.len());
        // One batch: no media entity lands between graph entities
        assert_eq!(graph[graph.len() - 1] - graph[0] + 1, graph.len());

        let kinds: Vec<RecordKind> = graph
            .iter()
            .filter_map(|&i| match scene.entities()[i].origin {
                EntityOrigin::Graph(kind) => Some(kind),
                EntityOrigin::Media(_) => None,
            })
            .collect();
        assert_eq!(kinds, expected);

        let centers: Vec<f64> = graph
            .iter()
            .filter_map(|&i| match &scene.entities()[i].shape {
                Shape::Sphere { center, .. } => Some(center[0]),
                _ => None,
            })
            .collect();
        let input_order: Vec<f64> = (0..200).map(f64::from).collect();
        assert_eq!(centers, input_order);
    }
}
