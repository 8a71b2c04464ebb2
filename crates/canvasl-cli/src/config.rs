//! Viewer configuration file
//!
//! A JSON document; every field is optional and absent fields take their
//! defaults, so `{}` is a valid configuration.

use canvasl_backend_terminal::ColorDepth;
use canvasl_pipeline::{DisplayConfig, MediaConfig, ProjectorConfig};
use canvasl_registry::AutomatonRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything the viewer can be told
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Canvas to scene mapping
    pub projector: ProjectorConfig,
    /// Media locations and placement
    pub media: MediaConfig,
    /// Frame cadence and surface size
    pub display: DisplayConfig,
    /// Directory holding the automaton files; overrides the environment
    pub data_dir: Option<PathBuf>,
    /// Terminal colors; detected when absent
    pub color_depth: Option<ColorDepth>,
}

impl ViewerConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded viewer config");
        Ok(config)
    }

    /// Load from a file when one is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Registry for the configured data directory
    pub fn registry(&self) -> AutomatonRegistry {
        match &self.data_dir {
            Some(dir) => AutomatonRegistry::new(dir),
            None => AutomatonRegistry::from_env(),
        }
    }

    /// Configured color depth, or what the terminal advertises
    pub fn color_depth(&self) -> ColorDepth {
        self.color_depth.unwrap_or_else(ColorDepth::detect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_object_is_default() {
        let file = write_config("{}");
        assert_eq!(ViewerConfig::load(file.path()).unwrap(), ViewerConfig::default());
        assert_eq!(
            ViewerConfig::load_or_default(None).unwrap(),
            ViewerConfig::default()
        );
    }

    #[test]
    fn test_partial_override() {
        let file = write_config(
            r#"{
                "projector": {"coordinate_divisor": 20, "resolve_edges": false},
                "media": {"enabled": false, "video": null},
                "display": {"max_frames": 5, "scheduler": {"target_fps": 10}},
                "data_dir": "automata",
                "color_depth": "basic"
            }"#,
        );
        let config = ViewerConfig::load(file.path()).unwrap();

        assert_eq!(config.projector.coordinate_divisor, 20.0);
        assert!(!config.projector.resolve_edges);
        assert_eq!(config.projector.node_radius, 1.0);

        assert!(!config.media.enabled);
        assert!(config.media.video.is_none());
        assert_eq!(config.media.image.as_deref(), Some("example.png"));

        assert_eq!(config.display.max_frames, Some(5));
        assert_eq!(config.display.scheduler.target_fps, 10.0);
        assert_eq!(config.display.scheduler.min_fps, 30.0);

        assert_eq!(config.color_depth(), ColorDepth::Basic);
        assert_eq!(
            config.registry().lookup("a0Unified").unwrap(),
            Path::new("automata").join("a0-unified-automaton.canvasl")
        );
    }

    #[test]
    fn test_errors() {
        let missing = Path::new("/nonexistent/canvasl.json");
        assert!(matches!(
            ViewerConfig::load(missing),
            Err(ConfigError::Io { .. })
        ));

        let file = write_config("{\"projector\": 3}");
        assert!(matches!(
            ViewerConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_demo_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/viewer.json");
        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.media.image.as_deref(), Some("demos/example.png"));
        assert!(config.media.video.is_none());
        assert_eq!(config.display.scheduler.target_fps, 20.0);
    }
}
