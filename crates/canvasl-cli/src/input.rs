//! Where the CanvasL text comes from
//!
//! An input argument is either a file path or an automaton key. With no
//! argument the built-in sample is used.

use canvasl_registry::{AutomatonRegistry, RegistryError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Two records: a subgraph and a node. Both carry an id, so both project
/// as nodes.
pub const SAMPLE_CANVASL: &str = r##"{"id":"use-cases","type":"subgraph","label":"Use Cases"}
{"id":"LIFE_TOKEN","type":"node","label":"LIFE_TOKEN","color":"#00ff00"}"##;

/// Input errors
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A resolved input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Built-in sample
    Sample,
    /// A file on disk
    File(PathBuf),
}

impl InputSource {
    /// Resolve an input argument
    ///
    /// An existing file wins over a key of the same name. Anything that looks
    /// like a path is taken as one even when it does not exist, so the error
    /// names the file rather than an unknown key.
    pub fn resolve(input: Option<&str>, registry: &AutomatonRegistry) -> Result<Self, InputError> {
        let Some(input) = input else {
            return Ok(Self::Sample);
        };

        let path = Path::new(input);
        if path.exists() || looks_like_path(input) {
            return Ok(Self::File(path.to_path_buf()));
        }

        let path = registry.lookup(input)?;
        debug!(key = input, path = %path.display(), "Resolved automaton key");
        Ok(Self::File(path))
    }

    /// Read the whole input
    pub async fn read(&self) -> Result<String, InputError> {
        match self {
            Self::Sample => Ok(SAMPLE_CANVASL.to_string()),
            Self::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| InputError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sample => write!(f, "<sample>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn looks_like_path(input: &str) -> bool {
    input.contains(['/', '\\']) || Path::new(input).extension().is_some()
}
