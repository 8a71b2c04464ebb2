//! Key → path lookup rooted at a data directory

use crate::automaton::AutomatonFile;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the data directory at the workspace root
pub const DEFAULT_DATA_DIR: &str = "files";

/// `files/` at the workspace root, independent of the working directory
pub fn default_data_dir() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/canvasl-registry -> workspace root
    match manifest.ancestors().nth(2) {
        Some(root) => root.join(DEFAULT_DATA_DIR),
        None => manifest.join(DEFAULT_DATA_DIR),
    }
}

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CANVASL_DATA_DIR";

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown automaton key: {0}")]
    UnknownKey(String),
}

/// Resolves automaton keys to file paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomatonRegistry {
    data_dir: PathBuf,
}

impl AutomatonRegistry {
    /// Registry rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Registry rooted at `$CANVASL_DATA_DIR`, or [`default_data_dir`]
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => {
                debug!(dir = ?dir, "Using data directory from environment");
                Self::new(dir)
            }
            None => Self::default(),
        }
    }

    /// Root directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a known file
    pub fn path(&self, file: AutomatonFile) -> PathBuf {
        self.data_dir.join(file.file_name())
    }

    /// Path for a key or deprecated alias
    ///
    /// Fails only for keys outside the fixed set.
    pub fn lookup(&self, key: &str) -> Result<PathBuf, RegistryError> {
        AutomatonFile::from_key(key).map(|file| self.path(file))
    }

    /// All twelve paths, A₀–A₁₁
    pub fn list_all(&self) -> Vec<PathBuf> {
        self.paths(&AutomatonFile::ALL)
    }

    /// A₀–A₄
    pub fn list_primary(&self) -> Vec<PathBuf> {
        self.paths(&AutomatonFile::PRIMARY)
    }

    /// A₅–A₁₁
    pub fn list_extended(&self) -> Vec<PathBuf> {
        self.paths(&AutomatonFile::EXTENDED)
    }

    /// (key, path) pairs, A₀–A₁₁
    pub fn entries(&self) -> Vec<(&'static str, PathBuf)> {
        AutomatonFile::ALL
            .iter()
            .map(|f| (f.key(), self.path(*f)))
            .collect()
    }

    fn paths(&self, files: &[AutomatonFile]) -> Vec<PathBuf> {
        files.iter().map(|f| self.path(*f)).collect()
    }
}

impl Default for AutomatonRegistry {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::DEPRECATED_ALIASES;
    use std::collections::HashSet;

    #[test]
    fn test_alias_resolves_to_identical_path() {
        let registry = AutomatonRegistry::new("/data/evolutions");
        let canonical = registry.lookup("a0Unified").unwrap();
        let alias = registry.lookup("unified").unwrap();

        assert_eq!(
            canonical.as_os_str().as_encoded_bytes(),
            alias.as_os_str().as_encoded_bytes()
        );
        assert_eq!(
            canonical,
            PathBuf::from("/data/evolutions/a0-unified-automaton.canvasl")
        );

        for (alias, file) in DEPRECATED_ALIASES {
            assert_eq!(registry.lookup(alias).unwrap(), registry.path(file));
        }
    }

    #[test]
    fn test_default_dir_is_anchored() {
        let registry = AutomatonRegistry::default();
        assert!(registry.data_dir().is_absolute());
        assert!(registry.data_dir().ends_with(DEFAULT_DATA_DIR));
        assert!(registry.data_dir().parent().unwrap().join("Cargo.toml").exists());
        assert_eq!(
            registry.lookup("a11Master").unwrap(),
            default_data_dir().join("a11-master.canvasl")
        );
    }

    #[test]
    fn test_list_sizes() {
        let registry = AutomatonRegistry::default();
        assert_eq!(registry.list_all().len(), 12);
        assert_eq!(registry.list_primary().len(), 5);
        assert_eq!(registry.list_extended().len(), 7);
    }

    #[test]
    fn test_primary_and_extended_cover_all() {
        let registry = AutomatonRegistry::default();
        let all: HashSet<_> = registry.list_all().into_iter().collect();
        let union: HashSet<_> = registry
            .list_primary()
            .into_iter()
            .chain(registry.list_extended())
            .collect();
        assert_eq!(union, all);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let registry = AutomatonRegistry::default();
        assert!(matches!(
            registry.lookup("a12Missing"),
            Err(RegistryError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_entries_order() {
        let registry = AutomatonRegistry::new("d");
        let entries = registry.entries();
        assert_eq!(entries.first().map(|(k, _)| *k), Some("a0Unified"));
        assert_eq!(entries.last().map(|(k, _)| *k), Some("a11Master"));
        assert_eq!(
            entries[10].1,
            Path::new("d").join("a10-mqtt-herald.canvasl")
        );
    }

    #[test]
    fn test_paths_point_into_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AutomatonRegistry::new(dir.path());
        assert_eq!(registry.data_dir(), dir.path());
        for path in registry.list_all() {
            assert_eq!(path.parent(), Some(dir.path()));
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("canvasl"));
        }
    }
}
