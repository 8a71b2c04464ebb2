//! CanvasL Registry - Canonical automaton file locations
//!
//! Twelve CanvasL data files describe the automata A₀–A₁₁. Callers name them
//! by symbolic key (`a0Unified` … `a11Master`) and get back a path under the
//! data directory. The first five keys form the primary foundation set, the
//! remaining seven the extended set. Five older keys survive as deprecated
//! aliases and resolve to the same paths as their replacements.

pub mod automaton;
pub mod registry;

pub use automaton::{AutomatonFile, DEPRECATED_ALIASES};
pub use registry::{
    AutomatonRegistry, DATA_DIR_ENV, DEFAULT_DATA_DIR, RegistryError, default_data_dir,
};
