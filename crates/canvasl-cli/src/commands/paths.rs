//! Paths command

use crate::PathSet;
use canvasl_registry::{AutomatonFile, AutomatonRegistry, DEPRECATED_ALIASES};
use std::fmt::Write as _;

pub fn run(set: PathSet, aliases: bool, registry: &AutomatonRegistry) {
    print!("{}", listing(set, aliases, registry));
}

fn listing(set: PathSet, aliases: bool, registry: &AutomatonRegistry) -> String {
    let files: &[AutomatonFile] = match set {
        PathSet::All => &AutomatonFile::ALL,
        PathSet::Primary => &AutomatonFile::PRIMARY,
        PathSet::Extended => &AutomatonFile::EXTENDED,
    };

    let mut out = String::new();
    for file in files {
        let _ = writeln!(out, "{:<20} {}", file.key(), registry.path(*file).display());
    }

    if aliases {
        out.push_str("\nDeprecated aliases:\n");
        for (alias, file) in DEPRECATED_ALIASES {
            let _ = writeln!(out, "{:<20} -> {}", alias, file.key());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_sizes() {
        let registry = AutomatonRegistry::new("files");
        assert_eq!(listing(PathSet::All, false, &registry).lines().count(), 12);
        assert_eq!(listing(PathSet::Primary, false, &registry).lines().count(), 5);
        assert_eq!(listing(PathSet::Extended, false, &registry).lines().count(), 7);
    }

    #[test]
    fn test_listing_content() {
        let registry = AutomatonRegistry::new("files");
        let text = listing(PathSet::Primary, true, &registry);

        assert!(text.starts_with("a0Unified"));
        assert!(text.contains("files/a0-unified-automaton.canvasl"));
        assert!(text.contains("kernelSeed"));
        assert!(text.contains("-> a1KernelSeed"));
        assert!(!text.contains("a5SheafGluer "));
    }
}
