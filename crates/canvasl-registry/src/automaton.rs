//! The fixed set of automaton files

use crate::registry::RegistryError;
use std::fmt;
use std::str::FromStr;

/// One of the twelve canonical automaton files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AutomatonFile {
    A0Unified,
    A1KernelSeed,
    A2Shape,
    A3Centroid,
    A4Basis,
    A5SheafGluer,
    A6HomologyChecker,
    A7WebAuthnOracle,
    A8Bip32Keymaster,
    A9WebRtcMessenger,
    A10MqttHerald,
    A11Master,
}

/// Legacy keys kept for backward compatibility
///
/// Each resolves to exactly the same file as its replacement.
pub const DEPRECATED_ALIASES: [(&str, AutomatonFile); 5] = [
    ("unified", AutomatonFile::A0Unified),
    ("kernelSeed", AutomatonFile::A1KernelSeed),
    ("shape", AutomatonFile::A2Shape),
    ("centroid", AutomatonFile::A3Centroid),
    ("basis", AutomatonFile::A4Basis),
];

impl AutomatonFile {
    /// A₀–A₁₁ in order
    pub const ALL: [AutomatonFile; 12] = [
        Self::A0Unified,
        Self::A1KernelSeed,
        Self::A2Shape,
        Self::A3Centroid,
        Self::A4Basis,
        Self::A5SheafGluer,
        Self::A6HomologyChecker,
        Self::A7WebAuthnOracle,
        Self::A8Bip32Keymaster,
        Self::A9WebRtcMessenger,
        Self::A10MqttHerald,
        Self::A11Master,
    ];

    /// A₀–A₄, the primary foundation files
    pub const PRIMARY: [AutomatonFile; 5] = [
        Self::A0Unified,
        Self::A1KernelSeed,
        Self::A2Shape,
        Self::A3Centroid,
        Self::A4Basis,
    ];

    /// A₅–A₁₁, the extended automata files
    pub const EXTENDED: [AutomatonFile; 7] = [
        Self::A5SheafGluer,
        Self::A6HomologyChecker,
        Self::A7WebAuthnOracle,
        Self::A8Bip32Keymaster,
        Self::A9WebRtcMessenger,
        Self::A10MqttHerald,
        Self::A11Master,
    ];

    /// Symbolic key
    pub fn key(self) -> &'static str {
        match self {
            Self::A0Unified => "a0Unified",
            Self::A1KernelSeed => "a1KernelSeed",
            Self::A2Shape => "a2Shape",
            Self::A3Centroid => "a3Centroid",
            Self::A4Basis => "a4Basis",
            Self::A5SheafGluer => "a5SheafGluer",
            Self::A6HomologyChecker => "a6HomologyChecker",
            Self::A7WebAuthnOracle => "a7WebAuthnOracle",
            Self::A8Bip32Keymaster => "a8BIP32Keymaster",
            Self::A9WebRtcMessenger => "a9WebRTCMessenger",
            Self::A10MqttHerald => "a10MQTTHerald",
            Self::A11Master => "a11Master",
        }
    }

    /// File name inside the data directory
    pub fn file_name(self) -> &'static str {
        match self {
            Self::A0Unified => "a0-unified-automaton.canvasl",
            Self::A1KernelSeed => "a1-automaton-kernel-seed.canvasl",
            Self::A2Shape => "a2-metaverse-shape.canvasl",
            Self::A3Centroid => "a3-metaverse-centroid.canvasl",
            Self::A4Basis => "a4-autonomous-basis.canvasl",
            Self::A5SheafGluer => "a5-sheaf-gluer.canvasl",
            Self::A6HomologyChecker => "a6-homology-checker.canvasl",
            Self::A7WebAuthnOracle => "a7-webauthn-oracle.canvasl",
            Self::A8Bip32Keymaster => "a8-bip32-keymaster.canvasl",
            Self::A9WebRtcMessenger => "a9-webrtc-messenger.canvasl",
            Self::A10MqttHerald => "a10-mqtt-herald.canvasl",
            Self::A11Master => "a11-master.canvasl",
        }
    }

    /// Automaton index, 0–11
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is one of A₀–A₄
    pub fn is_primary(self) -> bool {
        self.index() < Self::PRIMARY.len()
    }

    /// Resolve a canonical key or a deprecated alias
    pub fn from_key(key: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == key)
            .or_else(|| Self::from_deprecated_alias(key))
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))
    }

    /// Resolve only a deprecated alias
    pub fn from_deprecated_alias(alias: &str) -> Option<Self> {
        DEPRECATED_ALIASES
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, file)| *file)
    }
}

impl FromStr for AutomatonFile {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl fmt::Display for AutomatonFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sets_partition_all() {
        let all: HashSet<_> = AutomatonFile::ALL.into_iter().collect();
        let primary: HashSet<_> = AutomatonFile::PRIMARY.into_iter().collect();
        let extended: HashSet<_> = AutomatonFile::EXTENDED.into_iter().collect();

        assert_eq!(all.len(), 12);
        assert!(primary.is_disjoint(&extended));
        assert_eq!(&primary | &extended, all);
    }

    #[test]
    fn test_keys_round_trip() {
        for file in AutomatonFile::ALL {
            assert_eq!(AutomatonFile::from_key(file.key()).unwrap(), file);
            assert_eq!(file.key().parse::<AutomatonFile>().unwrap(), file);
        }
    }

    #[test]
    fn test_deprecated_aliases() {
        assert_eq!(
            AutomatonFile::from_key("unified").unwrap(),
            AutomatonFile::A0Unified
        );
        assert_eq!(
            AutomatonFile::from_key("basis").unwrap(),
            AutomatonFile::A4Basis
        );
        for (_, file) in DEPRECATED_ALIASES {
            assert!(file.is_primary());
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = AutomatonFile::from_key("a12Nothing").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownKey(ref k) if k == "a12Nothing"));
        assert!(AutomatonFile::from_key("A0Unified").is_err());
    }

    #[test]
    fn test_index_and_primary() {
        assert_eq!(AutomatonFile::A11Master.index(), 11);
        assert!(AutomatonFile::A4Basis.is_primary());
        assert!(!AutomatonFile::A5SheafGluer.is_primary());
        assert_eq!(AutomatonFile::A8Bip32Keymaster.to_string(), "a8BIP32Keymaster");
    }
}
