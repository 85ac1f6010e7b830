// relbump-common/src/model/artifact.rs
use serde::{Deserialize, Serialize};

/// Platform predicate gating an artifact reference in the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformPredicate {
    /// The main source archive, outside any platform branch.
    Source,
    /// The `Hardware::CPU.intel?` branch under `on_macos`.
    MacosIntel,
    /// The matching `else` branch.
    MacosArm,
}

impl PlatformPredicate {
    pub const ALL: [PlatformPredicate; 3] = [Self::Source, Self::MacosIntel, Self::MacosArm];

    /// Label used in operator-facing output.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Source => "source archive",
            Self::MacosIntel => "macOS (Intel)",
            Self::MacosArm => "macOS (ARM)",
        }
    }

    /// The textual anchor this predicate is recognized by in the descriptor.
    pub fn anchor(&self) -> &'static str {
        match self {
            Self::Source => "top-level url/sha256 pair",
            Self::MacosIntel => "if Hardware::CPU.intel?",
            Self::MacosArm => "else branch of Hardware::CPU.intel?",
        }
    }
}

/// State of a descriptor sha256 field.
///
/// Only a digest computed from actually fetched bytes counts as pinned;
/// anything that is not 64 hex chars is a placeholder for an artifact
/// whose checksum is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Checksum {
    Pinned(String),
    Pending(String),
}

impl Checksum {
    pub fn classify(raw: &str) -> Self {
        if raw.len() == 64 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Checksum::Pinned(raw.to_ascii_lowercase())
        } else {
            Checksum::Pending(raw.to_string())
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Checksum::Pending(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Checksum::Pinned(s) | Checksum::Pending(s) => s,
        }
    }
}

/// One download-URL/checksum pair from the release descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReference {
    pub platform: PlatformPredicate,
    pub url: String,
    pub checksum: Checksum,
}
