// relbump-common/src/model/version.rs
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RelbumpError, Result};

/// Wrapper around semver::Version for release versions.
///
/// Keeps the operator's normalized dotted string (`1.3.5`, no tag prefix)
/// for URL substitution; ordering goes through the padded semver form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    normalized: String,
    parsed: semver::Version,
}

impl Version {
    /// Parses a dotted numeric version, with or without a leading `v`.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if bare.is_empty()
            || !bare
                .split('.')
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(RelbumpError::VersionFormatInvalid(format!(
                "'{s}' is not a dotted numeric version (expected e.g. 1.3.5 or v1.3.5)"
            )));
        }
        let parts: Vec<&str> = bare.split('.').collect();
        let padded = match parts.len() {
            1 => format!("{}.0.0", parts[0]),
            2 => format!("{}.{}.0", parts[0], parts[1]),
            3 => bare.to_string(),
            n => {
                return Err(RelbumpError::VersionFormatInvalid(format!(
                    "'{s}' has {n} components, expected at most 3"
                )))
            }
        };
        let parsed = semver::Version::parse(&padded).map_err(|e| {
            RelbumpError::VersionFormatInvalid(format!(
                "Failed to parse version '{s}' (tried '{padded}'): {e}"
            ))
        })?;
        Ok(Self {
            normalized: bare.to_string(),
            parsed,
        })
    }

    /// Dotted form without the tag prefix, e.g. `1.3.5`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The `v`-prefixed tag form release URLs use, e.g. `v1.3.5`.
    pub fn tag(&self) -> String {
        format!("v{}", self.normalized)
    }

    pub fn semver(&self) -> &semver::Version {
        &self.parsed
    }
}

impl FromStr for Version {
    type Err = RelbumpError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.normalized.cmp(&other.normalized))
    }
}

// Manual Serialize/Deserialize to handle the Version<->String conversion
impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::from_str(&s).map_err(serde::de::Error::custom)
    }
}
