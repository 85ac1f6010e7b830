// relbump-core/src/updater.rs
//! The release descriptor update and verification flows.

use relbump_common::error::{RelbumpError, Result};
use relbump_common::formula::{self, Descriptor, ReferenceUpdate};
use relbump_common::model::artifact::{Checksum, PlatformPredicate};
use relbump_common::model::version::Version;
use relbump_net::validation::{checksums_match, digest_bytes};
use tracing::debug;

use crate::source::ArtifactSource;

/// One applied url/checksum substitution, for operator review.
#[derive(Debug, Clone)]
pub struct FieldChange {
    pub platform: PlatformPredicate,
    pub old_url: String,
    pub new_url: String,
    pub old_sha256: String,
    pub new_sha256: String,
}

/// Result of an update run: the patched descriptor text and what changed.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub content: String,
    pub changes: Vec<FieldChange>,
}

/// Rewrites every expected artifact reference to the target version:
/// substitutes the version token in the URL, fetches the artifact's bytes,
/// and pins the sha256 field to their digest.
///
/// Running this twice with the same version and bytes yields byte-identical
/// output. Writing the result anywhere is the caller's concern.
pub async fn update_descriptor<S: ArtifactSource>(
    descriptor_text: &str,
    target: &Version,
    source: &S,
    expected: &[PlatformPredicate],
) -> Result<UpdateOutcome> {
    let descriptor = Descriptor::parse(descriptor_text)?;

    let mut updates = Vec::with_capacity(expected.len());
    let mut changes = Vec::with_capacity(expected.len());
    for platform in expected {
        let reference = descriptor
            .reference(*platform)
            .ok_or_else(|| RelbumpError::PatternNotFound(platform.anchor().to_string()))?;
        let new_url = formula::substitute_version(&reference.url, target)?;
        debug!("Fetching {} from {}", platform.describe(), new_url);
        let bytes = source.fetch(platform.describe(), &new_url).await?;
        let digest = digest_bytes(&bytes);
        debug!(
            "Computed sha256 {} ({} bytes) for {}",
            digest,
            bytes.len(),
            platform.describe()
        );
        changes.push(FieldChange {
            platform: *platform,
            old_url: reference.url.clone(),
            new_url: new_url.clone(),
            old_sha256: reference.checksum.as_str().to_string(),
            new_sha256: digest.clone(),
        });
        updates.push(ReferenceUpdate {
            platform: *platform,
            url: new_url,
            sha256: digest,
        });
    }

    let content = descriptor.with_updates(&updates)?;
    Ok(UpdateOutcome { content, changes })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    Match,
    Mismatch { expected: String, actual: String },
    Pending,
}

#[derive(Debug, Clone)]
pub struct VerifyEntry {
    pub platform: PlatformPredicate,
    pub url: String,
    pub status: VerifyStatus,
}

/// Re-fetches every expected artifact whose checksum is pinned and compares
/// digests. Pending placeholders are reported, never compared.
pub async fn verify_descriptor<S: ArtifactSource>(
    descriptor_text: &str,
    source: &S,
    expected: &[PlatformPredicate],
) -> Result<Vec<VerifyEntry>> {
    let descriptor = Descriptor::parse(descriptor_text)?;

    let mut entries = Vec::with_capacity(expected.len());
    for platform in expected {
        let reference = descriptor
            .reference(*platform)
            .ok_or_else(|| RelbumpError::PatternNotFound(platform.anchor().to_string()))?;
        let status = match &reference.checksum {
            Checksum::Pending(_) => {
                debug!(
                    "Skipping {}: checksum still pending publication",
                    platform.describe()
                );
                VerifyStatus::Pending
            }
            Checksum::Pinned(pinned) => {
                let bytes = source.fetch(platform.describe(), &reference.url).await?;
                let actual = digest_bytes(&bytes);
                if checksums_match(pinned, &actual) {
                    VerifyStatus::Match
                } else {
                    VerifyStatus::Mismatch {
                        expected: pinned.clone(),
                        actual,
                    }
                }
            }
        };
        entries.push(VerifyEntry {
            platform: *platform,
            url: reference.url.clone(),
            status,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    const FIXTURE: &str = r#"class RadioCli < Formula
  desc "Terminal-based internet radio player with visualizations"
  homepage "https://github.com/goten002/radio-cli"
  url "https://github.com/goten002/radio-cli/archive/refs/tags/v0.8.6.tar.gz"
  sha256 "accbccd9bf5beb4b1dac81c528d0437b8e4687f2a67743abafaff13b1fa05462"
  license "MIT"

  on_macos do
    if Hardware::CPU.intel?
      url "https://github.com/goten002/radio-cli/releases/download/v0.8.6/radio_cli-macos-intel"
      sha256 "REPLACE_AFTER_PUSHING_TAG"
    else
      url "https://github.com/goten002/radio-cli/releases/download/v0.8.6/radio_cli-macos-arm"
      sha256 "10e5266acea1cf7d84aa0e3c4117cc669bb1b737430a82bcaba970c21f861510"
    end
  end
end
"#;

    const SOURCE_URL_V1: &str =
        "https://github.com/goten002/radio-cli/archive/refs/tags/v1.0.0.tar.gz";
    const INTEL_URL_V1: &str =
        "https://github.com/goten002/radio-cli/releases/download/v1.0.0/radio_cli-macos-intel";
    const ARM_URL_V1: &str =
        "https://github.com/goten002/radio-cli/releases/download/v1.0.0/radio_cli-macos-arm";

    struct StaticSource {
        artifacts: HashMap<String, Vec<u8>>,
    }

    impl StaticSource {
        fn with(entries: &[(&str, &[u8])]) -> Self {
            Self {
                artifacts: entries
                    .iter()
                    .map(|(url, bytes)| (url.to_string(), bytes.to_vec()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ArtifactSource for StaticSource {
        async fn fetch(&self, name: &str, url: &str) -> Result<Vec<u8>> {
            self.artifacts.get(url).cloned().ok_or_else(|| {
                RelbumpError::ArtifactUnavailable {
                    name: name.to_string(),
                    url: url.to_string(),
                    reason: "not published".to_string(),
                }
            })
        }
    }

    fn release_source() -> StaticSource {
        StaticSource::with(&[
            (SOURCE_URL_V1, b"radio-cli v1.0.0 source tarball"),
            (INTEL_URL_V1, b"intel binary payload"),
            (ARM_URL_V1, b"arm binary payload"),
        ])
    }

    #[tokio::test]
    async fn scenario_update_0_8_6_to_1_0_0() {
        let target = Version::parse("v1.0.0").unwrap();
        let outcome =
            update_descriptor(FIXTURE, &target, &release_source(), &PlatformPredicate::ALL)
                .await
                .unwrap();
        assert_eq!(outcome.changes.len(), 3);

        let patched = Descriptor::parse(&outcome.content).unwrap();
        for reference in patched.references() {
            assert!(
                reference.url.contains("/v1.0.0"),
                "URL not bumped: {}",
                reference.url
            );
            assert!(!reference.checksum.is_pending());
        }
        assert_eq!(
            patched
                .reference(PlatformPredicate::Source)
                .unwrap()
                .checksum
                .as_str(),
            "4631cc6a8344ed2e53665dc4994defc3ed958de4478d30ee75d42a0540bdaeaa"
        );
        assert_eq!(
            patched
                .reference(PlatformPredicate::MacosIntel)
                .unwrap()
                .checksum
                .as_str(),
            "78eea10c5d13985a29e84331186f53ac20f9764d5dea552956ec551705cefc2c"
        );
        assert_eq!(
            patched
                .reference(PlatformPredicate::MacosArm)
                .unwrap()
                .checksum
                .as_str(),
            "56c510ab9c61df7ea2f040c1cea97168074a796ee2c1e176ae0ad6dda97c8631"
        );

        // Unrelated descriptor content is untouched.
        assert!(outcome
            .content
            .contains("desc \"Terminal-based internet radio player with visualizations\""));
        assert!(outcome.content.contains("license \"MIT\""));
        assert!(outcome
            .content
            .contains("homepage \"https://github.com/goten002/radio-cli\""));
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let target = Version::parse("1.0.0").unwrap();
        let source = release_source();
        let once = update_descriptor(FIXTURE, &target, &source, &PlatformPredicate::ALL)
            .await
            .unwrap();
        let twice = update_descriptor(&once.content, &target, &source, &PlatformPredicate::ALL)
            .await
            .unwrap();
        assert_eq!(once.content, twice.content);
    }

    #[tokio::test]
    async fn checksum_is_digest_of_fetched_bytes() {
        let target = Version::parse("1.0.0").unwrap();
        let outcome =
            update_descriptor(FIXTURE, &target, &release_source(), &PlatformPredicate::ALL)
                .await
                .unwrap();
        let change = outcome
            .changes
            .iter()
            .find(|c| c.platform == PlatformPredicate::Source)
            .unwrap();
        assert_eq!(
            change.new_sha256,
            digest_bytes(b"radio-cli v1.0.0 source tarball")
        );
        assert_eq!(change.old_sha256.len(), 64);
    }

    #[tokio::test]
    async fn missing_platform_anchor_fails() {
        let source_only = r#"class RadioCli < Formula
  url "https://github.com/goten002/radio-cli/archive/refs/tags/v0.8.6.tar.gz"
  sha256 "accbccd9bf5beb4b1dac81c528d0437b8e4687f2a67743abafaff13b1fa05462"
end
"#;
        let target = Version::parse("1.0.0").unwrap();
        let err = update_descriptor(
            source_only,
            &target,
            &release_source(),
            &PlatformPredicate::ALL,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RelbumpError::PatternNotFound(_)));
    }

    #[tokio::test]
    async fn unpublished_artifact_fails_with_unavailable() {
        let target = Version::parse("1.0.0").unwrap();
        let empty = StaticSource::with(&[]);
        let err = update_descriptor(FIXTURE, &target, &empty, &PlatformPredicate::ALL)
            .await
            .unwrap_err();
        assert!(matches!(err, RelbumpError::ArtifactUnavailable { .. }));
    }

    #[tokio::test]
    async fn verify_reports_pending_without_fetching() {
        // No intel entry in the map: a pending checksum must never be fetched.
        let source = StaticSource::with(&[
            (
                "https://github.com/goten002/radio-cli/archive/refs/tags/v0.8.6.tar.gz",
                b"old source tarball",
            ),
            (
                "https://github.com/goten002/radio-cli/releases/download/v0.8.6/radio_cli-macos-arm",
                b"old arm binary",
            ),
        ]);
        let entries = verify_descriptor(FIXTURE, &source, &PlatformPredicate::ALL)
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].status, VerifyStatus::Match);
        assert_eq!(entries[1].status, VerifyStatus::Pending);
        assert_eq!(entries[2].status, VerifyStatus::Match);
    }

    #[tokio::test]
    async fn verify_detects_mismatch() {
        let source = StaticSource::with(&[
            (
                "https://github.com/goten002/radio-cli/archive/refs/tags/v0.8.6.tar.gz",
                b"old source tarball",
            ),
            (
                "https://github.com/goten002/radio-cli/releases/download/v0.8.6/radio_cli-macos-arm",
                b"tampered bytes",
            ),
        ]);
        let entries = verify_descriptor(FIXTURE, &source, &PlatformPredicate::ALL)
            .await
            .unwrap();
        assert!(matches!(
            entries[2].status,
            VerifyStatus::Mismatch { .. }
        ));
    }
}
