//! Contains the logic for the `update` command.
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use relbump_common::config::{Config, DEFAULT_FORMULA_PATH};
use relbump_common::error::{RelbumpError, Result};
use relbump_common::model::artifact::PlatformPredicate;
use relbump_common::model::version::Version;
use relbump_core::source::{ArtifactSource, HttpArtifactSource};
use relbump_core::updater;

use crate::diff;

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Target version, with or without the leading `v` (e.g. 1.0.0 or v1.0.0)
    pub version: Option<String>,

    /// Path to the formula to rewrite
    #[arg(long, default_value = DEFAULT_FORMULA_PATH)]
    pub formula: PathBuf,

    /// How often to poll for a not-yet-published release asset
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// Base delay in seconds between polls (doubled per attempt)
    #[arg(long, default_value_t = 2)]
    pub retry_delay: u64,

    /// Print the diff without writing the formula back
    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    pub async fn run(&self) -> Result<()> {
        let config = self.build_config()?;
        let source = HttpArtifactSource::new(&config)?;
        self.run_with_source(&config, &source).await
    }

    fn build_config(&self) -> Result<Config> {
        Config::new(
            self.formula.clone(),
            self.max_attempts,
            Duration::from_secs(self.retry_delay),
        )
    }

    async fn run_with_source<S: ArtifactSource>(&self, config: &Config, source: &S) -> Result<()> {
        let Some(raw_version) = self.version.as_deref() else {
            return Err(RelbumpError::VersionFormatInvalid(
                "missing <version> argument (expected e.g. 1.0.0 or v1.0.0)".to_string(),
            ));
        };
        let target = Version::parse(raw_version)?;

        let original = fs::read_to_string(config.formula_path()).map_err(|e| {
            RelbumpError::IoError(format!(
                "Failed to read formula {}: {}",
                config.formula_path().display(),
                e
            ))
        })?;

        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!(
                "Updating {} to {}",
                config.formula_path().display(),
                target.tag()
            )
            .bold()
        );

        let outcome =
            updater::update_descriptor(&original, &target, source, &PlatformPredicate::ALL).await?;

        for change in &outcome.changes {
            println!(
                "    {} {} -> {}",
                change.platform.describe().cyan(),
                short_digest(&change.old_sha256),
                short_digest(&change.new_sha256).green()
            );
        }

        if outcome.content == original {
            println!("{}", "Formula already up to date.".yellow());
            return Ok(());
        }

        diff::print_line_diff(&original, &outcome.content);

        if self.dry_run {
            println!("{}", "Dry run - formula not written.".yellow());
            return Ok(());
        }

        fs::write(config.formula_path(), &outcome.content).map_err(|e| {
            RelbumpError::IoError(format!(
                "Failed to write formula {}: {}",
                config.formula_path().display(),
                e
            ))
        })?;
        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!("Wrote {}", config.formula_path().display()).bold()
        );
        println!("Review, commit and push the change to publish the release.");
        Ok(())
    }
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    const FIXTURE: &str = r#"class RadioCli < Formula
  desc "Terminal-based internet radio player with visualizations"
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

    struct StaticSource(HashMap<String, Vec<u8>>);

    impl StaticSource {
        fn empty() -> Self {
            Self(HashMap::new())
        }

        fn for_release() -> Self {
            let mut artifacts = HashMap::new();
            artifacts.insert(
                "https://github.com/goten002/radio-cli/archive/refs/tags/v1.0.0.tar.gz"
                    .to_string(),
                b"radio-cli v1.0.0 source tarball".to_vec(),
            );
            artifacts.insert(
                "https://github.com/goten002/radio-cli/releases/download/v1.0.0/radio_cli-macos-intel"
                    .to_string(),
                b"intel binary payload".to_vec(),
            );
            artifacts.insert(
                "https://github.com/goten002/radio-cli/releases/download/v1.0.0/radio_cli-macos-arm"
                    .to_string(),
                b"arm binary payload".to_vec(),
            );
            Self(artifacts)
        }
    }

    #[async_trait]
    impl ArtifactSource for StaticSource {
        async fn fetch(&self, name: &str, url: &str) -> Result<Vec<u8>> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| RelbumpError::ArtifactUnavailable {
                    name: name.to_string(),
                    url: url.to_string(),
                    reason: "not published".to_string(),
                })
        }
    }

    fn args_for(version: Option<&str>, formula: PathBuf, dry_run: bool) -> UpdateArgs {
        UpdateArgs {
            version: version.map(String::from),
            formula,
            max_attempts: 1,
            retry_delay: 0,
            dry_run,
        }
    }

    #[tokio::test]
    async fn missing_version_fails_before_any_fetch() {
        let args = args_for(None, PathBuf::from(DEFAULT_FORMULA_PATH), false);
        let config = args.build_config().unwrap();
        let err = args
            .run_with_source(&config, &StaticSource::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, RelbumpError::VersionFormatInvalid(_)));
    }

    #[tokio::test]
    async fn malformed_version_fails_before_any_fetch() {
        // An empty source would fail with ArtifactUnavailable if a fetch
        // were attempted; VersionFormatInvalid proves we never got there.
        let args = args_for(Some("one.two"), PathBuf::from(DEFAULT_FORMULA_PATH), false);
        let config = args.build_config().unwrap();
        let err = args
            .run_with_source(&config, &StaticSource::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, RelbumpError::VersionFormatInvalid(_)));
    }

    #[tokio::test]
    async fn update_writes_formula_back() {
        let dir = tempfile::tempdir().unwrap();
        let formula_path = dir.path().join("radio-cli.rb");
        fs::write(&formula_path, FIXTURE).unwrap();

        let args = args_for(Some("v1.0.0"), formula_path.clone(), false);
        let config = args.build_config().unwrap();
        args.run_with_source(&config, &StaticSource::for_release())
            .await
            .unwrap();

        let written = fs::read_to_string(&formula_path).unwrap();
        assert!(written.contains("archive/refs/tags/v1.0.0.tar.gz"));
        assert!(written.contains("download/v1.0.0/radio_cli-macos-intel"));
        assert!(!written.contains("REPLACE_AFTER_PUSHING_TAG"));
        assert!(written.contains("license \"MIT\""));
    }

    #[tokio::test]
    async fn dry_run_leaves_formula_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let formula_path = dir.path().join("radio-cli.rb");
        fs::write(&formula_path, FIXTURE).unwrap();

        let args = args_for(Some("1.0.0"), formula_path.clone(), true);
        let config = args.build_config().unwrap();
        args.run_with_source(&config, &StaticSource::for_release())
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&formula_path).unwrap(), FIXTURE);
    }
}
