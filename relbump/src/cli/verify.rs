//! Contains the logic for the `verify` command.
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use relbump_common::config::{Config, DEFAULT_FORMULA_PATH};
use relbump_common::error::{RelbumpError, Result};
use relbump_common::model::artifact::PlatformPredicate;
use relbump_core::source::HttpArtifactSource;
use relbump_core::updater::{self, VerifyStatus};

#[derive(clap::Args, Debug)]
pub struct Verify {
    /// Path to the formula to verify
    #[arg(long, default_value = DEFAULT_FORMULA_PATH)]
    pub formula: PathBuf,
}

impl Verify {
    pub async fn run(&self) -> Result<()> {
        // A single attempt per artifact: verification checks what is
        // published now, it does not wait for CI.
        let config = Config::new(self.formula.clone(), 1, Duration::from_secs(2))?;
        let descriptor_text = fs::read_to_string(config.formula_path()).map_err(|e| {
            RelbumpError::IoError(format!(
                "Failed to read formula {}: {}",
                config.formula_path().display(),
                e
            ))
        })?;

        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!("Verifying {}", config.formula_path().display()).bold()
        );

        let source = HttpArtifactSource::new(&config)?;
        let entries =
            updater::verify_descriptor(&descriptor_text, &source, &PlatformPredicate::ALL).await?;

        let mut mismatches = 0u32;
        let mut pending = 0u32;
        for entry in &entries {
            match &entry.status {
                VerifyStatus::Match => {
                    println!(
                        " {} {} ({})",
                        "✓".green().bold(),
                        entry.platform.describe(),
                        entry.url
                    );
                }
                VerifyStatus::Pending => {
                    pending += 1;
                    println!(
                        " {} {} checksum still pending publication",
                        "·".yellow(),
                        entry.platform.describe()
                    );
                }
                VerifyStatus::Mismatch { expected, actual } => {
                    mismatches += 1;
                    println!(
                        " {} {}: expected {} but published bytes hash to {}",
                        "✗".red().bold(),
                        entry.platform.describe(),
                        expected,
                        actual
                    );
                }
            }
        }

        if mismatches > 0 {
            return Err(RelbumpError::ChecksumError(format!(
                "{mismatches} artifact reference(s) do not match their published bytes"
            )));
        }
        if pending > 0 {
            println!(
                "{}",
                format!(
                    "{pending} checksum(s) pending - rerun `relbump update` once CI has published the binaries."
                )
                .yellow()
            );
        } else {
            println!("{}", "All artifact references verified.".green());
        }
        Ok(())
    }
}
