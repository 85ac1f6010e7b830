// relbump-common/src/config.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{RelbumpError, Result};

pub const DEFAULT_FORMULA_PATH: &str = "Formula/radio-cli.rb";
const DEFAULT_MAX_FETCH_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_BASE_DELAY_SECS: u64 = 2;

/// Explicit configuration threaded through every call.
///
/// The original release tooling leaked state through exported shell
/// variables; everything the tool needs now travels in this struct.
#[derive(Debug, Clone)]
pub struct Config {
    pub formula_path: PathBuf,
    pub max_fetch_attempts: u32,
    pub retry_base_delay: Duration,
}

impl Config {
    pub fn new(
        formula_path: PathBuf,
        max_fetch_attempts: u32,
        retry_base_delay: Duration,
    ) -> Result<Self> {
        if max_fetch_attempts == 0 {
            return Err(RelbumpError::Config(
                "max fetch attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            formula_path,
            max_fetch_attempts,
            retry_base_delay,
        })
    }

    pub fn formula_path(&self) -> &Path {
        &self.formula_path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formula_path: PathBuf::from(DEFAULT_FORMULA_PATH),
            max_fetch_attempts: DEFAULT_MAX_FETCH_ATTEMPTS,
            retry_base_delay: Duration::from_secs(DEFAULT_RETRY_BASE_DELAY_SECS),
        }
    }
}
