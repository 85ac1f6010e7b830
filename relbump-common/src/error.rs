use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RelbumpError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("Invalid version: {0}")]
    VersionFormatInvalid(String),

    #[error("Descriptor anchor not found: {0}")]
    PatternNotFound(String),

    #[error("Artifact unavailable: '{name}' from '{url}': {reason}")]
    ArtifactUnavailable {
        name: String,
        url: String,
        reason: String,
    },

    #[error("Checksum Error: {0}")]
    ChecksumError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Parsing Error in {0}: {1}")]
    ParseError(&'static str, String),

    #[error("IoError: {0}")]
    IoError(String),

    #[error("HttpError: {0}")]
    HttpError(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl From<std::io::Error> for RelbumpError {
    fn from(err: std::io::Error) -> Self {
        RelbumpError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for RelbumpError {
    fn from(err: reqwest::Error) -> Self {
        RelbumpError::Http(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RelbumpError>;
