// relbump-common/src/lib.rs
pub mod config;
pub mod error;
pub mod formula;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{RelbumpError, Result};
pub use formula::Descriptor;
pub use model::artifact::{ArtifactReference, Checksum, PlatformPredicate};
pub use model::version::Version;
