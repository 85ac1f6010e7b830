// relbump-core/src/lib.rs
pub mod source;
pub mod updater;

// Re-export key types
pub use source::{ArtifactSource, HttpArtifactSource};
pub use updater::{
    update_descriptor, verify_descriptor, FieldChange, UpdateOutcome, VerifyEntry, VerifyStatus,
};
