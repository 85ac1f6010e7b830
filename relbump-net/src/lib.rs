// relbump-net/src/lib.rs
pub mod http;
pub mod validation;

// Re-export the public fetching helpers
pub use http::{build_http_client, fetch_artifact};
pub use validation::{checksums_match, digest_bytes, validate_url};
