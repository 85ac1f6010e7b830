// relbump-net/src/http.rs
use std::time::Duration;

use rand::Rng;
use relbump_common::config::Config;
use relbump_common::error::{RelbumpError, Result};
use reqwest::header::{HeaderMap, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::validation::validate_url;

const FETCH_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str =
    "relbump release tool (Rust; +https://github.com/goten002/radio-cli)";
const MAX_JITTER_MS: u64 = 500;

pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, USER_AGENT_STRING.parse().unwrap());
    headers.insert(ACCEPT, "*/*".parse().unwrap());
    Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| RelbumpError::HttpError(format!("Failed to build HTTP client: {e}")))
}

/// Fetches a release artifact, polling with bounded exponential backoff
/// while the asset is still unpublished (CI uploads binaries out of band,
/// some time after the tag is pushed).
pub async fn fetch_artifact(
    client: &Client,
    name: &str,
    url: &str,
    config: &Config,
) -> Result<Vec<u8>> {
    validate_url(url)?;

    let mut last_error: Option<RelbumpError> = None;
    for attempt in 0..config.max_fetch_attempts {
        if attempt > 0 {
            let delay = backoff_delay(config.retry_base_delay, attempt) + jitter();
            debug!(
                "Artifact '{}' not available yet, retrying in {:?} (attempt {}/{})",
                name,
                delay,
                attempt + 1,
                config.max_fetch_attempts
            );
            tokio::time::sleep(delay).await;
        }
        match try_fetch(client, name, url).await {
            Ok(bytes) => {
                debug!("Fetched {} bytes for '{}' from {}", bytes.len(), name, url);
                return Ok(bytes);
            }
            Err(e @ RelbumpError::ArtifactUnavailable { .. }) => {
                warn!(
                    "Fetch attempt {}/{} failed for '{}': {}",
                    attempt + 1,
                    config.max_fetch_attempts,
                    name,
                    e
                );
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| RelbumpError::ArtifactUnavailable {
        name: name.to_string(),
        url: url.to_string(),
        reason: "all fetch attempts failed".to_string(),
    }))
}

async fn try_fetch(client: &Client, name: &str, url: &str) -> Result<Vec<u8>> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return Err(RelbumpError::ArtifactUnavailable {
                name: name.to_string(),
                url: url.to_string(),
                reason: format!("request failed: {e}"),
            })
        }
    };
    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);

    match status {
        StatusCode::NOT_FOUND => Err(RelbumpError::ArtifactUnavailable {
            name: name.to_string(),
            url: url.to_string(),
            reason: "not found (404) - the release asset may not be published yet".to_string(),
        }),
        s if !s.is_success() => {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            Err(RelbumpError::HttpError(format!(
                "HTTP error {s} for URL {url}: {body_text}"
            )))
        }
        _ => {
            let content = response.bytes().await?;
            Ok(content.to_vec())
        }
    }
}

/// Doubles the base delay per attempt, capped so a long retry ladder does
/// not overflow.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(6))
}

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..MAX_JITTER_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(8));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(16));
    }

    #[test]
    fn backoff_is_capped() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff_delay(base, 6), backoff_delay(base, 60));
    }

    #[test]
    fn jitter_is_bounded() {
        for _ in 0..32 {
            assert!(jitter() < Duration::from_millis(MAX_JITTER_MS));
        }
    }

    #[tokio::test]
    async fn non_https_url_fails_before_any_request() {
        let client = build_http_client().unwrap();
        let config = Config::default();
        let result = fetch_artifact(
            &client,
            "source",
            "http://github.com/goten002/radio-cli/archive/refs/tags/v1.0.0.tar.gz",
            &config,
        )
        .await;
        assert!(matches!(result, Err(RelbumpError::ValidationError(_))));
    }
}
