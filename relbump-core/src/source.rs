// relbump-core/src/source.rs
use async_trait::async_trait;
use relbump_common::config::Config;
use relbump_common::error::Result;
use relbump_net::http;

/// Where artifact bytes come from. The production implementation fetches
/// over HTTPS; tests substitute in-memory bytes.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Retrieves the artifact at `url`. `name` is the operator-facing
    /// label used in errors and logs.
    async fn fetch(&self, name: &str, url: &str) -> Result<Vec<u8>>;
}

/// HTTPS-backed artifact source with the bounded retry/backoff poll.
pub struct HttpArtifactSource {
    client: reqwest::Client,
    config: Config,
}

impl HttpArtifactSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http::build_http_client()?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch(&self, name: &str, url: &str) -> Result<Vec<u8>> {
        http::fetch_artifact(&self.client, name, url, &self.config).await
    }
}
