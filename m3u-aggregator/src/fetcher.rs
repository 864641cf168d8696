use crate::types::{AggregatorError, FetchConfig, FetchResult, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Retrieval of playlist text. Implementations never fail: errors are
/// reported inside the returned `FetchResult`.
#[async_trait]
pub trait FetchText: Send + Sync {
    async fn fetch_playlist(&self, url: &str) -> FetchResult;
}

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Single GET of `url`. No retries.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_playlist_size_mb {
                return Err(AggregatorError::PlaylistTooLarge { size_mb });
            }
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl FetchText for Fetcher {
    async fn fetch_playlist(&self, url: &str) -> FetchResult {
        let start_time = Instant::now();

        debug!("Fetching playlist: {}", url);

        let outcome = self.fetch_text(url).await;
        let response_time_ms = start_time.elapsed().as_millis() as u64;

        let (content, error) = match outcome {
            Ok(content) => {
                info!(
                    "Fetched playlist: {} ({} bytes in {}ms)",
                    url,
                    content.len(),
                    response_time_ms
                );
                (content, None)
            }
            Err(e) => {
                warn!("Failed to fetch playlist {} after {}ms: {}", url, response_time_ms, e);
                (String::new(), Some(e.to_string()))
            }
        };

        FetchResult {
            url: url.to_string(),
            content,
            error,
            response_time_ms,
        }
    }
}
