use crate::traits::FeedFetcher;
use crate::types::{FeedSource, FetchConfig, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> std::result::Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, source: &FeedSource) -> std::result::Result<String, FetchError> {
        let start_time = Instant::now();
        let url = Url::parse(&source.url)?;
        let limit = self.config.max_feed_size_bytes();

        debug!("Fetching feed: {} ({})", source.name, url);

        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();

        if !status.is_success() {
            warn!("Feed {} answered with HTTP {}", source.name, status);
            return Err(FetchError::Status { status: status.as_u16() });
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > limit {
                return Err(FetchError::TooLarge { bytes: content_length as usize, limit });
            }
        }

        let content = response.text().await.map_err(classify)?;
        if content.len() > limit {
            return Err(FetchError::TooLarge { bytes: content.len(), limit });
        }

        info!(
            "Fetched feed: {} ({} bytes in {}ms)",
            source.name,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(error)
    }
}
