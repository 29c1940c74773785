use crate::types::{FeedSource, FetchError, SummarizationError};
use async_trait::async_trait;

/// Retrieves the raw feed document for a source.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// One outbound request per call, no retries. A failure here only
    /// affects the given source.
    async fn fetch(&self, source: &FeedSource) -> std::result::Result<String, FetchError>;
}

/// Boundary to an external text-generation service.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Rewrite an item's text into a short summary. `Ok(None)` means the
    /// summarizer chose not to produce one.
    async fn summarize(
        &self,
        title: &str,
        excerpt: &str,
    ) -> std::result::Result<Option<String>, SummarizationError>;
}
