use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A syndication feed endpoint. Defined once at process start and shared
/// read-only by every item parsed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: String,
    pub url: String,
    pub name: String,
    pub category: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl FeedSource {
    pub fn new(id: &str, url: &str, name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub summary_raw: String,
    pub summary_generated: Option<String>,
    pub source: Arc<FeedSource>,
}

impl NewsItem {
    /// Text the renderer should show: the generated summary when present,
    /// otherwise the raw excerpt.
    pub fn display_summary(&self) -> &str {
        self.summary_generated.as_deref().unwrap_or(&self.summary_raw)
    }
}

/// Items parsed from one feed document, plus how many entries were skipped.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub items: Vec<NewsItem>,
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Digest/1.0".to_string(),
            timeout_seconds: 15,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    pub fn max_feed_size_bytes(&self) -> usize {
        self.max_feed_size_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Wall-clock budget for one run. Fetches and summaries still pending
    /// when it expires are abandoned.
    pub run_budget: std::time::Duration,
    /// How far in the future a publication date may be and still count.
    pub clock_skew: Duration,
    pub summary_concurrency: usize,
    pub compare_titles: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            run_budget: std::time::Duration::from_secs(60),
            clock_skew: Duration::minutes(5),
            summary_concurrency: 4,
            compare_titles: true,
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.summary_concurrency == 0 {
            return Err(ConfigurationError::InvalidConcurrency);
        }
        Ok(())
    }
}

/// Largest accepted look-back window, in days.
pub const MAX_DAYS: u32 = 36_500;

/// Validated parameters of one digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestRequest {
    pub days: u32,
    pub limit: usize,
    pub summarize: bool,
}

impl DigestRequest {
    pub fn new(days: i64, limit: i64, summarize: bool) -> std::result::Result<Self, ConfigurationError> {
        let days = u32::try_from(days)
            .ok()
            .filter(|d| (1..=MAX_DAYS).contains(d))
            .ok_or(ConfigurationError::InvalidDays(days))?;
        let limit = usize::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .ok_or(ConfigurationError::InvalidLimit(limit))?;

        Ok(Self { days, limit, summarize })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source_id: String,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub sources_total: usize,
    pub sources_failed: Vec<SourceFailure>,
    pub items_parsed: usize,
    pub items_dropped: usize,
    pub duplicates_removed: usize,
    pub outside_window: usize,
    pub summaries_generated: usize,
    pub summaries_failed: usize,
    pub deadline_hit: bool,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, sources_total: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            sources_total,
            sources_failed: Vec::new(),
            items_parsed: 0,
            items_dropped: 0,
            duplicates_removed: 0,
            outside_window: 0,
            summaries_generated: 0,
            summaries_failed: 0,
            deadline_hit: false,
        }
    }

    pub fn sources_succeeded(&self) -> usize {
        self.sources_total - self.sources_failed.len()
    }
}

/// Result of one pipeline run. An empty `items` list is a valid outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub items: Vec<NewsItem>,
    pub report: RunReport,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Feed size {bytes} bytes exceeds limit of {limit} bytes")]
    TooLarge { bytes: usize, limit: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Run deadline exceeded before the fetch completed")]
    DeadlineExceeded,

    #[error("HTTP client error: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse feed: {0}")]
    Feed(String),

    #[error("Entry has no title")]
    MissingTitle,

    #[error("Entry has no link")]
    MissingLink,

    #[error("Entry link is not a valid URI: {link}")]
    InvalidLink { link: String },

    #[error("Entry has no parseable publication date")]
    MissingDate,
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Summarization service returned status {status}")]
    Status { status: u16 },

    #[error("Summarization service rejected the credentials")]
    Unauthorized,

    #[error("Summarization service rate limit reached")]
    RateLimited,

    #[error("Malformed summarization response: {0}")]
    MalformedResponse(String),

    #[error("Summarization service returned no text")]
    EmptyResponse,

    #[error("Run deadline exceeded before the summary completed")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Day count must be a positive integer, got {0}")]
    InvalidDays(i64),

    #[error("Limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("Summary concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Duplicate feed source id: {0}")]
    DuplicateSourceId(String),

    #[error("Feed source {id} has an invalid endpoint: {url}")]
    InvalidSourceUrl { id: String, url: String },

    #[error("Could not load feed registry: {0}")]
    RegistryFile(String),

    #[error("Missing setting: {0}")]
    MissingSetting(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
