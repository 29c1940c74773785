use crate::traits::Summarizer;
use crate::types::{ConfigurationError, NewsItem, SummarizationError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

pub const SUMMARY_MAX_SENTENCES: usize = 2;
pub const SUMMARY_MAX_CHARS: usize = 300;

const SYSTEM_PROMPT: &str = "You are a news journalist. Write briefly and neutrally, without advertising.";

/// Stand-in used when summarization is disabled.
pub struct NoopSummarizer;

#[async_trait]
impl Summarizer for NoopSummarizer {
    fn name(&self) -> String {
        "noop".to_string()
    }

    async fn summarize(
        &self,
        _title: &str,
        _excerpt: &str,
    ) -> Result<Option<String>, SummarizationError> {
        Ok(None)
    }
}

/// Network-free summarizer that keeps the leading sentences of the excerpt.
pub struct ExtractiveSummarizer {
    max_sentences: usize,
    max_chars: usize,
    response_delay_ms: u64,
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self {
            max_sentences: SUMMARY_MAX_SENTENCES,
            max_chars: SUMMARY_MAX_CHARS,
            response_delay_ms: 0,
        }
    }

    pub fn with_limits(mut self, max_sentences: usize, max_chars: usize) -> Self {
        self.max_sentences = max_sentences;
        self.max_chars = max_chars;
        self
    }

    /// Simulate service latency.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> String {
        format!("extractive ({} sentences)", self.max_sentences)
    }

    async fn summarize(
        &self,
        _title: &str,
        excerpt: &str,
    ) -> Result<Option<String>, SummarizationError> {
        if self.response_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
        }

        let summary = extract_summary(excerpt, self.max_sentences, self.max_chars);
        Ok((!summary.is_empty()).then_some(summary))
    }
}

#[derive(Debug, Clone)]
pub struct ChatSummarizerConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl ChatSummarizerConfig {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url,
            model,
            timeout_seconds: 30,
        }
    }

    /// Reads `DIGEST_LLM_API_KEY` (required), `DIGEST_LLM_URL`,
    /// `DIGEST_LLM_MODEL` and `DIGEST_LLM_TIMEOUT_SECONDS`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let api_key = env::var("DIGEST_LLM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingSetting("DIGEST_LLM_API_KEY".to_string()))?;

        let base_url = env::var("DIGEST_LLM_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = env::var("DIGEST_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_seconds = match env::var("DIGEST_LLM_TIMEOUT_SECONDS") {
            Ok(value) => value.parse().map_err(|_| {
                ConfigurationError::InvalidSetting(format!(
                    "DIGEST_LLM_TIMEOUT_SECONDS must be a number, got {}",
                    value
                ))
            })?,
            Err(_) => 30,
        };

        let config = Self {
            api_key,
            base_url,
            model,
            timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.base_url.starts_with("http") {
            return Err(ConfigurationError::InvalidSetting(format!(
                "DIGEST_LLM_URL must start with http or https, got {}",
                self.base_url
            )));
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Summarizer backed by an OpenAI-compatible chat completion endpoint.
pub struct ChatSummarizer {
    client: Client,
    config: ChatSummarizerConfig,
}

impl ChatSummarizer {
    pub fn new(config: ChatSummarizerConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ConfigurationError::InvalidSetting(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn build_request(&self, title: &str, excerpt: &str) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(format!("Retell neutrally and briefly: {}. {}", title, excerpt)),
                },
            ],
            stream: false,
        }
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    fn name(&self) -> String {
        format!("chat ({})", self.config.model)
    }

    async fn summarize(
        &self,
        title: &str,
        excerpt: &str,
    ) -> Result<Option<String>, SummarizationError> {
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(title, excerpt))
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SummarizationError::Unauthorized)
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(SummarizationError::RateLimited),
            s if !s.is_success() => {
                return Err(SummarizationError::Status { status: s.as_u16() })
            }
            _ => {}
        }

        let body = response.text().await?;
        parse_chat_response(&body).map(Some)
    }
}

fn parse_chat_response(body: &str) -> Result<String, SummarizationError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SummarizationError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(SummarizationError::EmptyResponse)
}

/// Outcome of running the summarizer over a digest.
#[derive(Debug)]
pub struct SummaryOutcome {
    pub items: Vec<NewsItem>,
    pub generated: usize,
    pub failed: usize,
    pub deadline_hit: bool,
}

/// Summarize every item with at most `concurrency` requests in flight.
/// Output order matches input order; a failure leaves that item's
/// `summary_generated` unset.
pub async fn summarize_items(
    items: Vec<NewsItem>,
    summarizer: Arc<dyn Summarizer>,
    concurrency: usize,
    deadline: Instant,
) -> SummaryOutcome {
    info!("Summarizing {} items with {}", items.len(), summarizer.name());

    let results: Vec<(NewsItem, Result<Option<String>, SummarizationError>)> = stream::iter(items)
        .map(|item| {
            let summarizer = Arc::clone(&summarizer);
            async move {
                let result = timeout_at(deadline, summarizer.summarize(&item.title, &item.summary_raw))
                    .await
                    .unwrap_or_else(|_| Err(SummarizationError::DeadlineExceeded));
                (item, result)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut outcome = SummaryOutcome {
        items: Vec::with_capacity(results.len()),
        generated: 0,
        failed: 0,
        deadline_hit: false,
    };

    for (mut item, result) in results {
        match result {
            Ok(Some(summary)) if !summary.trim().is_empty() => {
                item.summary_generated = Some(summary.trim().to_string());
                outcome.generated += 1;
            }
            Ok(_) => debug!("No summary produced for {}", item.link),
            Err(e) => {
                if matches!(e, SummarizationError::DeadlineExceeded) {
                    outcome.deadline_hit = true;
                }
                warn!("Summarization failed for {}: {}", item.link, e);
                outcome.failed += 1;
            }
        }
        outcome.items.push(item);
    }

    outcome
}

/// First `max_sentences` sentences of `text`, cut to `max_chars` characters
/// with a trailing ellipsis.
pub fn extract_summary(text: &str, max_sentences: usize, max_chars: usize) -> String {
    let text = text.trim();
    if text.is_empty() || max_sentences == 0 {
        return String::new();
    }

    let mut end = text.len();
    let mut sentences = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|(_, n)| n.is_whitespace()) {
            sentences += 1;
            if sentences == max_sentences {
                end = idx + c.len_utf8();
                break;
            }
        }
    }

    let summary = &text[..end];
    if summary.chars().count() <= max_chars {
        return summary.to_string();
    }

    let cut: String = summary.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}...", cut.trim_end())
}
