use crate::dedup::Deduplicator;
use crate::parser::FeedParser;
use crate::ranker::Selector;
use crate::sources::FeedRegistry;
use crate::summarizer::summarize_items;
use crate::traits::{FeedFetcher, Summarizer};
use crate::types::{
    ConfigurationError, Digest, DigestRequest, FetchError, NewsItem, ParsedBatch, PipelineOptions,
    RunReport, SourceFailure,
};
use crate::window::WindowFilter;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

/// Runs one digest: fetch every source, normalize, deduplicate, apply the
/// window, rank, and optionally summarize.
pub struct DigestPipeline {
    fetcher: Arc<dyn FeedFetcher>,
    summarizer: Arc<dyn Summarizer>,
    options: PipelineOptions,
}

impl DigestPipeline {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        summarizer: Arc<dyn Summarizer>,
        options: PipelineOptions,
    ) -> Result<Self, ConfigurationError> {
        options.validate()?;
        Ok(Self {
            fetcher,
            summarizer,
            options,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn run(&self, registry: &FeedRegistry, request: &DigestRequest) -> Digest {
        self.run_at(registry, request, Utc::now()).await
    }

    /// Same as `run` with an explicit reference time for the window.
    pub async fn run_at(
        &self,
        registry: &FeedRegistry,
        request: &DigestRequest,
        now: DateTime<Utc>,
    ) -> Digest {
        let deadline = Instant::now() + self.options.run_budget;
        let mut report = RunReport::new(now, registry.len());

        info!(
            "Starting digest run {} over {} sources (days={}, limit={}, summarize={})",
            report.run_id,
            registry.len(),
            request.days,
            request.limit,
            request.summarize
        );

        let fetches = registry.sources().iter().map(|source| async move {
            let result = timeout_at(deadline, self.fetcher.fetch(source))
                .await
                .unwrap_or_else(|_| Err(FetchError::DeadlineExceeded))
                .map(|payload| FeedParser::parse_lenient(&payload, source));
            (source, result)
        });

        // join_all yields results in registry order regardless of which
        // fetch finished first.
        let mut collected = Vec::new();
        for (source, result) in join_all(fetches).await {
            match result {
                Ok(ParsedBatch { items, dropped }) => {
                    report.items_parsed += items.len();
                    report.items_dropped += dropped;
                    collected.extend(items);
                }
                Err(e) => {
                    if matches!(e, FetchError::DeadlineExceeded) {
                        report.deadline_hit = true;
                    }
                    warn!("Failed to fetch feed {} ({}): {}", source.name, source.url, e);
                    report.sources_failed.push(SourceFailure {
                        source_id: source.id.clone(),
                        name: source.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut items = self.assemble(collected, request, now, &mut report);

        if request.summarize && !items.is_empty() {
            let outcome = summarize_items(
                items,
                Arc::clone(&self.summarizer),
                self.options.summary_concurrency,
                deadline,
            )
            .await;
            report.summaries_generated = outcome.generated;
            report.summaries_failed = outcome.failed;
            report.deadline_hit |= outcome.deadline_hit;
            items = outcome.items;
        }

        info!(
            "Digest run {} finished: {} items, {}/{} sources ok, {} dropped, {} duplicates, {} outside window",
            report.run_id,
            items.len(),
            report.sources_succeeded(),
            report.sources_total,
            report.items_dropped,
            report.duplicates_removed,
            report.outside_window
        );

        Digest { items, report }
    }

    /// Deduplicate, filter to the window and select the top items. Needs no
    /// I/O; `items` must already be in registry-then-document order.
    pub fn assemble(
        &self,
        items: Vec<NewsItem>,
        request: &DigestRequest,
        now: DateTime<Utc>,
        report: &mut RunReport,
    ) -> Vec<NewsItem> {
        let total = items.len();
        let unique = Deduplicator::new(self.options.compare_titles).deduplicate(items);
        report.duplicates_removed = total - unique.len();

        let deduplicated = unique.len();
        let recent = WindowFilter::new(request.days, self.options.clock_skew).apply(unique, now);
        report.outside_window = deduplicated - recent.len();

        Selector::new(request.limit).select(recent)
    }
}
