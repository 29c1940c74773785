use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use news_digest::render::{render_markdown, render_text};
use news_digest::{
    ChatSummarizer, ChatSummarizerConfig, DigestPipeline, DigestRequest, ExtractiveSummarizer,
    FeedRegistry, FetchConfig, HttpFetcher, NoopSummarizer, PipelineOptions, Summarizer,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SummarizerKind {
    /// OpenAI-compatible chat completion service
    Chat,
    /// Leading sentences of each excerpt, no network
    Extractive,
}

/// Periodic news digest from a fixed set of RSS/Atom feeds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How many days back to collect news from
    #[arg(long, default_value_t = 7, allow_negative_numbers = true)]
    days: i64,

    /// How many items to show
    #[arg(long, default_value_t = 7, allow_negative_numbers = true)]
    limit: i64,

    /// Rewrite each item's description with the summarizer
    #[arg(long)]
    summarize: bool,

    #[arg(long, value_enum, default_value_t = SummarizerKind::Chat)]
    summarizer: SummarizerKind,

    /// JSON file with the feed sources to use instead of the built-in list
    #[arg(long)]
    feeds: Option<PathBuf>,

    /// Per-request timeout for feed downloads
    #[arg(long, default_value_t = 15)]
    timeout_seconds: u64,

    /// Wall-clock budget for the whole run
    #[arg(long, default_value_t = 60)]
    budget_seconds: u64,

    /// Maximum summaries requested at once
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Also write the digest as Markdown to this file
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Print the digest and run report as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    // Configuration errors abort before any network activity.
    let request = DigestRequest::new(args.days, args.limit, args.summarize)?;
    let registry = match &args.feeds {
        Some(path) => FeedRegistry::from_json_file(path)?,
        None => FeedRegistry::default(),
    };

    let fetch_config = FetchConfig {
        timeout_seconds: args.timeout_seconds,
        ..FetchConfig::default()
    };
    let options = PipelineOptions {
        run_budget: Duration::from_secs(args.budget_seconds),
        summary_concurrency: args.concurrency,
        ..PipelineOptions::default()
    };

    let (summarizer, request) = build_summarizer(args.summarizer, request);
    let fetcher = Arc::new(HttpFetcher::new(fetch_config)?);
    let pipeline = DigestPipeline::new(fetcher, summarizer, options)?;

    info!("Collecting news from {} sources", registry.len());
    let digest = pipeline.run(&registry, &request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&digest)?);
    } else if digest.items.is_empty() {
        println!("No news found. Try widening the window (--days 14).");
    } else {
        print!("{}", render_text(&digest, console::colors_enabled()));
    }

    if let Some(path) = &args.markdown {
        std::fs::write(path, render_markdown(&digest, Utc::now()))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved Markdown digest to {}", path.display());
    }

    Ok(())
}

/// Pick the summarizer for this run. A chat summarizer without credentials
/// disables summarization instead of failing the run.
fn build_summarizer(kind: SummarizerKind, request: DigestRequest) -> (Arc<dyn Summarizer>, DigestRequest) {
    if !request.summarize {
        return (Arc::new(NoopSummarizer), request);
    }

    let summarizer: Arc<dyn Summarizer> = match kind {
        SummarizerKind::Extractive => Arc::new(ExtractiveSummarizer::new()),
        SummarizerKind::Chat => match ChatSummarizerConfig::from_env().and_then(ChatSummarizer::new) {
            Ok(summarizer) => Arc::new(summarizer),
            Err(e) => {
                warn!("Summarization disabled: {}", e);
                let request = DigestRequest { summarize: false, ..request };
                return (Arc::new(NoopSummarizer), request);
            }
        },
    };

    (summarizer, request)
}
