pub mod types;
pub mod traits;
pub mod sources;
pub mod fetcher;
pub mod parser;
pub mod dedup;
pub mod window;
pub mod ranker;
pub mod summarizer;
pub mod pipeline;
pub mod render;

pub use types::*;
pub use traits::{FeedFetcher, Summarizer};
pub use sources::FeedRegistry;
pub use fetcher::HttpFetcher;
pub use parser::FeedParser;
pub use dedup::Deduplicator;
pub use window::WindowFilter;
pub use ranker::Selector;
pub use summarizer::{ChatSummarizer, ChatSummarizerConfig, ExtractiveSummarizer, NoopSummarizer};
pub use pipeline::DigestPipeline;
