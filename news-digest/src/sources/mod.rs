use crate::types::{ConfigurationError, FeedSource};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Immutable, ordered list of feed sources for one process. The order is
/// the tie-break order used by deduplication.
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    sources: Vec<Arc<FeedSource>>,
}

impl FeedRegistry {
    pub fn new(sources: Vec<FeedSource>) -> Result<Self, ConfigurationError> {
        let mut seen_ids = HashSet::new();

        for source in &sources {
            if !seen_ids.insert(source.id.as_str()) {
                return Err(ConfigurationError::DuplicateSourceId(source.id.clone()));
            }
            if !is_valid_feed_url(&source.url) {
                return Err(ConfigurationError::InvalidSourceUrl {
                    id: source.id.clone(),
                    url: source.url.clone(),
                });
            }
        }

        Ok(Self {
            sources: sources.into_iter().map(Arc::new).collect(),
        })
    }

    /// Load a JSON array of sources.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::RegistryFile(format!("{}: {}", path.display(), e)))?;
        let registry = Self::from_json(&content)?;

        info!("Loaded {} feed sources from {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigurationError> {
        let sources: Vec<FeedSource> = serde_json::from_str(content)
            .map_err(|e| ConfigurationError::RegistryFile(e.to_string()))?;
        Self::new(sources)
    }

    pub fn sources(&self) -> &[Arc<FeedSource>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for source in &self.sources {
            if !categories.contains(&source.category.as_str()) {
                categories.push(&source.category);
            }
        }
        categories
    }
}

impl Default for FeedRegistry {
    fn default() -> Self {
        Self {
            sources: default_sources().into_iter().map(Arc::new).collect(),
        }
    }
}

pub fn is_valid_feed_url(url_str: &str) -> bool {
    Url::parse(url_str)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Built-in marketing and technology feeds.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new(
            "marketing-dive",
            "https://www.marketingdive.com/feeds/news/",
            "Marketing Dive",
            "Marketing",
        ),
        FeedSource::new(
            "hubspot-blog",
            "https://blog.hubspot.com/marketing/rss.xml",
            "HubSpot Blog",
            "Marketing",
        ),
        FeedSource::new(
            "techcrunch",
            "http://feeds.feedburner.com/Techcrunch/",
            "TechCrunch",
            "Technology",
        ),
        FeedSource::new(
            "the-verge",
            "https://www.theverge.com/rss/index.xml",
            "The Verge",
            "Technology",
        ),
        FeedSource::new("adweek", "https://www.adweek.com/feed/", "Adweek", "Advertising"),
        FeedSource::new(
            "campaign-us",
            "https://www.campaignlive.com/us/rss",
            "Campaign US",
            "Advertising",
        ),
        FeedSource::new(
            "venturebeat-ai",
            "https://venturebeat.com/category/ai/feed/",
            "VentureBeat – AI",
            "Artificial Intelligence",
        ),
        FeedSource::new(
            "the-decoder",
            "https://the-decoder.com/feed/",
            "The Decoder",
            "Artificial Intelligence",
        ),
        FeedSource::new(
            "social-media-today",
            "https://www.socialmediatoday.com/.rss/full/",
            "Social Media Today",
            "Social Media",
        ),
        FeedSource::new(
            "mashable-social",
            "https://mashable.com/feeds/social-media/",
            "Mashable – Social Media",
            "Social Media",
        ),
    ]
}
