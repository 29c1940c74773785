use crate::types::NewsItem;
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

/// Collapses items that refer to the same story, keeping the first one seen.
///
/// Two items are duplicates when their normalized links match, or (when
/// `compare_titles` is on) their non-empty title keys match. Only kept items
/// contribute keys, so running the deduplicator on its own output is a
/// no-op.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    compare_titles: bool,
}

impl Deduplicator {
    pub fn new(compare_titles: bool) -> Self {
        Self { compare_titles }
    }

    pub fn deduplicate(&self, items: Vec<NewsItem>) -> Vec<NewsItem> {
        let total = items.len();
        let mut seen_links = HashSet::new();
        let mut seen_titles = HashSet::new();
        let mut unique_items = Vec::with_capacity(total);

        for item in items {
            let link = link_key(&item.link);
            // Punctuation-only titles carry no identity.
            let title = self
                .compare_titles
                .then(|| title_key(&item.title))
                .filter(|key| !key.is_empty());

            if seen_links.contains(&link) {
                debug!("Removing duplicate link: {} ({})", item.title, item.link);
                continue;
            }
            if let Some(ref title) = title {
                if seen_titles.contains(title) {
                    debug!("Removing duplicate title: {} ({})", item.title, item.link);
                    continue;
                }
            }

            seen_links.insert(link);
            if let Some(title) = title {
                seen_titles.insert(title);
            }
            unique_items.push(item);
        }

        let removed_count = total - unique_items.len();
        if removed_count > 0 {
            info!("Removed {} duplicate items", removed_count);
        }

        unique_items
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Identity of a link: scheme and host lower-cased, query and fragment
/// dropped, trailing slashes trimmed.
pub fn link_key(link: &str) -> String {
    match Url::parse(link.trim()) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            let host = url.host_str().unwrap_or("").to_lowercase();
            let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
            format!(
                "{}://{}{}{}",
                url.scheme(),
                host,
                port,
                url.path().trim_end_matches('/')
            )
        }
        Err(_) => {
            let end = link.find(&['?', '#'][..]).unwrap_or(link.len());
            link[..end].trim().trim_end_matches('/').to_lowercase()
        }
    }
}

/// Case-insensitive, punctuation-free form of a title.
pub fn title_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
