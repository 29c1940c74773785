use crate::types::NewsItem;

/// Orders items newest first and keeps the top `limit`. The sort is stable,
/// so items with equal timestamps stay in first-seen order.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    limit: usize,
}

impl Selector {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn select(&self, mut items: Vec<NewsItem>) -> Vec<NewsItem> {
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        items.truncate(self.limit);
        items
    }
}
