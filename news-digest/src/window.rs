use crate::types::NewsItem;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Keeps items published within the trailing `days` before `now`. The lower
/// bound is inclusive; items dated after `now + clock_skew` are rejected.
#[derive(Debug, Clone)]
pub struct WindowFilter {
    days: u32,
    clock_skew: Duration,
}

impl WindowFilter {
    pub fn new(days: u32, clock_skew: Duration) -> Self {
        Self { days, clock_skew }
    }

    /// `None` when the window is wider than chrono can represent.
    pub fn window(&self) -> Option<Duration> {
        Duration::try_days(i64::from(self.days))
    }

    /// Bounds that would fall outside chrono's range saturate at the
    /// earliest/latest representable instant.
    pub fn contains(&self, published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let oldest = self
            .window()
            .and_then(|w| now.checked_sub_signed(w))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let newest = now
            .checked_add_signed(self.clock_skew)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        published_at >= oldest && published_at <= newest
    }

    pub fn apply(&self, items: Vec<NewsItem>, now: DateTime<Utc>) -> Vec<NewsItem> {
        items
            .into_iter()
            .filter(|item| {
                let keep = self.contains(item.published_at, now);
                if !keep {
                    debug!("Outside window: {} ({})", item.title, item.published_at);
                }
                keep
            })
            .collect()
    }
}
