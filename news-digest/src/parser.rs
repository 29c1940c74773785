use crate::types::{FeedSource, NewsItem, ParseError, ParsedBatch};
use chrono::{DateTime, NaiveDateTime, Utc};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Turns RSS/Atom documents into normalized `NewsItem`s. Every format
/// difference is resolved here, so later stages only see one shape.
pub struct FeedParser;

impl FeedParser {
    /// Parse a whole document. Entries that cannot be normalized are
    /// skipped and counted in `dropped`.
    pub fn parse_feed(content: &str, source: &Arc<FeedSource>) -> Result<ParsedBatch, ParseError> {
        debug!("Parsing feed content from {} ({} bytes)", source.name, content.len());

        let feed = parser::Builder::new()
            .timestamp_parser(parse_timestamp)
            .build()
            .parse(content.as_bytes())
            .map_err(|e| ParseError::Feed(e.to_string()))?;

        let base = Url::parse(&source.url).ok();
        let mut batch = ParsedBatch::default();

        for entry in feed.entries {
            let entry_id = entry.id.clone();
            match Self::normalize_entry(entry, source, base.as_ref()) {
                Ok(item) => batch.items.push(item),
                Err(e) => {
                    warn!("Skipping entry {} from {}: {}", entry_id, source.name, e);
                    batch.dropped += 1;
                }
            }
        }

        info!(
            "Parsed {} items from {} ({} skipped)",
            batch.items.len(),
            source.name,
            batch.dropped
        );
        Ok(batch)
    }

    /// Like `parse_feed`, but a document that is not a feed at all yields an
    /// empty batch and a warning.
    pub fn parse_lenient(content: &str, source: &Arc<FeedSource>) -> ParsedBatch {
        match Self::parse_feed(content, source) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Feed {} could not be parsed: {}", source.name, e);
                ParsedBatch::default()
            }
        }
    }

    pub fn normalize_entry(
        entry: Entry,
        source: &Arc<FeedSource>,
        base: Option<&Url>,
    ) -> Result<NewsItem, ParseError> {
        let title = entry
            .title
            .as_ref()
            .map(|t| normalize_text(&t.content))
            .unwrap_or_default();
        if title.is_empty() {
            return Err(ParseError::MissingTitle);
        }

        let link = resolve_link(&entry, base)?;
        let published_at = entry_date(&entry).ok_or(ParseError::MissingDate)?;

        // RSS <description> and Atom <summary> land in `summary`; fall back
        // to the full body when a feed only ships content:encoded.
        let summary_raw = entry
            .summary
            .as_ref()
            .map(|s| normalize_text(&s.content))
            .filter(|s| !s.is_empty())
            .or_else(|| {
                entry
                    .content
                    .as_ref()
                    .and_then(|c| c.body.as_deref())
                    .map(normalize_text)
            })
            .unwrap_or_default();

        Ok(NewsItem {
            title,
            link,
            published_at,
            summary_raw,
            summary_generated: None,
            source: Arc::clone(source),
        })
    }
}

fn entry_date(entry: &Entry) -> Option<DateTime<Utc>> {
    entry.published.or(entry.updated)
}

/// Zoned formats that feeds commonly emit, tried before the zone-less ones.
const ZONED_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// Timestamps without a zone are taken to be UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Timestamp parser handed to feed-rs for `pubDate`, `published` and
/// `updated` values.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = ZONED_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(text, f).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing "GMT"/"UTC"/"Z" that the zoned parsers rejected is still UTC.
    let bare = text
        .trim_end_matches(" GMT")
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim_end();
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(bare, f).ok())
        .map(|naive| naive.and_utc())
}

fn resolve_link(entry: &Entry, base: Option<&Url>) -> Result<String, ParseError> {
    let href = primary_link(&entry.links)
        .map(|l| l.href.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(|| permalink_id(&entry.id))
        .ok_or(ParseError::MissingLink)?;

    let parsed = match Url::parse(&href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .and_then(|b| b.join(&href).ok())
            .ok_or_else(|| ParseError::InvalidLink { link: href.clone() })?,
        Err(_) => return Err(ParseError::InvalidLink { link: href }),
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ParseError::InvalidLink { link: href });
    }
    Ok(parsed.to_string())
}

fn primary_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
}

/// RSS guids marked as permalinks are often the only link an item has.
fn permalink_id(id: &str) -> Option<String> {
    let url = Url::parse(id.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Strip markup, decode HTML entities and collapse whitespace runs.
pub fn normalize_text(raw: &str) -> String {
    let stripped = strip_tags(raw);
    html_escape::decode_html_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace every tag with a single space. A `<` that cannot start a tag
/// (e.g. "a < b"), or that is never closed by `>`, is kept as text.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));

        match after.find('>').filter(|_| opens_tag) {
            Some(end) => {
                text.push(' ');
                rest = &after[end + 1..];
            }
            None => {
                text.push('<');
                rest = after;
            }
        }
    }

    text.push_str(rest);
    text
}
