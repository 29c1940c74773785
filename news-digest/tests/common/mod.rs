#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use news_digest::{FeedFetcher, FeedSource, FetchError, NewsItem};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

/// Fixed reference time so window tests do not depend on the clock.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    reference_now() - chrono::Duration::days(days)
}

pub fn source(id: &str) -> FeedSource {
    FeedSource::new(
        id,
        &format!("https://{}.example.com/feed.xml", id),
        &format!("Source {}", id.to_uppercase()),
        "Technology",
    )
}

pub fn item(title: &str, link: &str, published_at: DateTime<Utc>) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        link: link.to_string(),
        published_at,
        summary_raw: format!("{}. More details follow.", title),
        summary_generated: None,
        source: Arc::new(source("test")),
    }
}

pub struct RssItem<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub published_at: Option<DateTime<Utc>>,
    pub description: &'a str,
}

impl<'a> RssItem<'a> {
    pub fn new(title: &'a str, link: &'a str, published_at: DateTime<Utc>) -> Self {
        Self {
            title,
            link,
            published_at: Some(published_at),
            description: "",
        }
    }

    pub fn with_description(mut self, description: &'a str) -> Self {
        self.description = description;
        self
    }

    pub fn undated(mut self) -> Self {
        self.published_at = None;
        self
    }
}

pub fn rss_feed(items: &[RssItem]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
<title>Test feed</title>
<link>https://example.com/</link>
<description>Test feed</description>
"#,
    );

    for item in items {
        xml.push_str("<item>\n");
        xml.push_str(&format!("<title>{}</title>\n", item.title));
        if !item.link.is_empty() {
            xml.push_str(&format!("<link>{}</link>\n", item.link));
        }
        if let Some(published_at) = item.published_at {
            xml.push_str(&format!("<pubDate>{}</pubDate>\n", published_at.to_rfc2822()));
        }
        if !item.description.is_empty() {
            xml.push_str(&format!(
                "<description><![CDATA[{}]]></description>\n",
                item.description
            ));
        }
        xml.push_str("</item>\n");
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

enum Response {
    Payload(String),
    Status(u16),
    Slow(String, Duration),
}

/// In-memory fetcher keyed by source id. Unknown sources fail with 404.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Response>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, source_id: &str, payload: String) -> Self {
        self.responses.insert(source_id.to_string(), Response::Payload(payload));
        self
    }

    pub fn with_status(mut self, source_id: &str, status: u16) -> Self {
        self.responses.insert(source_id.to_string(), Response::Status(status));
        self
    }

    pub fn with_delay(mut self, source_id: &str, payload: String, delay: Duration) -> Self {
        self.responses.insert(source_id.to_string(), Response::Slow(payload, delay));
        self
    }
}

#[async_trait]
impl FeedFetcher for StaticFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<String, FetchError> {
        match self.responses.get(&source.id) {
            Some(Response::Payload(payload)) => Ok(payload.clone()),
            Some(Response::Status(status)) => Err(FetchError::Status { status: *status }),
            Some(Response::Slow(payload, delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(payload.clone())
            }
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

/// Serve exactly one HTTP response on a local port and return its base URL.
pub async fn serve_once(status_line: &str, content_type: &str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        content_type,
        body.len(),
        body
    );

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

/// Read headers and, when announced, the request body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}
