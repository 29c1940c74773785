mod common;

use chrono::{TimeZone, Utc};
use common::{days_ago, init_tracing, item, reference_now, serve_once};
use news_digest::render::{item_summary, render_markdown, render_text};
use news_digest::summarizer::extract_summary;
use news_digest::{
    ChatSummarizer, ChatSummarizerConfig, ConfigurationError, Digest, ExtractiveSummarizer, RunReport, SourceFailure,
    SummarizationError, Summarizer,
};

fn sample_digest() -> Digest {
    let mut summarized = item("Rates rise", "https://a.example.com/rates", days_ago(1));
    summarized.summary_generated = Some("Central bank lifts rates.".to_string());
    let plain = item("Launch delayed", "https://a.example.com/launch", days_ago(2));

    let mut report = RunReport::new(reference_now(), 2);
    report.sources_failed.push(SourceFailure {
        source_id: "down".to_string(),
        name: "Down Feed".to_string(),
        error: "HTTP status 503".to_string(),
    });

    Digest {
        items: vec![summarized, plain],
        report,
    }
}

#[test]
fn test_extract_summary_keeps_leading_sentences() {
    assert_eq!(extract_summary("One. Two! Three? Four.", 2, 300), "One. Two!");
    assert_eq!(extract_summary("No terminal punctuation", 2, 300), "No terminal punctuation");
    assert_eq!(extract_summary("   ", 2, 300), "");

    let long = "word ".repeat(100);
    let summary = extract_summary(&long, 2, 50);
    assert!(summary.ends_with("..."));
    assert!(summary.chars().count() <= 52);
}

#[test]
fn test_text_rendering() {
    let digest = sample_digest();

    let text = render_text(&digest, false);

    assert!(text.contains("NEWS DIGEST"));
    assert!(text.contains("< 1. Rates rise >"));
    assert!(text.contains("Central bank lifts rates."));
    assert!(text.contains("< 2. Launch delayed >"));
    assert!(text.contains("Launch delayed. More details follow."));
    assert!(text.contains("Link: https://a.example.com/launch"));
    assert!(text.contains("Down Feed: HTTP status 503"));
    assert!(text.contains("End of digest."));
    assert!(!text.contains('\u{1b}'), "Plain output carries no escape codes");
}

#[test]
fn test_colored_text_rendering() {
    let digest = sample_digest();

    let text = render_text(&digest, true);

    assert!(text.contains('\u{1b}'));
    assert!(text.contains("Rates rise"));
    assert!(text.contains("Link: https://a.example.com/rates"));
    assert!(!render_markdown(&digest, reference_now()).contains('\u{1b}'));
}

#[test]
fn test_markdown_rendering() {
    let digest = sample_digest();
    let generated_at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();

    let markdown = render_markdown(&digest, generated_at);

    assert!(markdown.starts_with("# News digest (17.10.2026 09:30)"));
    assert!(markdown.contains("### Rates rise"));
    assert!(markdown.contains("[https://a.example.com/rates](https://a.example.com/rates)"));
    assert_eq!(item_summary(&digest.items[1]), "Launch delayed. More details follow.");
}

#[tokio::test]
async fn test_extractive_summarizer() {
    let summarizer = ExtractiveSummarizer::new();

    let summary = summarizer
        .summarize("Title", "First sentence. Second sentence. Third sentence.")
        .await
        .unwrap();
    assert_eq!(summary.as_deref(), Some("First sentence. Second sentence."));

    let empty = summarizer.summarize("Title", "").await.unwrap();
    assert!(empty.is_none());
}

fn chat_config(base_url: &str) -> ChatSummarizerConfig {
    ChatSummarizerConfig::new(
        "test-key".to_string(),
        base_url.to_string(),
        "test-model".to_string(),
    )
}

#[tokio::test]
async fn test_chat_summarizer_reads_first_choice() {
    init_tracing();

    let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  Short neutral summary.  "}}]}"#;
    let base_url = serve_once("200 OK", "application/json", body.to_string()).await;
    let summarizer = ChatSummarizer::new(chat_config(&base_url)).unwrap();

    let summary = summarizer.summarize("Title", "Excerpt").await.unwrap();

    assert_eq!(summary.as_deref(), Some("Short neutral summary."));
}

#[tokio::test]
async fn test_chat_summarizer_maps_service_errors() {
    init_tracing();

    let cases = [
        ("401 Unauthorized", "{}"),
        ("429 Too Many Requests", "{}"),
        ("500 Internal Server Error", "{}"),
        ("200 OK", "not json"),
        ("200 OK", r#"{"choices":[]}"#),
    ];

    let mut errors = Vec::new();
    for (status, body) in cases {
        let base_url = serve_once(status, "application/json", body.to_string()).await;
        let summarizer = ChatSummarizer::new(chat_config(&base_url)).unwrap();
        errors.push(summarizer.summarize("Title", "Excerpt").await.unwrap_err());
    }

    assert!(matches!(errors[0], SummarizationError::Unauthorized));
    assert!(matches!(errors[1], SummarizationError::RateLimited));
    assert!(matches!(errors[2], SummarizationError::Status { status: 500 }));
    assert!(matches!(errors[3], SummarizationError::MalformedResponse(_)));
    assert!(matches!(errors[4], SummarizationError::EmptyResponse));
}

#[test]
fn test_chat_config_requires_http_url() {
    assert!(matches!(
        ChatSummarizer::new(chat_config("ftp://example.com")),
        Err(ConfigurationError::InvalidSetting(_))
    ));
}
