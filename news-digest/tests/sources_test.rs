use news_digest::sources::{default_sources, is_valid_feed_url};
use news_digest::{ConfigurationError, FeedRegistry, FeedSource};
use std::collections::HashSet;

#[test]
fn test_default_registry() {
    let registry = FeedRegistry::default();

    assert_eq!(registry.len(), 10);
    assert_eq!(
        registry.categories(),
        vec![
            "Marketing",
            "Technology",
            "Advertising",
            "Artificial Intelligence",
            "Social Media"
        ]
    );

    let ids: HashSet<&str> = registry.sources().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), registry.len(), "Source ids must be unique");
    assert!(registry.sources().iter().all(|s| is_valid_feed_url(&s.url)));

    // The built-in list passes the same validation as user-supplied lists.
    assert!(FeedRegistry::new(default_sources()).is_ok());
}

#[test]
fn test_registry_rejects_duplicate_ids() {
    let sources = vec![
        FeedSource::new("dup", "https://a.example.com/feed", "A", "News"),
        FeedSource::new("dup", "https://b.example.com/feed", "B", "News"),
    ];

    assert_eq!(
        FeedRegistry::new(sources).unwrap_err(),
        ConfigurationError::DuplicateSourceId("dup".to_string())
    );
}

#[test]
fn test_registry_rejects_invalid_endpoints() {
    let sources = vec![FeedSource::new("ftp", "ftp://example.com/feed", "FTP", "News")];

    assert!(matches!(
        FeedRegistry::new(sources),
        Err(ConfigurationError::InvalidSourceUrl { .. })
    ));
    assert!(!is_valid_feed_url("invalid-url"));
    assert!(is_valid_feed_url("http://example.com/rss"));
}

#[test]
fn test_registry_from_json_keeps_order() {
    let json = r#"[
        {"id": "second", "url": "https://b.example.com/rss", "name": "B", "category": "Tech", "language": "de"},
        {"id": "first", "url": "https://a.example.com/rss", "name": "A", "category": "Tech"}
    ]"#;

    let registry = FeedRegistry::from_json(json).unwrap();

    let ids: Vec<&str> = registry.sources().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["second", "first"]);
    assert_eq!(registry.sources()[0].language, "de");
    assert_eq!(registry.sources()[1].language, "en");

    assert!(matches!(
        FeedRegistry::from_json("{not json"),
        Err(ConfigurationError::RegistryFile(_))
    ));
}
