mod common;

use common::{init_tracing, NEWS_PLAYLIST, SPORTS_PLAYLIST};
use m3u_aggregator::publisher::{publish, read_channel_count, summarize};
use m3u_aggregator::{
    load_sources, ChannelAggregator, ChannelCatalog, FailureRecord, FetchConfig, Fetcher,
    SourceEntry,
};
use serde_json::Value;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn playlist_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_PLAYLIST))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sports.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPORTS_PLAYLIST))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow.m3u"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(NEWS_PLAYLIST)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    server
}

fn fetcher() -> Fetcher {
    Fetcher::new(FetchConfig {
        timeout_seconds: 1,
        ..FetchConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_one_source_times_out() {
    init_tracing();
    let server = playlist_server().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("remote/channels.json");
    let failures_path = dir.path().join("remote/failed_sources.json");

    let sources = vec![
        SourceEntry::from_url(format!("{}/news.m3u", server.uri())),
        SourceEntry::from_url(format!("{}/slow.m3u", server.uri())),
        SourceEntry::from_url(format!("{}/sports.m3u", server.uri())),
    ];

    let outcome = ChannelAggregator::new(fetcher()).aggregate(&sources).await;
    publish(&outcome.catalog, &outcome.failures, &output, &failures_path).unwrap();

    let catalog: ChannelCatalog = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(catalog.channel_count(), 6);

    let failures: Vec<FailureRecord> =
        serde_json::from_str(&fs::read_to_string(&failures_path).unwrap()).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source, format!("{}/slow.m3u", server.uri()));
    assert!(!failures[0].error.is_empty());

    let summary = summarize(&outcome, &output);
    assert_eq!(summary.total_sources, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total_channels, 6);
}

#[tokio::test]
async fn test_missing_config_created_then_fetched() {
    init_tracing();
    let server = playlist_server().await;
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config/m3u_sources.json");

    let defaults = vec![
        SourceEntry::from_url(format!("{}/news.m3u", server.uri())),
        SourceEntry::from_url(format!("{}/sports.m3u", server.uri())),
    ];

    let sources = load_sources(&config, &defaults).unwrap();
    assert!(config.exists());
    assert_eq!(sources, defaults);

    let outcome = ChannelAggregator::new(fetcher()).aggregate(&sources).await;
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.catalog.channel_count(), 6);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_output_document_shape() {
    init_tracing();
    let server = playlist_server().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("channels.json");
    let failures_path = dir.path().join("failed_sources.json");

    let sources = vec![SourceEntry::from_url(format!("{}/news.m3u", server.uri()))];
    let outcome = ChannelAggregator::new(fetcher()).aggregate(&sources).await;
    publish(&outcome.catalog, &outcome.failures, &output, &failures_path).unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(doc["updated_at"].is_string());

    let first = &doc["categories"][0];
    assert_eq!(first["name"], "News");
    assert_eq!(
        first["channels"][0],
        serde_json::json!({
            "name": "Al Jazeera English",
            "url": "http://example/aje",
            "logo": "",
            "category": "News"
        })
    );
    assert_eq!(doc["categories"][1]["name"], "Other");

    assert!(!failures_path.exists());
    assert_eq!(read_channel_count(&output).unwrap(), Some(3));
}

#[test]
fn test_publish_preserves_non_ascii_and_stale_failures() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("channels.json");
    let failures_path = dir.path().join("failed_sources.json");
    fs::write(&failures_path, "[]stale").unwrap();
    fs::write(&output, "old catalog").unwrap();

    let channels = m3u_aggregator::parser::parse("#EXTINF:-1,قناة القرآن الكريم Quran\nhttp://q\n")
        .into_iter()
        .map(m3u_aggregator::classify)
        .collect();
    let catalog = ChannelCatalog {
        updated_at: "2026-01-08".to_string(),
        categories: m3u_aggregator::aggregator::group_by_category(channels),
    };

    publish(&catalog, &[], &output, &failures_path).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("قناة القرآن الكريم Quran"));
    assert!(!written.contains("\\u"));
    assert!(written.contains("\n  \"categories\""));
    assert_eq!(fs::read_to_string(&failures_path).unwrap(), "[]stale");
}

#[test]
fn test_read_channel_count_missing_file() {
    let dir = TempDir::new().unwrap();
    assert_eq!(read_channel_count(&dir.path().join("nope.json")).unwrap(), None);
}

#[test]
fn test_publish_write_error_is_reported() {
    let dir = TempDir::new().unwrap();
    // A regular file where the output directory should be.
    let blocker = dir.path().join("remote");
    fs::write(&blocker, "").unwrap();

    let catalog = ChannelCatalog {
        updated_at: "2026-01-08".to_string(),
        categories: Vec::new(),
    };
    let result = publish(&catalog, &[], &blocker.join("channels.json"), &blocker.join("f.json"));
    assert!(result.is_err());
}
