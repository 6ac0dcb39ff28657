//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock catalog servers and test
//! the full search, merge, fetch and write cycle end-to-end.

use playbill::config::{CatalogConfig, Config, CrawlerConfig, FilterSet, PreHeaderPolicy};
use playbill::crawler::{crawl, Coordinator};
use playbill::output::{CrawlProgress, CsvSink};
use playbill::HarvestError;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock catalog
fn create_test_config(base_url: &str, max_concurrent_fetches: u32) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        },
        crawler: CrawlerConfig {
            max_concurrent_fetches,
            ..Default::default()
        },
        filter_sets: vec![
            FilterSet::new("monologues", &[("s2_type", "monologue")]),
            FilterSet::new("plays", &[("s2_type", "play")]),
        ],
        ..Default::default()
    }
}

fn search_page(results: &[(&str, &str)]) -> String {
    let anchors: String = results
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="search-article-text"><h3><a href="{}">{}</a></h3></div>"#,
                href, title
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

fn detail_page(author: Option<&str>, items: &[&str]) -> String {
    let byline = author
        .map(|a| format!(r#"<span class="authorRole"><a href="/people/1">{}</a></span>"#, a))
        .unwrap_or_default();
    let items: String = items.iter().map(|i| format!("<li>{}</li>", i)).collect();
    format!(
        r#"<html><body><h1>Work</h1>{}<div class="play-related-lists"><ul>{}</ul></div></body></html>"#,
        byline, items
    )
}

async fn mount_search(server: &MockServer, s2_type: &str, results: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("s2_type", s2_type))
        .and(query_param("rows", "2147483647"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(results)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn output_lines(sink: CsvSink<Vec<u8>>) -> Vec<String> {
    String::from_utf8(sink.into_inner())
        .expect("CSV output is UTF-8")
        .lines()
        .map(str::to_string)
        .collect()
}

fn first_field(line: &str) -> &str {
    line.split("\",\"")
        .next()
        .unwrap_or_default()
        .trim_start_matches('"')
}

#[tokio::test]
async fn test_full_crawl_deduplicates_across_filter_sets() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "monologue",
        &[("Hamlet", "/p/1"), ("Othello", "/p/2")],
    )
    .await;
    mount_search(&mock_server, "play", &[("Othello", "/p/2"), ("Lear", "/p/3")]).await;

    mount_detail(
        &mock_server,
        "/p/1",
        detail_page(
            Some("William Shakespeare"),
            &["Theme", "Revenge", "Madness", "Place", "Denmark"],
        ),
    )
    .await;
    mount_detail(
        &mock_server,
        "/p/2",
        detail_page(
            Some("William Shakespeare"),
            &["Theme", "Jealousy", "Period", "Renaissance", "Genre", "Tragedy"],
        ),
    )
    .await;
    mount_detail(&mock_server, "/p/3", detail_page(None, &["Genre", "Tragedy"])).await;

    let config = create_test_config(&mock_server.uri(), 4);
    let mut sink = CsvSink::new(Vec::new());
    let progress = CrawlProgress::hidden();

    let report = crawl(&config, &mut sink, &progress)
        .await
        .expect("Crawl failed");

    assert_eq!(report.filter_sets, 2);
    assert_eq!(report.hits, 4);
    assert_eq!(report.tasks, 3);
    assert_eq!(report.emitted, 3);
    assert_eq!(progress.position(), 3);

    let lines = output_lines(sink);
    assert_eq!(lines.len(), 4, "header plus three rows: {:?}", lines);
    assert_eq!(
        lines[0],
        "\"title\",\"author\",\"themes\",\"periods\",\"places\",\"genres\""
    );

    let mut titles: Vec<&str> = lines[1..].iter().map(|l| first_field(l)).collect();
    titles.sort_unstable();
    assert_eq!(titles, ["Hamlet", "Lear", "Othello"]);

    assert!(lines.contains(
        &"\"Hamlet\",\"William Shakespeare\",\"Revenge, Madness\",\"\",\"Denmark\",\"\"".to_string()
    ));
    assert!(lines.contains(
        &"\"Othello\",\"William Shakespeare\",\"Jealousy\",\"Renaissance\",\"\",\"Tragedy\""
            .to_string()
    ));
    assert!(lines.contains(&"\"Lear\",\"\",\"\",\"\",\"\",\"Tragedy\"".to_string()));
}

#[tokio::test]
async fn test_later_filter_set_title_wins() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "monologue", &[("Othello", "/p/2")]).await;
    mount_search(&mock_server, "play", &[("Othello, the Moor of Venice", "/p/2")]).await;
    mount_detail(&mock_server, "/p/2", detail_page(None, &[])).await;

    let config = create_test_config(&mock_server.uri(), 2);
    let mut sink = CsvSink::new(Vec::new());

    let report = crawl(&config, &mut sink, &CrawlProgress::hidden())
        .await
        .expect("Crawl failed");
    assert_eq!(report.tasks, 1);

    let lines = output_lines(sink);
    assert_eq!(lines.len(), 2);
    assert_eq!(first_field(&lines[1]), "Othello, the Moor of Venice");
}

#[tokio::test]
async fn test_empty_search_is_successful_run() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "monologue", &[]).await;
    mount_search(&mock_server, "play", &[]).await;

    let config = create_test_config(&mock_server.uri(), 2);
    let mut sink = CsvSink::new(Vec::new());
    let progress = CrawlProgress::hidden();

    let report = crawl(&config, &mut sink, &progress)
        .await
        .expect("Empty crawl should succeed");

    assert_eq!(report.tasks, 0);
    assert_eq!(report.emitted, 0);
    assert_eq!(progress.position(), 0);

    let lines = output_lines(sink);
    assert_eq!(lines.len(), 1, "only the header row is written");
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 0);
    let mut sink = CsvSink::new(Vec::new());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        crawl(&config, &mut sink, &CrawlProgress::hidden()),
    )
    .await
    .expect("A zero-slot pool must fail fast, not hang");

    assert!(
        matches!(result, Err(HarvestError::Config(_))),
        "Expected config error, got {:?}",
        result
    );
    assert!(output_lines(sink).is_empty());
}

#[tokio::test]
async fn test_search_failure_aborts_before_output() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "monologue", &[("Hamlet", "/p/1")]).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("s2_type", "play"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(None, &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let mut sink = CsvSink::new(Vec::new());

    let result = crawl(&config, &mut sink, &CrawlProgress::hidden()).await;

    match result {
        Err(HarvestError::Http { url, source }) => {
            assert!(url.contains("s2_type=play"), "unexpected url {}", url);
            assert_eq!(source.status().map(|s| s.as_u16()), Some(503));
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
    assert!(output_lines(sink).is_empty());
}

#[tokio::test]
async fn test_detail_failure_stops_progress() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "monologue",
        &[("Hamlet", "/p/1"), ("Othello", "/p/2"), ("Lear", "/p/3")],
    )
    .await;
    mount_search(&mock_server, "play", &[]).await;

    Mock::given(method("GET"))
        .and(path("/p/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    for page in ["/p/1", "/p/3"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(None, &[])))
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&mock_server.uri(), 1);
    let mut sink = CsvSink::new(Vec::new());
    let progress = CrawlProgress::hidden();

    let result = crawl(&config, &mut sink, &progress).await;

    assert!(
        matches!(result, Err(HarvestError::Http { ref url, .. }) if url.ends_with("/p/2")),
        "Expected failure on /p/2, got {:?}",
        result
    );
    assert!(progress.position() < 3);
    assert_eq!(progress.total(), Some(3));

    // Rows already streamed remain, and match the progress counter exactly
    let rows = sink.rows() as u64;
    assert_eq!(rows, progress.position());
    let lines = output_lines(sink);
    assert_eq!(lines.len() as u64, rows + 1);
    assert!(lines[1..].iter().all(|l| first_field(l) != "Othello"));
}

#[tokio::test]
async fn test_single_fetch_slot_serializes_requests() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(150);

    mount_search(
        &mock_server,
        "monologue",
        &[("A", "/p/1"), ("B", "/p/2"), ("C", "/p/3")],
    )
    .await;
    mount_search(&mock_server, "play", &[]).await;

    for page in ["/p/1", "/p/2", "/p/3"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_page(None, &[]))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&mock_server.uri(), 1);
    let coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let mut sink = CsvSink::new(Vec::new());

    let started = Instant::now();
    let report = coordinator
        .run(&mut sink, &CrawlProgress::hidden())
        .await
        .expect("Crawl failed");

    assert_eq!(report.emitted, 3);
    assert!(
        started.elapsed() >= delay * 3,
        "three pages through one slot took only {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_pre_header_policy_applies_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_search(&mock_server, "monologue", &[("Medea", "/p/7")]).await;
    mount_search(&mock_server, "play", &[]).await;
    Mock::given(method("GET"))
        .and(path("/p/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(Some("Euripides"), &["Betrayal", "Genre", "Tragedy"])),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 2);
    let mut sink = CsvSink::new(Vec::new());
    crawl(&config, &mut sink, &CrawlProgress::hidden())
        .await
        .expect("Crawl failed");
    assert_eq!(
        output_lines(sink)[1],
        "\"Medea\",\"Euripides\",\"\",\"\",\"\",\"Tragedy\""
    );

    config.extractor.pre_header_values = PreHeaderPolicy::Theme;
    let mut sink = CsvSink::new(Vec::new());
    crawl(&config, &mut sink, &CrawlProgress::hidden())
        .await
        .expect("Crawl failed");
    assert_eq!(
        output_lines(sink)[1],
        "\"Medea\",\"Euripides\",\"Betrayal\",\"\",\"\",\"Tragedy\""
    );
}
