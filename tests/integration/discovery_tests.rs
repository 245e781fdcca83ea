use crate::common::{html_response, pdf_response};
use pdf_harvester::config::Config;
use pdf_harvester::crawler::{build_http_client, Discoverer, VisitedSet};
use pdf_harvester::heuristics::YearRange;
use pdf_harvester::state::RunState;
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn urls(documents: &[pdf_harvester::crawler::DiscoveredDocument], base: &str) -> Vec<String> {
    documents
        .iter()
        .map(|d| d.url.trim_start_matches(base).to_string())
        .collect()
}

#[tokio::test]
async fn test_discovers_direct_pdf_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"
            <a href="/files/a.pdf">2024年3月信息价</a>
            <a href="/files/c.PDF">notice</a>
            <a href="/about">关于我们</a>
            <a href="mailto:x@example.com">mail</a>
            "#,
        ))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 0);
    let documents = discoverer.discover(&format!("{}/", base_url)).await;

    assert_eq!(urls(&documents, &base_url), vec!["/files/a.pdf", "/files/c.PDF"]);
    assert_eq!(documents[0].link_text, "2024年3月信息价");

    let log = state.snapshot().debug_log;
    assert!(log.iter().any(|line| line == "Links found: 4"));
    assert!(log.iter().any(|line| line == "Page title: Test"));
}

#[tokio::test]
async fn test_follows_category_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<a href="/prices">造价信息</a><a href="/news">新闻</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(html_response(r#"<a href="/prices/2023.pdf">2023年 定额</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(html_response(r#"<a href="/news/x.pdf">x</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 1);
    let documents = discoverer.discover(&format!("{}/", base_url)).await;

    assert_eq!(urls(&documents, &base_url), vec!["/prices/2023.pdf"]);
}

#[tokio::test]
async fn test_cycle_terminates_and_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response(
            r#"<a href="/b">造价信息</a><a href="/a">造价信息</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_response(
            r#"<a href="/a">造价信息</a><a href="/docs/b.pdf">b</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 3);
    let mut visited = VisitedSet::new();
    let documents = discoverer
        .discover_from(&format!("{}/a", base_url), 0, &mut visited)
        .await;

    assert_eq!(urls(&documents, &base_url), vec!["/docs/b.pdf"]);
    assert_eq!(visited.len(), 2);
}

#[tokio::test]
async fn test_depth_limit_is_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for level in 0..3 {
        let body = format!(
            r#"<a href="/p{next}">定额 {next}</a><a href="/p{level}.pdf">doc</a>"#,
            next = level + 1,
            level = level
        );
        let expected_calls = if level < 2 { 1 } else { 0 };
        Mock::given(method("GET"))
            .and(path(format!("/p{}", level)))
            .respond_with(html_response(&body))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;
    }

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 1);
    let documents = discoverer.discover(&format!("{}/p0", base_url)).await;

    assert_eq!(urls(&documents, &base_url), vec!["/p0.pdf", "/p1.pdf"]);
}

#[tokio::test]
async fn test_start_deeper_than_limit_returns_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(r#"<a href="/x.pdf">x</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 2);
    let mut visited = VisitedSet::new();
    let documents = discoverer
        .discover_from(&format!("{}/", mock_server.uri()), 3, &mut visited)
        .await;

    assert!(documents.is_empty());
    assert!(visited.is_empty());
}

#[tokio::test]
async fn test_visited_page_is_not_fetched() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .respond_with(html_response(r#"<a href="/x.pdf">x</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 3);
    let mut visited = VisitedSet::new();
    visited.insert(seed.clone());

    let documents = discoverer.discover_from(&seed, 0, &mut visited).await;
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_year_range_filters_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"
            <a href="/old.pdf">2022年 定额</a>
            <a href="/new.pdf">2023年 定额</a>
            <a href="/undated.pdf">最新通知</a>
            <a href="/2025/late.pdf">late</a>
            "#,
        ))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let years = YearRange::new(Some(2023), Some(2024));
    let discoverer = Discoverer::new(&client, &run, years, 0);
    let documents = discoverer.discover(&format!("{}/", base_url)).await;

    assert_eq!(urls(&documents, &base_url), vec!["/new.pdf", "/undated.pdf"]);

    let log = state.snapshot().debug_log;
    assert!(log
        .iter()
        .any(|line| line.starts_with("PDF link outside the year range") && line.ends_with("/old.pdf")));
}

#[tokio::test]
async fn test_failing_pages_are_swallowed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<a href="/broken">造价信息</a><a href="/good">信息价</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(html_response(r#"<a href="/good.pdf">ok</a>"#))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 2);
    let documents = discoverer.discover(&format!("{}/", base_url)).await;

    assert_eq!(urls(&documents, &base_url), vec!["/good.pdf"]);
    assert!(state
        .snapshot()
        .debug_log
        .iter()
        .any(|line| line.starts_with("Failed to fetch page, status 500")));
}

#[tokio::test]
async fn test_unreachable_seed_yields_nothing() {
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let discoverer = Discoverer::new(&client, &run, YearRange::unbounded(), 3);
    let documents = discoverer.discover("http://127.0.0.1:1/").await;

    assert!(documents.is_empty());
    assert!(state
        .snapshot()
        .debug_log
        .iter()
        .any(|line| line.starts_with("Error while fetching page")));
}

#[tokio::test]
async fn test_gbk_page_is_decoded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let (page, _, _) =
        encoding_rs::GBK.encode(r#"<html><body><a href="/a.pdf">2024年3月信息价</a></body></html>"#);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page.into_owned(), "text/html; charset=gbk"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(pdf_response(2048))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(PathBuf::from("unused")).unwrap();

    let years = YearRange::new(Some(2024), Some(2024));
    let discoverer = Discoverer::new(&client, &run, years, 1);
    let documents = discoverer.discover(&format!("{}/", base_url)).await;

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].link_text, "2024年3月信息价");
}
