use crate::common::{pdf_body, pdf_response};
use pdf_harvester::config::Config;
use pdf_harvester::crawler::{build_http_client, DiscoveredDocument, DownloadOutcome, Downloader};
use pdf_harvester::state::RunState;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIN_BYTES: u64 = 1000;

fn document(url: String, link_text: &str) -> DiscoveredDocument {
    DiscoveredDocument {
        url,
        link_text: link_text.to_string(),
    }
}

#[tokio::test]
async fn test_saves_pdf_under_synthesized_name() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/a.pdf"))
        .respond_with(pdf_response(2048))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/files/a.pdf", mock_server.uri()), "2024年3月信息价");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert_eq!(
        outcome,
        DownloadOutcome::Saved {
            file_name: "2024-03-信息价.pdf".to_string(),
            bytes: 2048,
        }
    );
    let written = std::fs::read(dir.path().join("2024-03-信息价.pdf")).unwrap();
    assert_eq!(written, pdf_body(2048));

    let log = state.snapshot().debug_log;
    assert!(log.iter().any(|line| line == "Will be saved as: 2024-03-信息价.pdf"));
    assert!(log.iter().any(|line| line == "Downloaded: 2024-03-信息价.pdf"));
}

#[tokio::test]
async fn test_small_non_pdf_body_is_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fake.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"<html>login</html>".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/fake.pdf", mock_server.uri()), "2023年 定额");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert!(matches!(outcome, DownloadOutcome::Skipped { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_small_body_with_signature_is_saved() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiny.pdf"))
        .respond_with(pdf_response(64))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/tiny.pdf", mock_server.uri()), "2023年 定额");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert_eq!(outcome.file_name(), Some("2023-定额.pdf"));
    let written = std::fs::read(dir.path().join("2023-定额.pdf")).unwrap();
    assert_eq!(written, pdf_body(64));
}

#[tokio::test]
async fn test_non_200_is_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/missing.pdf", mock_server.uri()), "");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert_eq!(
        outcome,
        DownloadOutcome::Skipped {
            reason: "HTTP status 404".to_string()
        }
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_extensionless_pdf_response_is_saved() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(pdf_response(4096))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(
        format!("{}/download?id=3", mock_server.uri()),
        "2024年5月造价信息",
    );
    let outcome = downloader.download(&doc, dir.path()).await;

    assert_eq!(outcome.file_name(), Some("2024-05-造价信息.pdf"));
    assert!(dir.path().join("2024-05-造价信息.pdf").is_file());
}

#[tokio::test]
async fn test_extensionless_html_response_is_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![b'x'; 4096], "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/download", mock_server.uri()), "2024年5月造价信息");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert!(matches!(outcome, DownloadOutcome::Skipped { .. }));
    assert!(outcome.reason().unwrap().starts_with("not a PDF"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_network_error_is_reported_as_failed() {
    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document("http://127.0.0.1:1/a.pdf".to_string(), "");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert!(matches!(outcome, DownloadOutcome::Failed { .. }));
    assert!(state
        .snapshot()
        .debug_log
        .iter()
        .any(|line| line.starts_with("Error during download")));
}

#[tokio::test]
async fn test_existing_file_is_overwritten() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(pdf_response(1500))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("2023-定额.pdf"), b"stale").unwrap();

    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/2023年定额.pdf", mock_server.uri()), "");
    let outcome = downloader.download(&doc, dir.path()).await;

    assert_eq!(outcome.file_name(), Some("2023-定额.pdf"));
    let written = std::fs::read(dir.path().join("2023-定额.pdf")).unwrap();
    assert_eq!(written.len(), 1500);
}

#[tokio::test]
async fn test_large_body_saved_without_signature_check() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'x'; 1000], "application/pdf"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/short.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'x'; 999], "application/pdf"))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let client = build_http_client(&Config::default()).unwrap();
    let state = Arc::new(RunState::new(100));
    let run = state.begin(dir.path().to_path_buf()).unwrap();
    let downloader = Downloader::new(&client, &run, MIN_BYTES);

    let doc = document(format!("{}/big.pdf", mock_server.uri()), "");
    let outcome = downloader.download(&doc, dir.path()).await;
    assert_eq!(
        outcome,
        DownloadOutcome::Saved {
            file_name: "big.pdf".to_string(),
            bytes: 1000,
        }
    );

    // One byte under the threshold the signature is required again
    let doc = document(format!("{}/short.pdf", mock_server.uri()), "");
    let outcome = downloader.download(&doc, dir.path()).await;
    assert!(matches!(outcome, DownloadOutcome::Skipped { .. }));
    assert!(!dir.path().join("short.pdf").exists());
}
