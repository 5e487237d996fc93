//! Download client behavior against a mock repository server

use arti_mirror::config::{AuthMethod, CrawlConfig};
use arti_mirror::crawler::{Downloader, BROWSER_USER_AGENT};
use arti_mirror::DownloadError;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, dir: &TempDir) -> CrawlConfig {
    let mut config = CrawlConfig::new(server.uri(), dir.path());
    config.export_dir = dir.path().join("export");
    config.delay = Duration::ZERO;
    config.timeout = Duration::from_secs(5);
    config
}

#[tokio::test]
async fn test_retry_until_success() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/a.jar"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/libs/a.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-content".to_vec()))
        .mount(&mock_server)
        .await;

    let delay = Duration::from_millis(100);
    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 3;
    config.delay = delay;

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let target = tmp.path().join("a.jar");

    let started = Instant::now();
    let written = downloader
        .download(&format!("{}/libs/a.jar", mock_server.uri()), &target)
        .await
        .expect("third attempt should succeed");

    assert!(started.elapsed() >= delay * 2);
    assert_eq!(written, 11);
    assert_eq!(std::fs::read(&target).unwrap(), b"jar-content");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_persistent_error_status_exhausts_attempts() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/broken.jar"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 4;

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let target = tmp.path().join("broken.jar");

    let error = downloader
        .download(&format!("{}/libs/broken.jar", mock_server.uri()), &target)
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(500));
    assert!(error.to_string().contains("500"));
    assert!(!target.exists());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_not_found_is_an_error() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 1;

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let error = downloader
        .download(
            &format!("{}/libs/missing.jar", mock_server.uri()),
            &tmp.path().join("missing.jar"),
        )
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(404));
}

#[tokio::test]
async fn test_basic_auth_header() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/secure/a.pom"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<project/>"))
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 1;
    config.auth = AuthMethod::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    };

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let result = downloader
        .download(
            &format!("{}/secure/a.pom", mock_server.uri()),
            &tmp.path().join("a.pom"),
        )
        .await;

    assert!(result.is_ok(), "basic credentials should be sent: {:?}", result);
}

#[tokio::test]
async fn test_bearer_token_header() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/secure/a.pom"))
        .and(header("authorization", "Bearer s3cr3t-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<project/>"))
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 1;
    config.auth = AuthMethod::Token("s3cr3t-token".to_string());

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let result = downloader
        .download(
            &format!("{}/secure/a.pom", mock_server.uri()),
            &tmp.path().join("a.pom"),
        )
        .await;

    assert!(result.is_ok(), "bearer token should be sent: {:?}", result);
}

#[tokio::test]
async fn test_no_auth_header_by_default() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/a.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("jar"))
        .mount(&mock_server)
        .await;

    let downloader = Downloader::new(&config_for(&mock_server, &tmp), CancellationToken::new()).unwrap();
    downloader
        .download(
            &format!("{}/libs/a.jar", mock_server.uri()),
            &tmp.path().join("a.jar"),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_browser_user_agent_sent() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/a.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("jar"))
        .mount(&mock_server)
        .await;

    let downloader = Downloader::new(&config_for(&mock_server, &tmp), CancellationToken::new()).unwrap();
    downloader
        .download(
            &format!("{}/libs/a.jar", mock_server.uri()),
            &tmp.path().join("a.jar"),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok());
    assert_eq!(user_agent, Some(BROWSER_USER_AGENT));
}

#[tokio::test]
async fn test_download_creates_missing_parent_directories() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/org/a.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("jar"))
        .mount(&mock_server)
        .await;

    let downloader = Downloader::new(&config_for(&mock_server, &tmp), CancellationToken::new()).unwrap();
    let target = tmp.path().join("org").join("junit").join("a.jar");
    downloader
        .download(&format!("{}/libs/org/a.jar", mock_server.uri()), &target)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "jar");
}

#[tokio::test]
async fn test_cancel_interrupts_retry_delay() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/slow.jar"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 3;
    config.delay = Duration::from_secs(30);

    let cancel = CancellationToken::new();
    let downloader = Downloader::new(&config, cancel.clone()).unwrap();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let error = downloader
        .download(
            &format!("{}/libs/slow.jar", mock_server.uri()),
            &tmp.path().join("slow.jar"),
        )
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_connection_error_retried_then_returned() {
    let tmp = TempDir::new().unwrap();

    // Nothing listens on a port that was bound and released
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);

    let delay = Duration::from_millis(100);
    let mut config = CrawlConfig::new(base.clone(), tmp.path());
    config.export_dir = tmp.path().join("export");
    config.timeout = Duration::from_secs(5);
    config.retry_attempts = 3;
    config.delay = delay;

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let target = tmp.path().join("a.jar");

    let started = Instant::now();
    let error = downloader
        .download(&format!("{}/libs/a.jar", base), &target)
        .await
        .unwrap_err();

    assert!(matches!(error, DownloadError::Network { .. }), "got {:?}", error);
    assert_eq!(error.status(), None);
    assert!(started.elapsed() >= delay * 2);
    assert!(!target.exists());
}

#[tokio::test]
async fn test_write_failure_after_ok_is_not_retried() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/libs/a.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-content".to_vec()))
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server, &tmp);
    config.retry_attempts = 3;

    // The parent of the target is a regular file
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let target = blocker.join("a.jar");

    let downloader = Downloader::new(&config, CancellationToken::new()).unwrap();
    let error = downloader
        .download(&format!("{}/libs/a.jar", mock_server.uri()), &target)
        .await
        .unwrap_err();

    assert!(
        matches!(error, DownloadError::Path(_) | DownloadError::Io { .. }),
        "got {:?}",
        error
    );
    assert_eq!(error.status(), None);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
