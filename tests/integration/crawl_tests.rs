//! End-to-end mirroring runs against a mock repository
//!
//! The mock serves a two-level repository:
//!
//! ```text
//! /list/root/          index: ../  sub/  a.jar
//! /list/root/sub/      index: ../  b.pom
//! ```

use arti_mirror::config::{Config, CrawlConfig, FAILURE_LOG_FILE};
use arti_mirror::crawler::{crawl, Coordinator};
use arti_mirror::FilterMode;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT_INDEX: &str = r#"<html>
<head><title>Index of root/</title></head>
<body>
<h1>Index of root/</h1>
<pre><a href="../">../</a>
<a href="sub/">sub/</a>                                    12-Mar-2024 10:02    -
<a href="a.jar">a.jar</a>                                  12-Mar-2024 10:02  1.20 KB
</pre>
<hr/><address>Artifactory Server</address>
</body>
</html>
"#;

const SUB_INDEX: &str = r#"<html>
<head><title>Index of root/sub/</title></head>
<body>
<h1>Index of root/sub/</h1>
<pre><a href="../">../</a>
<a href="b.pom">b.pom</a>                                  12-Mar-2024 10:02  850 bytes
</pre>
</body>
</html>
"#;

/// Mounts the two-level repository; `a.jar` answers with `jar_status`
async fn mount_repository(server: &MockServer, jar_status: u16) {
    Mock::given(method("GET"))
        .and(path("/list/root/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_INDEX))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list/root/sub/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SUB_INDEX))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list/root/a.jar"))
        .respond_with(ResponseTemplate::new(jar_status).set_body_bytes(b"jar-bytes".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list/root/sub/b.pom"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<project/>"))
        .mount(server)
        .await;
}

/// Creates a whitelist configuration mirroring `root` into `<tmp>/root`
fn create_test_config(server: &MockServer, tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.general.output_dir = tmp.path().join("root").to_string_lossy().into_owned();
    config.general.export_dir = Some(tmp.path().join("export").to_string_lossy().into_owned());
    config.artifactory.url = format!("{}/list/", server.uri());
    config.artifactory.repositories = vec!["root".to_string()];
    config.files.filter_mode = FilterMode::Whitelist;
    config.files.extensions = vec![".jar".to_string(), ".pom".to_string()];
    config.download.retry_attempts = 1;
    config.download.delay = 0;
    config.download.timeout = 5;
    config
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_dir() {
                pending.push(entry.path());
            } else {
                files.push(entry.path());
            }
        }
    }
    files
}

fn index_files_under(dir: &Path) -> Vec<PathBuf> {
    files_under(dir)
        .into_iter()
        .filter(|file| file.to_string_lossy().ends_with("-index.html"))
        .collect()
}

async fn requests_to(server: &MockServer, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == url_path)
        .count()
}

#[tokio::test]
async fn test_full_mirror_two_levels() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &tmp);

    let stats = crawl(&config, CancellationToken::new())
        .await
        .expect("mirroring should succeed");

    let root = tmp.path().join("root");
    assert_eq!(std::fs::read(root.join("a.jar")).unwrap(), b"jar-bytes");
    assert_eq!(
        std::fs::read_to_string(root.join("sub").join("b.pom")).unwrap(),
        "<project/>"
    );
    assert!(index_files_under(&root).is_empty());
    assert!(!tmp.path().join("export").join(FAILURE_LOG_FILE).exists());

    assert_eq!(stats.files_downloaded, 2);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.directories_entered, 1);
    assert_eq!(stats.index_pages, 2);
    assert_eq!(stats.index_files_removed, 2);
    assert_eq!(stats.repositories_processed, 1);
    assert_eq!(stats.repositories_failed, 0);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_parent_links_never_followed() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &tmp);

    let stats = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(requests_to(&mock_server, "/list/").await, 0);
    assert_eq!(requests_to(&mock_server, "/list/root/").await, 1);
    assert_eq!(stats.entries_skipped, 2);
    assert!(!tmp.path().join("a.jar").exists());
}

#[tokio::test]
async fn test_second_run_downloads_nothing() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &tmp);

    let first = crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(first.files_downloaded, 2);

    let second = crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(second.files_downloaded, 0);
    assert_eq!(second.files_existing, 2);

    assert_eq!(requests_to(&mock_server, "/list/root/a.jar").await, 1);
    assert_eq!(requests_to(&mock_server, "/list/root/sub/b.pom").await, 1);
}

#[tokio::test]
async fn test_force_replace_downloads_again() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, &tmp);

    crawl(&config, CancellationToken::new()).await.unwrap();

    config.artifactory.force_replace = true;
    let second = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(second.files_downloaded, 2);
    assert_eq!(requests_to(&mock_server, "/list/root/a.jar").await, 2);
}

#[tokio::test]
async fn test_failed_download_goes_to_failure_log() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 404).await;
    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &tmp);

    let stats = crawl(&config, CancellationToken::new())
        .await
        .expect("a failed download must not fail the run");

    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.files_downloaded, 1);
    assert!(tmp.path().join("root").join("sub").join("b.pom").exists());
    assert!(!tmp.path().join("root").join("a.jar").exists());

    let log = std::fs::read_to_string(tmp.path().join("export").join(FAILURE_LOG_FILE)).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("wget --timeout=5 --tries=1 -O "));
    assert!(lines[0].ends_with(&format!("{}/list/root/a.jar", mock_server.uri())));
}

#[tokio::test]
async fn test_keep_index_files() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, &tmp);
    config.files.clean_html_files = false;

    let stats = crawl(&config, CancellationToken::new()).await.unwrap();

    let root = tmp.path().join("root");
    assert!(root.join("root-index.html").exists());
    assert!(root.join("sub").join("sub-index.html").exists());
    assert_eq!(stats.index_files_removed, 0);
}

#[tokio::test]
async fn test_missing_repository_does_not_stop_batch() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, &tmp);
    config.artifactory.repositories = vec!["missing".to_string(), "root".to_string()];

    let stats = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(stats.repositories_processed, 2);
    assert_eq!(stats.repositories_failed, 1);
    assert!(tmp.path().join("root").join("a.jar").exists());
}

#[tokio::test]
async fn test_repository_list_file() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, &tmp);

    let list = tmp.path().join("repos.csv");
    std::fs::write(&list, "\r\n  root  \r\n\r\n").unwrap();
    config.artifactory.repositories.clear();
    config.artifactory.repo_list = list.to_string_lossy().into_owned();

    let stats = crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(stats.repositories_processed, 1);
    assert!(tmp.path().join("root").join("a.jar").exists());
}

#[tokio::test]
async fn test_cancelled_run_still_cleans_up() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, 200).await;
    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &tmp);

    let mut crawl_config = CrawlConfig::from_config(&config);
    crawl_config.delay = std::time::Duration::from_secs(30);

    let coordinator = Coordinator::new(crawl_config).unwrap();
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        cancel.cancel();
    });

    let result = coordinator.run(&["root".to_string()]).await;

    assert!(result.unwrap_err().is_cancelled());
    assert!(index_files_under(&tmp.path().join("root")).is_empty());
}
