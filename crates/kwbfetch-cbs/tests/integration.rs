//! Integration tests for the fetch-and-write pipeline
//!
//! No external network access: a std TcpListener on a loopback port
//! serves canned OData pages, so pagination, error cleanup, and
//! idempotence are exercised end to end.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::ProgressBar;
use kwbfetch_cbs::{Config, DownloadError, Outcome, catalog, download_year};

/// Canned-response HTTP server, one response per connection.
struct MockServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockServer {
    /// Start a server with responses keyed by request target
    /// (path plus query). `build` receives the base URL so page
    /// bodies can embed absolute next links.
    fn start(build: impl FnOnce(&str) -> Vec<(String, u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes: HashMap<String, (u16, String)> = build(&base_url)
            .into_iter()
            .map(|(target, status, body)| (target, (status, body)))
            .collect();

        let hits = Arc::new(AtomicUsize::new(0));
        let hits_srv = hits.clone();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                hits_srv.fetch_add(1, Ordering::SeqCst);
                let target = read_request_target(&mut stream);
                let (status, body) = routes
                    .get(&target)
                    .cloned()
                    .unwrap_or((404, "{}".to_string()));
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    500 => "Internal Server Error",
                    _ => "Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { base_url, hits }
    }

    /// Number of requests served so far.
    fn requests(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Read request line and headers; return the request target.
fn read_request_target(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => buf.push(byte[0]),
            _ => break,
        }
    }
    let text = String::from_utf8_lossy(&buf);
    let request_line = text.lines().next().unwrap_or_default();
    request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

fn test_config(server: &MockServer, dir: &tempfile::TempDir) -> Config {
    Config {
        base_url: server.base_url.clone(),
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn paginates_until_next_link_absent() {
    // 3 pages with 2, 2, 0 records; the third has no continuation link
    let server = MockServer::start(|base| {
        vec![
            (
                "/84799NED/Observations".to_string(),
                200,
                format!(
                    r#"{{"value": [{{"Id": 1, "Value": 10}}, {{"Id": 2, "Value": 20}}],
                        "@odata.nextLink": "{base}/page2"}}"#
                ),
            ),
            (
                "/page2".to_string(),
                200,
                format!(
                    r#"{{"value": [{{"Id": 3, "Value": 30}}, {{"Id": 4, "Value": 40}}],
                        "@odata.nextLink": "{base}/page3"}}"#
                ),
            ),
            ("/page3".to_string(), 200, r#"{"value": []}"#.to_string()),
        ]
    });
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, &dir);

    let outcome = download_year(&config, 2020, &ProgressBar::hidden()).unwrap();
    match outcome {
        Outcome::Written { path, rows, pages } => {
            assert_eq!(rows, 4);
            assert_eq!(pages, 3);
            let content = std::fs::read_to_string(path).unwrap();
            let lines: Vec<&str> = content.lines().collect();
            assert_eq!(lines.len(), 5, "header plus four data rows");
            assert_eq!(lines[0], "Id,Value");
            assert_eq!(lines[4], "4,40");
        }
        other => panic!("expected Written, got {other:?}"),
    }
    assert_eq!(server.requests(), 3, "one request per page");
}

#[test]
fn http_error_mid_fetch_deletes_partial_file() {
    let server = MockServer::start(|base| {
        vec![
            (
                "/84799NED/Observations".to_string(),
                200,
                format!(
                    r#"{{"value": [{{"Id": 1}}], "@odata.nextLink": "{base}/page2"}}"#
                ),
            ),
            (
                "/page2".to_string(),
                500,
                r#"{"error": "internal"}"#.to_string(),
            ),
        ]
    });
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, &dir);

    let err = download_year(&config, 2020, &ProgressBar::hidden()).unwrap_err();
    match err {
        DownloadError::Http(e) => assert_eq!(e.status(), Some(500)),
        other => panic!("expected Http error, got {other}"),
    }
    // Page 1 had been written, but no truncated file may remain
    assert!(!config.output_path(2020).exists());
    assert_eq!(server.requests(), 2);
}

#[test]
fn second_run_issues_no_requests_and_keeps_file_identical() {
    let server = MockServer::start(|_| {
        vec![(
            "/84799NED/Observations".to_string(),
            200,
            r#"{"value": [{"Id": 1, "Value": 10}]}"#.to_string(),
        )]
    });
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, &dir);

    let first = download_year(&config, 2020, &ProgressBar::hidden()).unwrap();
    assert!(matches!(first, Outcome::Written { rows: 1, .. }));
    assert_eq!(server.requests(), 1);
    let bytes = std::fs::read(config.output_path(2020)).unwrap();

    let second = download_year(&config, 2020, &ProgressBar::hidden()).unwrap();
    assert!(matches!(second, Outcome::AlreadyExists(_)));
    assert_eq!(server.requests(), 1, "no network on re-run");
    assert_eq!(std::fs::read(config.output_path(2020)).unwrap(), bytes);
}

#[test]
fn zero_rows_leaves_no_file() {
    let server = MockServer::start(|_| {
        vec![(
            "/84799NED/Observations".to_string(),
            200,
            r#"{"value": []}"#.to_string(),
        )]
    });
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, &dir);

    let outcome = download_year(&config, 2020, &ProgressBar::hidden()).unwrap();
    assert!(matches!(outcome, Outcome::NoRows { pages: 1 }));
    assert!(!config.output_path(2020).exists());
}

#[test]
fn schema_change_on_later_page_aborts_and_cleans() {
    let server = MockServer::start(|base| {
        vec![
            (
                "/84799NED/Observations".to_string(),
                200,
                format!(
                    r#"{{"value": [{{"Id": 1}}], "@odata.nextLink": "{base}/page2"}}"#
                ),
            ),
            (
                "/page2".to_string(),
                200,
                r#"{"value": [{"Id": 2, "Surprise": true}]}"#.to_string(),
            ),
        ]
    });
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, &dir);

    let err = download_year(&config, 2020, &ProgressBar::hidden()).unwrap_err();
    assert!(matches!(err, DownloadError::SchemaMismatch { .. }));
    assert!(!config.output_path(2020).exists());
}

#[test]
fn end_to_end_woz_filter() {
    // years=[2020], measures=["woz"]: filter goes out percent-encoded,
    // output lands in kwb-2020-woz.csv
    let server = MockServer::start(|_| {
        vec![(
            "/84799NED/Observations?$filter=Measure%20eq%20%27M001642%27".to_string(),
            200,
            r#"{"value": [
                {"Id": "0001", "Measure": "M001642", "WijkenEnBuurten": "GM0014", "Value": 312},
                {"Id": "0002", "Measure": "M001642", "WijkenEnBuurten": "GM0034", "Value": 298}
            ]}"#
            .to_string(),
        )]
    });
    let dir = tempfile::tempdir().unwrap();

    let raw_measures = ["woz"];
    let config = Config {
        base_url: server.base_url.clone(),
        output_dir: dir.path().to_path_buf(),
        measures: raw_measures
            .iter()
            .map(|m| catalog::resolve_measure(m).to_string())
            .collect(),
        suffix: format!("-{}", raw_measures.join("-")),
    };

    let outcome = download_year(&config, 2020, &ProgressBar::hidden()).unwrap();
    match outcome {
        Outcome::Written { path, rows, .. } => {
            assert_eq!(rows, 2);
            assert!(path.ends_with("kwb-2020-woz.csv"));
            let content = std::fs::read_to_string(&path).unwrap();
            let lines: Vec<&str> = content.lines().collect();
            assert_eq!(lines[0], "Id,Measure,WijkenEnBuurten,Value");
            assert_eq!(lines[1], "0001,M001642,GM0014,312");
            assert_eq!(lines[2], "0002,M001642,GM0034,298");
        }
        other => panic!("expected Written, got {other:?}"),
    }
    assert_eq!(server.requests(), 1);
}
