use mockito::Matcher;
use std::net::TcpListener;
use std::sync::Arc;
use stress_core::{run_load_test, Config, HttpTransport};

fn config(url: String, workers: usize, total_requests: u64) -> Config {
    let mut config = Config::default();
    config.target.url = url;
    config.target.timeout_ms = 2_000;
    config.load.workers = workers;
    config.load.total_requests = total_requests;
    config.validate().unwrap();
    config
}

fn transport(config: &Config) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(config.target.url.clone(), config.target.timeout()).unwrap())
}

#[test]
fn test_ok_target_counts_successes() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Regex(
            r#""reservation_status":"(confirmed|pending|cancelled)""#.to_string(),
        ))
        .with_status(200)
        .expect(60)
        .create();

    let config = config(server.url(), 4, 60);
    let report = run_load_test(&config, transport(&config)).unwrap();

    mock.assert();
    assert_eq!(report.success, 60);
    assert_eq!(report.errors, 0);
    assert_eq!(report.latency.unwrap().count, 60);
}

#[test]
fn test_always_500_target() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .expect(25)
        .create();

    let config = config(server.url(), 5, 25);
    let report = run_load_test(&config, transport(&config)).unwrap();

    mock.assert();
    assert_eq!(report.success, 0);
    assert_eq!(report.errors, 25);

    let l = report.latency.as_ref().unwrap();
    assert!(l.min_ms <= l.p50_ms && l.p99_ms <= l.max_ms);
    let text = report.to_string();
    assert!(text.contains("Success: 0"));
    assert!(text.contains("Latency p99:"));
}

#[test]
fn test_unreachable_target_counts_errors() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = config(format!("http://127.0.0.1:{port}"), 2, 6);
    let report = run_load_test(&config, transport(&config)).unwrap();

    assert_eq!(report.success, 0);
    assert_eq!(report.errors, 6);
    assert_eq!(report.completed(), 6);
}
