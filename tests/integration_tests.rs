//! End-to-end tests of the polling pipeline against a local HTTP fixture

use airwatch::{
    AirQualityClient, AirQualityMonitor, AirWatchConfig, AqiCategory, City, ErrorLog,
    FetchError, FetchErrorKind, FetchOutcome,
};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const VALID_BODY: &str = r#"{"coord":{"lon":37.6173,"lat":55.7558},"list":[{"main":{"aqi":4},"components":{"co":300.4,"no":0.2,"no2":25.1,"o3":60.0,"so2":4.5,"pm2_5":38.2,"pm10":45.9,"nh3":1.1},"dt":1700000000}]}"#;

/// Minimal HTTP server answering every request with the same response
struct FixtureServer {
    url: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<String>>>,
}

impl FixtureServer {
    fn respond(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/data/2.5/air_pollution", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));

        let (server_hits, server_last) = (hits.clone(), last_request.clone());
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                server_hits.fetch_add(1, Ordering::SeqCst);
                let request_line = read_request(&stream);
                *server_last.lock().unwrap() = Some(request_line);
                let response = format!(
                    "HTTP/1.1 {status} Fixture\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self {
            url,
            hits,
            last_request,
        }
    }

    /// Answers every request with raw bytes that are not HTTP
    fn garbage(reply: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/air_pollution", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));

        let server_hits = hits.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                server_hits.fetch_add(1, Ordering::SeqCst);
                read_request(&stream);
                let _ = stream.write_all(reply.as_bytes());
            }
        });

        Self {
            url,
            hits,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Accepts connections but never answers
    fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/air_pollution", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));

        let server_hits = hits.clone();
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                server_hits.fetch_add(1, Ordering::SeqCst);
                held.push(stream);
            }
        });

        Self {
            url,
            hits,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn read_request(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    let _ = reader.read_line(&mut request_line);
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if line == "\r\n" => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
    request_line
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/air_pollution")
}

fn moscow() -> City {
    City::new("Moscow", 55.7558, 37.6173)
}

fn test_config(log_dir: &Path, base_url: &str, min_interval: u64) -> AirWatchConfig {
    AirWatchConfig {
        api_key: "test_key".to_string(),
        base_url: base_url.to_string(),
        request_timeout_seconds: 1,
        min_request_interval_seconds: min_interval,
        log_dir: log_dir.to_path_buf(),
        cities: vec![moscow()],
        ..Default::default()
    }
}

fn error_log_lines(config: &AirWatchConfig) -> Vec<String> {
    fs::read_to_string(config.error_log_path())
        .map(|contents| contents.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

fn expect_failure(outcome: FetchOutcome) -> FetchError {
    match outcome {
        FetchOutcome::Failed(failure) => failure,
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn test_successful_poll_is_stored_and_reported() {
    let server = FixtureServer::respond(200, VALID_BODY);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let summary = monitor.poll_all();
    assert_eq!(summary.fetched, 1);
    assert_eq!(server.hits(), 1);

    let request = server.last_request.lock().unwrap().clone().unwrap();
    assert!(request.starts_with("GET /data/2.5/air_pollution?"));
    assert!(request.contains("lat=55.7558"));
    assert!(request.contains("lon=37.6173"));
    assert!(request.contains("appid=test_key"));

    let entries = monitor.history().load("Moscow").entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].city, "Moscow");
    assert_eq!(entries[0].data.aqi, Some(4));
    assert_eq!(entries[0].data.pm2_5, Some(38.2));

    let report = monitor.report("Moscow").unwrap();
    let advisory = report.advisory.unwrap();
    assert_eq!(advisory.category, AqiCategory::Harmful);
    assert!(advisory.recommendation.contains("Wear a protective mask"));
    assert!(!advisory.recommendation.contains("asthma"));

    assert!(error_log_lines(&config).is_empty());
}

#[test]
fn test_second_poll_within_interval_makes_no_request() {
    let server = FixtureServer::respond(200, VALID_BODY);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    assert!(matches!(monitor.poll_city(&moscow()), FetchOutcome::Fetched(_)));
    assert!(monitor.poll_city(&moscow()).is_rate_limited());

    assert_eq!(server.hits(), 1);
    assert_eq!(monitor.history().load("Moscow").entries().len(), 1);
    assert!(error_log_lines(&config).is_empty());
}

#[test]
fn test_fetches_spaced_by_interval_both_proceed() {
    let server = FixtureServer::respond(200, VALID_BODY);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut client = AirQualityClient::new(&config, ErrorLog::new(config.error_log_path())).unwrap();
    let start = Instant::now();

    let first = client.fetch_at(55.7558, 37.6173, "Moscow", start);
    let second = client.fetch_at(55.7558, 37.6173, "Moscow", start + Duration::from_secs(60));

    assert!(matches!(first, FetchOutcome::Fetched(_)));
    assert!(matches!(second, FetchOutcome::Fetched(_)));
    assert_eq!(server.hits(), 2);
}

#[test]
fn test_readings_round_trip_in_append_order() {
    let server = FixtureServer::respond(200, VALID_BODY);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 0);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    for _ in 0..3 {
        assert!(matches!(monitor.poll_city(&moscow()), FetchOutcome::Fetched(_)));
    }

    let entries = monitor.history().load("Moscow").entries();
    assert_eq!(entries.len(), 3);
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert!(entries.iter().all(|e| e.data.co == Some(300.4)));
    assert_eq!(monitor.report("Moscow").unwrap().trend.values, vec![Some(4); 3]);
}

#[test]
fn test_bad_status_is_logged() {
    let server = FixtureServer::respond(401, r#"{"cod":401,"message":"Invalid API key"}"#);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(
        failure,
        FetchError::BadStatus {
            status: 401,
            body: r#"{"cod":401,"message":"Invalid API key"}"#.to_string()
        }
    );

    let lines = error_log_lines(&config);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(r#"] Moscow: Bad status 401: {"cod":401,"message":"Invalid API key"}"#));
    assert!(monitor.report("Moscow").is_none());
}

#[test]
fn test_empty_list_is_logged_as_missing_list() {
    let server = FixtureServer::respond(200, r#"{"list": []}"#);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(failure.kind(), FetchErrorKind::MissingList);

    let lines = error_log_lines(&config);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Moscow: Missing 'list' in API response"));
    assert!(!monitor.history().path_for("Moscow").exists());
}

#[test]
fn test_missing_components_is_logged_as_missing_fields() {
    let server = FixtureServer::respond(200, r#"{"list": [{"main": {"aqi": 2}}]}"#);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(failure.kind(), FetchErrorKind::MissingFields);
    assert!(error_log_lines(&config)[0].contains("Missing 'main' or 'components' in data entry"));
}

#[test]
fn test_invalid_json_is_logged() {
    let server = FixtureServer::respond(200, "<html>oops</html>");
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(failure, FetchError::InvalidJson);
    assert!(error_log_lines(&config)[0].ends_with("Moscow: Invalid JSON response"));
}

#[test]
fn test_absent_pm25_is_stored_as_null() {
    let server = FixtureServer::respond(
        200,
        r#"{"list": [{"main": {"aqi": 1}, "components": {"pm10": 3.0}}]}"#,
    );
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let reading = monitor.poll_city(&moscow()).into_reading().unwrap();
    assert_eq!(reading.pm2_5, None);

    let contents = fs::read_to_string(monitor.history().path_for("Moscow")).unwrap();
    assert!(contents.contains("\"pm2_5\": null"));
}

#[test]
fn test_timeout_is_classified_and_logged() {
    let server = FixtureServer::silent();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(failure, FetchError::Timeout { seconds: 1 });
    assert!(error_log_lines(&config)[0].ends_with("Moscow: Timeout after 1s"));
}

#[test]
fn test_connection_failure_is_classified_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &closed_port_url(), 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(failure.kind(), FetchErrorKind::Connection);
    assert!(error_log_lines(&config)[0].ends_with("Moscow: Connection error (network issue)"));
}

#[test]
fn test_transport_errors_do_not_leak_api_key() {
    let server = FixtureServer::garbage("THIS IS NOT HTTP\r\n\r\n");
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), &server.url, 60);
    config.api_key = "SECRET_KEY_123".to_string();
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let failure = expect_failure(monitor.poll_city(&moscow()));
    assert_eq!(failure.kind(), FetchErrorKind::Unexpected);
    assert_eq!(server.hits(), 1);
    assert!(!failure.to_string().contains("SECRET_KEY_123"));

    let lines = error_log_lines(&config);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Moscow: Unexpected error"));
    assert!(!lines[0].contains("SECRET_KEY_123"));
    assert!(!lines[0].contains("appid="));
}

#[test]
fn test_connection_failure_does_not_leak_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), &closed_port_url(), 60);
    config.api_key = "SECRET_KEY_123".to_string();
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    match expect_failure(monitor.poll_city(&moscow())) {
        FetchError::Connection { message } => assert!(!message.contains("SECRET_KEY_123")),
        other => panic!("expected a connection failure, got {other:?}"),
    }
}

#[test]
fn test_corrupt_history_is_replaced_on_next_poll() {
    let server = FixtureServer::respond(200, VALID_BODY);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    let path = monitor.history().path_for("Moscow");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"[{\"timestamp\": garbage").unwrap();

    assert!(matches!(monitor.poll_city(&moscow()), FetchOutcome::Fetched(_)));

    let entries = monitor.history().load("Moscow").entries();
    assert_eq!(entries.len(), 1);
    assert!(error_log_lines(&config).is_empty());
}

#[test]
fn test_history_write_failure_is_logged_not_raised() {
    let server = FixtureServer::respond(200, VALID_BODY);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &server.url, 60);
    fs::write(config.history_dir(), b"not a directory").unwrap();
    let mut monitor = AirQualityMonitor::new(&config).unwrap();

    assert!(matches!(monitor.poll_city(&moscow()), FetchOutcome::Fetched(_)));

    let lines = error_log_lines(&config);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Moscow: Failed to save history: Storage error"));
}
