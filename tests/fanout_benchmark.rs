/// Integration tests for the live-weather fan-out benchmark
///
/// Tests verify:
/// 1. One result per city from both strategies, in input order
/// 2. An unknown city fails alone without stopping the run
/// 3. Per-request timeouts are reported as timeouts
/// 4. The event loop overlaps slow requests
///
/// The weather endpoint is a local mock server; no network access needed.
///
/// Run with: cargo test --test fanout_benchmark

use std::time::Duration;

use tempmon_service::bench::fanout::{run_fanout_benchmark, successful, FanoutReport};
use tempmon_service::bench::schedule::TaskOutcome;
use tempmon_service::bench::{Speedup, StrategyRun};
use tempmon_service::config::WeatherEndpoint;
use tempmon_service::model::{WeatherError, WeatherQuoteResult};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEATHER_PATH: &str = "/data/2.5/weather";
const API_KEY: &str = "test-key";

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Runtime that keeps the mock server alive while the (synchronous)
/// benchmark runs on the test thread.
fn server_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime")
}

/// Mount a JSON reply for `city`, optionally delayed.
async fn mount_city(server: &MockServer, city: &str, status: u16, body: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", city))
        .and(query_param("appid", API_KEY))
        .and(query_param("units", "metric"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "application/json")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn endpoint_for(server: &MockServer, timeout_secs: u64) -> WeatherEndpoint {
    let mut endpoint = WeatherEndpoint::with_base_url(format!("{}{}", server.uri(), WEATHER_PATH));
    endpoint.timeout_secs = timeout_secs;
    endpoint
}

fn cities(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn temps(outcomes: &[TaskOutcome<WeatherQuoteResult>]) -> Vec<Option<f64>> {
    outcomes
        .iter()
        .map(|o| o.output().and_then(|q| q.temp))
        .collect()
}

fn runs(report: &FanoutReport) -> [&StrategyRun<TaskOutcome<WeatherQuoteResult>>; 2] {
    [&report.baseline, &report.contender]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_city_fails_alone() {
    let rt = server_runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_city(&server, "London", 200, r#"{"main": {"temp": 11.4}, "name": "London", "cod": 200}"#, Duration::ZERO).await;
        mount_city(&server, "Atlantis", 404, r#"{"cod": "404", "message": "city not found"}"#, Duration::ZERO).await;
        mount_city(&server, "Paris", 200, r#"{"main": {"temp": 19.0}, "name": "Paris", "cod": "200"}"#, Duration::ZERO).await;
        server
    });

    let input = cities(&["London", "Atlantis", "Paris"]);
    let report = run_fanout_benchmark(&input, API_KEY, &endpoint_for(&server, 5)).unwrap();

    for run in runs(&report) {
        let order: Vec<&str> = run.results.iter().map(|o| o.city.as_str()).collect();
        assert_eq!(order, vec!["London", "Atlantis", "Paris"], "{}", run.label);
        assert_eq!(successful(&run.results), 2, "{}", run.label);

        let atlantis = run.results[1].output().expect("no task should panic");
        assert_eq!(atlantis.temp, None);
        match &atlantis.error {
            Some(WeatherError::Api { code, payload }) => {
                assert_eq!(code, "404");
                assert_eq!(payload["message"], "city not found");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    assert_eq!(temps(&report.baseline.results), temps(&report.contender.results));
    assert_eq!(temps(&report.baseline.results), vec![Some(11.4), None, Some(19.0)]);
}

#[test]
fn test_slow_city_times_out_without_blocking_others() {
    let rt = server_runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_city(&server, "Oslo", 200, r#"{"main": {"temp": -2.0}, "cod": 200}"#, Duration::ZERO).await;
        mount_city(&server, "Slowville", 200, r#"{"main": {"temp": 5.0}, "cod": 200}"#, Duration::from_secs(4)).await;
        server
    });

    let input = cities(&["Slowville", "Oslo"]);
    let report = run_fanout_benchmark(&input, API_KEY, &endpoint_for(&server, 1)).unwrap();

    for run in runs(&report) {
        let slow = run.results[0].output().unwrap();
        assert!(
            matches!(slow.error, Some(WeatherError::Transport { timed_out: true, .. })),
            "{}: {:?}",
            run.label,
            slow.error
        );
        let oslo = run.results[1].output().unwrap();
        assert_eq!(oslo.temp, Some(-2.0));
    }
}

#[test]
fn test_event_loop_overlaps_slow_requests() {
    let rt = server_runtime();
    let names = ["Rome", "Lima", "Oslo", "Kyiv"];
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        for name in names {
            mount_city(&server, name, 200, r#"{"main": {"temp": 15.0}, "cod": 200}"#, Duration::from_millis(300)).await;
        }
        server
    });

    let report = run_fanout_benchmark(&cities(&names), API_KEY, &endpoint_for(&server, 5)).unwrap();

    assert_eq!(successful(&report.baseline.results), 4);
    assert_eq!(successful(&report.contender.results), 4);
    assert!(report.baseline.elapsed >= Duration::from_millis(1200));
    match report.speedup() {
        Speedup::Ratio(r) => assert!(r > 1.5, "speedup was {}", r),
        Speedup::Undefined => panic!("contender time should be measurable"),
    }
}

#[test]
fn test_wrong_key_is_api_error_for_every_city() {
    let rt = server_runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WEATHER_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"cod": 401, "message": "Invalid API key."}"#,
            ))
            .mount(&server)
            .await;
        server
    });

    let report = run_fanout_benchmark(&cities(&["Oslo", "Lima"]), "bad-key", &endpoint_for(&server, 5)).unwrap();
    for run in runs(&report) {
        assert_eq!(successful(&run.results), 0);
        for outcome in &run.results {
            let quote = outcome.output().unwrap();
            assert!(matches!(&quote.error, Some(WeatherError::Api { code, .. }) if code == "401"));
        }
    }
}

#[test]
fn test_empty_city_list() {
    let rt = server_runtime();
    let server = rt.block_on(MockServer::start());
    let report = run_fanout_benchmark(&[], API_KEY, &endpoint_for(&server, 5)).unwrap();
    assert!(report.baseline.results.is_empty());
    assert!(report.contender.results.is_empty());
}
