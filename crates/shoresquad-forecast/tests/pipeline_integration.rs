//! Integration tests for the forecast pipeline against a mock HTTP server.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use shoresquad_forecast::render::{render_markup, UNAVAILABLE_MARKUP};
use shoresquad_forecast::{
    Clock, ForecastCache, ForecastPipeline, HostPage, HttpForecastSource, KeyValueStore,
    MemoryStore, PipelineOutcome, RenderTarget,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "ss_forecast_cache_v1";
const FORECAST_PATH: &str = "/v1/environment/4-day-weather-forecast";

#[derive(Clone, Default)]
struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    fn at(ms: i64) -> Self {
        let clock = Self::default();
        clock.0.store(ms, Ordering::SeqCst);
        clock
    }

    fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn four_day_payload() -> Value {
    json!({
        "items": [{
            "update_timestamp": "2024-04-30T17:30:00+08:00",
            "forecasts": [
                {
                    "date": "2024-05-01",
                    "temperature": { "low": 25, "high": 34 },
                    "relative_humidity": { "low": 55, "high": 95 },
                    "wind": { "direction": "SSE", "speed": { "low": 10, "high": 20 } },
                    "forecast": "Afternoon thundery showers"
                },
                {
                    "date": "2024-05-02",
                    "temperature": { "low": 26, "high": 33 },
                    "forecast": "Partly cloudy"
                },
                {
                    "timestamp": "2024-05-03T00:00:00+08:00",
                    "general": { "forecast": "Fair & warm" }
                },
                { "date": "2024-05-04" }
            ]
        }]
    })
}

fn pipeline_for(
    server_uri: &str,
    clock: ManualClock,
) -> ForecastPipeline<HttpForecastSource, MemoryStore, ManualClock> {
    let source = HttpForecastSource::new(format!("{}{}", server_uri, FORECAST_PATH)).unwrap();
    let cache = ForecastCache::with_clock(MemoryStore::new(), KEY, clock);
    ForecastPipeline::new(source, cache)
}

async fn mount_forecast(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(four_day_payload()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_renders_cards_and_writes_cache() {
    let server = MockServer::start().await;
    mount_forecast(&server, 1).await;

    let pipeline = pipeline_for(&server.uri(), ManualClock::at(5_000));
    let mut target = String::new();

    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::FromNetwork);
    assert_eq!(target.matches("forecast-card\"").count(), 4);
    assert!(target.contains("RH 55%–95% Wind SSE 10–20 km/h"));
    assert!(target.contains("Fair &amp; warm"));
    assert!(target.contains("--°C / --°C"));

    let stored: Value =
        serde_json::from_str(&pipeline.cache().store().get(KEY).unwrap()).unwrap();
    assert_eq!(stored["ts"], json!(5_000));
    assert_eq!(stored["data"], four_day_payload());
}

#[tokio::test]
async fn test_rerun_within_window_matches_and_skips_network() {
    let server = MockServer::start().await;
    mount_forecast(&server, 1).await;

    let clock = ManualClock::at(0);
    let pipeline = pipeline_for(&server.uri(), clock.clone());
    let mut first = String::new();
    let mut second = String::new();

    pipeline.run(Some(&mut first)).await;
    clock.advance(599_999);
    assert_eq!(pipeline.run(Some(&mut second)).await, PipelineOutcome::FromCache);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rerun_after_window_fetches_exactly_once() {
    let server = MockServer::start().await;
    mount_forecast(&server, 2).await;

    let clock = ManualClock::at(0);
    let pipeline = pipeline_for(&server.uri(), clock.clone());
    let mut target = String::new();

    pipeline.run(Some(&mut target)).await;
    clock.advance(600_000);
    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::FromNetwork);
}

#[tokio::test]
async fn test_stale_seeded_cache_is_a_miss() {
    let server = MockServer::start().await;
    mount_forecast(&server, 1).await;

    let now = 10_000_000;
    let pipeline = pipeline_for(&server.uri(), ManualClock::at(now));
    let seeded = json!({ "ts": now - 601_000, "data": { "items": [] } });
    pipeline
        .cache()
        .store()
        .set(KEY, &seeded.to_string())
        .unwrap();

    let mut target = String::new();
    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::FromNetwork);
    assert_eq!(target, render_markup(&four_day_payload()));
}

#[tokio::test]
async fn test_corrupt_cache_falls_through_to_network() {
    let server = MockServer::start().await;
    mount_forecast(&server, 1).await;

    let pipeline = pipeline_for(&server.uri(), ManualClock::at(0));
    pipeline.cache().store().set(KEY, "not json at all").unwrap();

    let mut target = String::new();
    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::FromNetwork);
}

#[tokio::test]
async fn test_server_error_renders_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server.uri(), ManualClock::at(0));
    let mut target = String::new();

    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::Fallback);
    assert_eq!(target, UNAVAILABLE_MARKUP);
    assert!(pipeline.cache().store().get(KEY).is_none());
}

#[tokio::test]
async fn test_malformed_body_renders_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server.uri(), ManualClock::at(0));
    let mut target = String::new();

    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::Fallback);
    assert_eq!(target, UNAVAILABLE_MARKUP);
    assert!(pipeline.cache().store().get(KEY).is_none());
}

#[tokio::test]
async fn test_connection_refused_renders_fallback() {
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let pipeline = pipeline_for(&uri, ManualClock::at(0));
    let mut target = String::new();

    assert_eq!(pipeline.run(Some(&mut target)).await, PipelineOutcome::Fallback);
    assert_eq!(target, UNAVAILABLE_MARKUP);
    assert!(pipeline.cache().store().get(KEY).is_none());
}

#[tokio::test]
async fn test_renders_into_host_page_container() {
    let server = MockServer::start().await;
    mount_forecast(&server, 1).await;

    let mut page = HostPage::new(
        r#"<main><div id="forecastContainer" class="forecast-grid">static</div><p>after</p></main>"#,
    );
    let pipeline = pipeline_for(&server.uri(), ManualClock::at(0));

    let outcome = match page.container("forecastContainer") {
        Some(mut container) => pipeline.run(Some(&mut container as &mut dyn RenderTarget)).await,
        None => pipeline.run(None).await,
    };

    assert_eq!(outcome, PipelineOutcome::FromNetwork);
    let html = page.html();
    assert!(!html.contains("static"));
    assert!(html.contains("Afternoon thundery showers"));
    assert!(html.contains("</article></div><p>after</p></main>"));
}

#[tokio::test]
async fn test_page_without_container_is_noop() {
    let server = MockServer::start().await;
    mount_forecast(&server, 0).await;

    let mut page = HostPage::new("<main><p>no forecast here</p></main>");
    let pipeline = pipeline_for(&server.uri(), ManualClock::at(0));

    let outcome = match page.container("forecastContainer") {
        Some(mut container) => pipeline.run(Some(&mut container as &mut dyn RenderTarget)).await,
        None => pipeline.run(None).await,
    };

    assert_eq!(outcome, PipelineOutcome::NoTarget);
    assert!(page.html().contains("<main><p>no forecast here</p></main>"));
}
