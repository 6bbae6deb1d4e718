//! Startup regression tests.
//!
//! Drives the same sequence the daemon runs (warm-up, then probe
//! registration, then the router) against in-memory collaborators and a
//! mocked external service.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::matchers::{header_exists, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use healthgate_api::build_router;
use healthgate_core::{GateConfig, Preset};
use healthgate_health::{CacheWarmUp, ProbeRegistry, WarmUpError};
use healthgate_state::{CacheManager, StateStore};

fn fast_config(preset: Preset) -> GateConfig {
    let mut config = GateConfig::preset(preset);
    config.liveness.delay = "0ms".to_string();
    config.readiness.delay = "0ms".to_string();
    config.warmup.delay = "0ms".to_string();
    config.liveness.failure_probability = 0.0;
    config.readiness.failure_probability = 0.0;
    config.random.seed = Some(42);
    config
}

async fn mock_external() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    server
}

fn router_for(config: &GateConfig, caches: &CacheManager) -> Router {
    let registry = ProbeRegistry::from_config(
        config,
        StateStore::open_in_memory().unwrap(),
        caches.clone(),
    )
    .unwrap();
    build_router(registry)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(router, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn hello_responds() {
    let config = fast_config(Preset::Simulated);
    let router = router_for(&config, &CacheManager::new());

    let (status, body) = get(&router, "/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hello");
}

#[tokio::test]
async fn readiness_follows_cache_warm_up() {
    let external = mock_external().await;
    let mut config = fast_config(Preset::DependencyChecking);
    config.readiness.external_url = external.uri();

    let caches = CacheManager::new();
    let router = router_for(&config, &caches);

    let (status, body) = get_json(&router, "/actuator/health/readiness").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "DOWN");
    assert_eq!(body["details"]["check"], "cache");

    CacheWarmUp::from_config(caches.clone(), &config)
        .unwrap()
        .run(&CancellationToken::new())
        .await
        .unwrap();

    let (status, body) = get_json(&router, "/actuator/health/readiness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");

    let (status, body) = get_json(&router, "/actuator/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["liveness"]["status"], "UP");
    assert_eq!(body["components"]["readiness"]["status"], "UP");
}

#[tokio::test]
async fn interrupted_warm_up_leaves_entry_in_place() {
    let external = mock_external().await;
    let mut config = fast_config(Preset::DependencyChecking);
    config.readiness.external_url = external.uri();
    config.warmup.delay = "3m".to_string();

    let caches = CacheManager::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = CacheWarmUp::from_config(caches.clone(), &config)
        .unwrap()
        .run(&cancel)
        .await;
    assert!(matches!(result, Err(WarmUpError::Cancelled)));

    let router = router_for(&config, &caches);
    let (status, _) = get_json(&router, "/actuator/health/readiness").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn external_outage_refuses_traffic() {
    let external = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&external)
        .await;

    let mut config = fast_config(Preset::DependencyChecking);
    config.readiness.external_url = external.uri();
    let caches = CacheManager::new();
    caches
        .cache(&config.cache.name)
        .put(&config.cache.key, &config.cache.value);

    let router = router_for(&config, &caches);
    let (status, body) = get_json(&router, "/actuator/health/readiness").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["details"]["check"], "external");
}

#[tokio::test]
async fn custom_readiness_matches_readiness_group() {
    let external = mock_external().await;
    let mut config = fast_config(Preset::DependencyChecking);
    config.readiness.external_url = external.uri();
    let caches = CacheManager::new();
    let router = router_for(&config, &caches);

    let group = get_json(&router, "/actuator/health/readiness").await;
    let custom = get_json(&router, "/actuator/customReadiness").await;
    assert_eq!(group, custom);

    caches
        .cache(&config.cache.name)
        .put(&config.cache.key, &config.cache.value);

    let group = get_json(&router, "/actuator/health/readiness").await;
    let custom = get_json(&router, "/actuator/customReadiness").await;
    assert_eq!(group.0, StatusCode::OK);
    assert_eq!(group, custom);
}

#[tokio::test]
async fn simulated_preset_is_up_without_dependencies() {
    let config = fast_config(Preset::Simulated);
    let router = router_for(&config, &CacheManager::new());

    let (status, body) = get_json(&router, "/actuator/health/liveness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "UP" }));

    let (status, _) = get_json(&router, "/actuator/health/readiness").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn fixed_delay_liveness_holds_the_request() {
    let mut config = fast_config(Preset::Simulated);
    config.liveness.delay = "3s".to_string();
    let router = router_for(&config, &CacheManager::new());

    let start = tokio::time::Instant::now();
    let (status, _) = get_json(&router, "/actuator/health/liveness").await;
    assert_eq!(status, StatusCode::OK);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn certain_liveness_failure_reports_down() {
    let mut config = fast_config(Preset::DependencyChecking);
    config.liveness.failure_probability = 1.0;
    config.readiness.checks.clear();
    let router = router_for(&config, &CacheManager::new());

    let (status, body) = get_json(&router, "/actuator/health/liveness").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "DOWN");

    let (status, body) = get_json(&router, "/actuator/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["components"]["liveness"]["status"], "DOWN");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let config = fast_config(Preset::Simulated);
    let router = router_for(&config, &CacheManager::new());
    let (status, _) = get(&router, "/actuator/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
