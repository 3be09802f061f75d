//! End-to-end tests of the launcher HTTP API against in-memory backends

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use mochi_core::domain::artifact::{ArtifactKey, MarketDataKeys};
use mochi_core::domain::group_tag::GroupTag;
use mochi_launcher::api::create_router;
use mochi_launcher::backend::{InMemoryArtifactStore, InMemoryBatchBackend};
use mochi_launcher::config::LauncherConfig;
use mochi_launcher::service::PipelineLauncher;
use mochi_launcher::state::AppState;
use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

fn config() -> LauncherConfig {
    let env: HashMap<&str, &str> = [
        ("RAW_BUCKET_NAME", "raw"),
        ("PREPARED_BUCKET_NAME", "prepared"),
        ("TRADES_BUCKET_NAME", "trades"),
        ("TRADER_BUCKET_NAME", "traders"),
        ("MOCHI_AGGREGATION_BUCKET", "aggregation"),
        ("MOCHI_AGGREGATION_BUCKET_STAGING", "aggregation-staging"),
        ("MOCHI_GRAPHS_BUCKET", "graphs"),
        ("MOCHI_PROD_TRADE_EXTRACTS", "extracts"),
        ("TICKER_META_BUCKET_NAME", "ticker-meta"),
        ("BACKTEST_PARAMS_BUCKET_NAME", "params"),
        ("POLYGON_API_KEY", "pk_test"),
        ("BACKEND_MODE", "memory"),
    ]
    .into_iter()
    .collect();

    LauncherConfig::from_lookup(|name| env.get(name).map(|v| v.to_string())).unwrap()
}

fn app(batch: &InMemoryBatchBackend, store: &InMemoryArtifactStore) -> Router {
    let launcher = PipelineLauncher::new(
        Arc::new(config()),
        Arc::new(batch.clone()),
        Arc::new(store.clone()),
    );
    create_router(AppState::new(launcher))
}

fn store_with_data(ticker: &str) -> InMemoryArtifactStore {
    let keys = MarketDataKeys::for_ticker(ticker);
    InMemoryArtifactStore::new()
        .with_object("raw", &keys.minute)
        .with_object("raw", &keys.hour)
        .with_object("raw", &keys.day)
}

fn aapl_body() -> Value {
    json!({
        "ticker": "AAPL",
        "from_date": "2024-01-01",
        "to_date": "2024-06-01",
        "shortATRPeriod": 5,
        "longATRPeriod": 20,
        "alpha": 0.1
    })
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_backtest_with_existing_data() {
    let batch = InMemoryBatchBackend::new();
    let store = store_with_data("AAPL");

    let (status, body) = post(app(&batch, &store), "/backtest", aapl_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully submitted job chain for AAPL");
    assert_eq!(body["polygonJobId"], "skipped");

    let tag_shape = Regex::new(r"^[a-z]+-[a-z]+--\d{14}$").unwrap();
    let group_tag = body["groupTag"].as_str().unwrap();
    assert!(tag_shape.is_match(group_tag), "bad tag {}", group_tag);

    let definitions: Vec<String> = batch
        .submissions()
        .into_iter()
        .map(|s| s.node.definition)
        .collect();
    assert_eq!(
        definitions,
        vec![
            "trade-data-enhancer",
            "ticker-meta",
            "mochi-trades",
            "mochi-trades",
            "r-graphs",
            "r-graphs",
            "r-graphs",
            "trade-extract",
            "py-trade-lens",
            "trade-summary",
        ]
    );

    let submissions = batch.submissions();
    assert_eq!(body["enhanceJobId"], submissions[0].job_id.as_str());
    assert_eq!(body["tradesJobId"], submissions[2].job_id.as_str());

    let tag: GroupTag = serde_json::from_value(body["groupTag"].clone()).unwrap();
    let record = store
        .get_json("params", &ArtifactKey::parameter_record(&tag))
        .unwrap();
    assert_eq!(record["alpha"], 0.1);
}

#[tokio::test]
async fn test_backtest_with_proxy_envelope() {
    let batch = InMemoryBatchBackend::new();
    let store = InMemoryArtifactStore::new();
    let envelope = json!({ "body": aapl_body().to_string() });

    let (status, body) = post(app(&batch, &store), "/backtest", envelope).await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["polygonJobId"], "skipped");
    assert_eq!(batch.submissions().len(), 11);
    assert_eq!(batch.submissions()[0].node.definition, "polygon-extract");
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let batch = InMemoryBatchBackend::new();
    let store = InMemoryArtifactStore::new();
    let mut request = aapl_body();
    request.as_object_mut().unwrap().remove("longATRPeriod");

    let (status, body) = post(app(&batch, &store), "/backtest", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("longATRPeriod"));
    assert!(body.get("stage").is_none());
    assert!(batch.submissions().is_empty());
}

#[tokio::test]
async fn test_path_like_ticker_is_bad_request() {
    let batch = InMemoryBatchBackend::new();
    let store = InMemoryArtifactStore::new();

    for ticker in ["../../params/x", "AAPL#frag", "AAPL?q=1"] {
        let mut request = aapl_body();
        request["ticker"] = json!(ticker);

        let (status, body) = post(app(&batch, &store), "/backtest", request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "ticker {}", ticker);
        assert!(body["error"].as_str().unwrap().contains("ticker"));
    }
    assert_eq!(store.probe_count(), 0);
    assert!(batch.submissions().is_empty());
}

#[tokio::test]
async fn test_enhance_rejection_is_bad_gateway() {
    let batch = InMemoryBatchBackend::new().reject_definition("trade-data-enhancer");
    let store = store_with_data("AAPL");

    let (status, body) = post(app(&batch, &store), "/backtest", aapl_body()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["stage"], "trade-data-enhancer");
    assert!(body["groupTag"].is_string());
    assert!(body.get("submittedJobs").is_none());
    assert!(batch.submissions().is_empty());
}

#[tokio::test]
async fn test_graph_rejection_reports_partial_chain() {
    let batch = InMemoryBatchBackend::new().reject_definition("r-graphs");
    let store = store_with_data("AAPL");

    let (status, body) = post(app(&batch, &store), "/backtest", aapl_body()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["stage"], "graph-years");
    let tag = body["groupTag"].as_str().unwrap();
    assert!(Regex::new(r"^[a-z]+-[a-z]+--\d{14}$").unwrap().is_match(tag));

    let reported: Vec<(String, String)> = body["submittedJobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| {
            (
                j["stage"].as_str().unwrap().to_string(),
                j["jobId"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let accepted: Vec<String> = batch
        .submissions()
        .into_iter()
        .map(|s| s.job_id.to_string())
        .collect();
    assert_eq!(
        reported.iter().map(|(stage, _)| stage.as_str()).collect::<Vec<_>>(),
        vec!["trade-data-enhancer", "ticker-meta", "trade", "aggregation"]
    );
    assert_eq!(
        reported.into_iter().map(|(_, id)| id).collect::<Vec<_>>(),
        accepted
    );
}

#[tokio::test]
async fn test_parameter_write_failure_still_succeeds() {
    let batch = InMemoryBatchBackend::new();
    let store = store_with_data("AAPL").failing_writes();

    let (status, body) = post(app(&batch, &store), "/backtest", aapl_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["enhanceJobId"].is_string());
    assert!(body["tradesJobId"].is_string());
    assert_eq!(batch.submissions().len(), 10);
}

#[tokio::test]
async fn test_echo() {
    let batch = InMemoryBatchBackend::new();
    let store = InMemoryArtifactStore::new();

    let (status, body) = post(app(&batch, &store), "/echo", json!({ "ticker": "TSLA" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Processing ticker: TSLA");
    assert_eq!(body["ticker"], "TSLA");
    assert!(batch.submissions().is_empty());
}

#[tokio::test]
async fn test_health() {
    let batch = InMemoryBatchBackend::new();
    let store = InMemoryArtifactStore::new();

    let response = app(&batch, &store)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}
