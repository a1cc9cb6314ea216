use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use api::{router, AppState};
use common::TradeStore;
use ingest::Ingestor;
use signals::SignalThresholds;
use store::MemoryTradeStore;

const TOKEN: &str = "test-admin-token";

const ABC_CSV: &str = "\
Date,Symbol,Sector,Volume,Value,Price
2024-04-01,ABC,Banks,1000,10000,10
2024-04-02,ABC,Banks,1000,10500,10.5
2024-04-03,ABC,Banks,1000,11000,11
2024-04-04,ABC,Banks,1000,11500,11.5
2024-04-05,ABC,Banks,1000,12000,12
2024-04-05,XYZ,,50,100,2
";

fn app() -> (Router, Arc<MemoryTradeStore>) {
    let store = Arc::new(MemoryTradeStore::new());
    let state = AppState {
        store: store.clone(),
        thresholds: Arc::new(SignalThresholds::default()),
        ingestor: Ingestor::default(),
        upload_dir: None,
        admin_token: TOKEN.to_string(),
    };
    (router(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn upload(app: &Router, csv: &str) -> (StatusCode, String) {
    let request = Request::post("/api/upload?filename=daily.csv")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body).unwrap())
}

#[tokio::test]
async fn upload_then_query() {
    let (app, store) = app();

    let (status, text) = upload(&app, ABC_CSV).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Uploaded: daily.csv\nInserted rows: 6");
    assert_eq!(store.record_count().await.unwrap(), 6);

    let (status, report) = get_json(&app, "/api/analytics?symbol=xyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["symbols"], serde_json::json!(["ABC", "XYZ"]));
    assert_eq!(report["kpis"]["distinct_symbols"], 1);
    assert_eq!(report["sectors"][0]["sector"], "(UNKNOWN)");

    let (status, calc) = get_json(&app, "/api/calc?symbol=abc&amt=1000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calc["price"], 12.0);
    assert_eq!(calc["shares"], 83.33);
    assert_eq!(calc["duration"], 30);
    assert_eq!(calc["trade_type"], "buy");

    // five daily prices climbing 10 -> 12 compound over 30 trading days
    let r = calc["avg_daily_return"].as_f64().unwrap();
    assert!((r - 0.046638).abs() < 1e-6, "avg_daily_return {r}");
    let projected = calc["projected_price"].as_f64().unwrap();
    assert!((projected - 12.0 * (1.0 + r).powi(30)).abs() < 0.01, "projected_price {projected}");
    assert!((projected - 47.106).abs() < 0.01);
    assert!((calc["projected_value"].as_f64().unwrap() - 3925.34).abs() < 0.01);
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let (app, _) = app();
    let (status, text) = upload(&app, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Empty CSV.");
}

#[tokio::test]
async fn calc_errors_map_to_status_codes() {
    let (app, _) = app();
    upload(&app, ABC_CSV).await;

    let (status, body) = get_json(&app, "/api/calc?symbol=&amt=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provide a valid symbol and positive amount.");

    let (status, body) = get_json(&app, "/api/calc?symbol=nope&amt=10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No usable price found for NOPE");

    let (status, _) = get_json(&app, "/api/calc?symbol=abc&amt=10&duration=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_date_filter_is_bad_request() {
    let (app, _) = app();
    let (status, body) = get_json(&app, "/api/analytics?start=whenever").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start"));
}

#[tokio::test]
async fn rebuild_requires_token() {
    let (app, store) = app();
    upload(&app, ABC_CSV).await;

    let (status, _) = send(&app, Request::post("/api/rebuild").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(store.record_count().await.unwrap(), 6);

    let request = Request::post("/api/rebuild")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.record_count().await.unwrap(), 0);

    let (status, health) = get_json(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["records"], 0);
}
