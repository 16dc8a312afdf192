//! End-to-end campaign run against a local stand-in for the segmentation,
//! shortener and SMS services.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use launch_channels::tracking::identifier_from_link;
use launch_channels::{CampaignDispatcher, CampaignRequest};
use launch_core::types::Wing;
use launch_core::{LaunchConfig, LaunchError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

const REJECTED_PHONE: &str = "+254700000002";

#[derive(Clone, Default)]
struct Upstream {
    contacts: Arc<Mutex<Value>>,
    segment_status: Arc<Mutex<Option<StatusCode>>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    shorten_requests: Arc<Mutex<Vec<Value>>>,
    sms_requests: Arc<Mutex<Vec<(Value, Option<String>)>>>,
}

async fn marketing_data(
    State(state): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.queries.lock().unwrap().push(params);
    if let Some(status) = *state.segment_status.lock().unwrap() {
        return (status, Json(json!({"error": "unavailable"})));
    }
    let contacts = state.contacts.lock().unwrap().clone();
    (StatusCode::OK, Json(contacts))
}

async fn short_links(State(state): State<Upstream>, Json(body): Json<Value>) -> Json<Value> {
    let mut requests = state.shorten_requests.lock().unwrap();
    requests.push(body);
    Json(json!({"shortLink": format!("https://bwl.page.link/{}", requests.len())}))
}

async fn send_marketing_sms(
    State(state): State<Upstream>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let rejected = body["to"][0] == REJECTED_PHONE;
    state.sms_requests.lock().unwrap().push((body, auth));
    if rejected {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "invalid number"})))
    } else {
        (StatusCode::OK, Json(json!({"status": "sent"})))
    }
}

async fn start_upstream(state: Upstream) -> SocketAddr {
    let app = Router::new()
        .route("/marketing_data", get(marketing_data))
        .route("/shortLinks", post(short_links))
        .route("/send_marketing_sms", post(send_marketing_sms))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr) -> LaunchConfig {
    let base = format!("http://{addr}/");
    LaunchConfig {
        base_url: base.clone(),
        edi_base_url: base.clone(),
        tracking_url_b: "https://bewell.example/b".into(),
        firebase_web_api_key: "test-key".into(),
        android_package_name: "com.savannah.bewell".into(),
        ios_bundle_id: "com.savannah.bewell.ios".into(),
        domain_uri_prefix: "https://bwl.page.link".into(),
        firebase_dynamic_link_url: format!("{base}shortLinks?key="),
        sms_auth_token: Some("\"token-123\"".into()),
        shortener_throttle_ms: 0,
        progress_interval: 100,
        http_timeout_secs: 5,
        redirect: Default::default(),
    }
}

fn contacts() -> Value {
    json!([
        {"phone": "+254700000001", "firstname": "Jane", "payor": "APA", "email": "jane@users.bewell.co.ke"},
        {"phone": REJECTED_PHONE, "first_name": "John", "payor": "APA", "email": "john@users.bewell.co.ke"},
        {"phone": "+254700000003", "firstname": "Akinyi", "payor": "Jubilee", "email": "akinyi@users.bewell.co.ke"},
    ])
}

#[tokio::test]
async fn test_campaign_run_over_http() {
    let upstream = Upstream::default();
    *upstream.contacts.lock().unwrap() = contacts();
    let addr = start_upstream(upstream.clone()).await;
    let config = config_for(addr);

    let dispatcher = CampaignDispatcher::from_config(&config).unwrap();
    let request = CampaignRequest::new("APA", Wing::A, &config.tracking_url_b);
    let report = dispatcher.run(&request).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.aborted.is_none());

    let queries = upstream.queries.lock().unwrap();
    assert_eq!(queries[0].get("segment").map(String::as_str), Some("APA"));
    assert_eq!(queries[0].get("wing").map(String::as_str), Some("WING A"));

    let shortened = upstream.shorten_requests.lock().unwrap();
    assert_eq!(shortened.len(), 3);
    let first_link = shortened[0]["dynamicLinkInfo"]["link"].as_str().unwrap();
    assert_eq!(
        identifier_from_link(first_link).unwrap(),
        "jane@users.bewell.co.ke"
    );
    assert_eq!(shortened[0]["suffix"]["option"], "SHORT");

    let sms = upstream.sms_requests.lock().unwrap();
    let phones: Vec<&str> = sms.iter().map(|(b, _)| b["to"][0].as_str().unwrap()).collect();
    assert_eq!(phones, vec!["+254700000001", REJECTED_PHONE, "+254700000003"]);
    let (first, auth) = &sms[0];
    assert_eq!(first["sender"], "BEWELL");
    assert_eq!(first["segment"], "APA");
    assert_eq!(auth.as_deref(), Some("token-123"));
    let message = first["message"].as_str().unwrap();
    assert!(message.contains("link your APA medical cover"));
    assert!(message.contains("https://bwl.page.link/1"));
    assert!(sms[2].0["message"].as_str().unwrap().contains("your Jubilee medical cover"));
}

#[tokio::test]
async fn test_null_segment_is_nothing_to_send() {
    let upstream = Upstream::default();
    *upstream.contacts.lock().unwrap() = Value::Null;
    let addr = start_upstream(upstream.clone()).await;

    let config = config_for(addr);
    let report = CampaignDispatcher::from_config(&config)
        .unwrap()
        .run(&CampaignRequest::new("APA", Wing::B, &config.tracking_url_b))
        .await
        .unwrap();

    assert_eq!(report.total, 0);
    assert!(upstream.shorten_requests.lock().unwrap().is_empty());
    assert!(upstream.sms_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_segment_service_error_fails_run() {
    let upstream = Upstream::default();
    *upstream.segment_status.lock().unwrap() = Some(StatusCode::BAD_GATEWAY);
    let addr = start_upstream(upstream.clone()).await;

    let config = config_for(addr);
    let err = CampaignDispatcher::from_config(&config)
        .unwrap()
        .run(&CampaignRequest::new("APA", Wing::A, &config.tracking_url_b))
        .await
        .unwrap_err();

    match err {
        LaunchError::UpstreamUnavailable { service, reason } => {
            assert_eq!(service, "segment data");
            assert!(reason.contains("502"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(upstream.sms_requests.lock().unwrap().is_empty());
}
