mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{response, MockTransport, LISTING_BODY};
use serde_json::{json, Value};
use tower::ServiceExt;
use websrv_scan_rs::flagged::default_flagged_versions;
use websrv_scan_rs::server::{router, AppState};

fn app() -> axum::Router {
    let transport = MockTransport::new()
        .respond(
            "http://10.0.0.2",
            response(200, Some("Microsoft-IIS/7.0"), LISTING_BODY),
        )
        .respond("http://10.0.0.1", response(200, Some("nginx/1.18.0"), ""));
    router(AppState::new(Arc::new(transport), default_flagged_versions()))
}

async fn post_scan(body: Value) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri("/scan")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn scan_returns_ordered_result_map() {
    let (status, text) = post_scan(json!({ "ips": ["10.0.0.2", "10.0.0.1", "nope"] })).await;
    assert_eq!(status, StatusCode::OK);

    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["10.0.0.2"]["WebServerSoftware"], "iis");
    assert_eq!(v["10.0.0.2"]["RootListing"], "available");
    assert_eq!(v["10.0.0.1"]["WebServerSoftware"], "other");
    assert_eq!(v["nope"]["Status"], "bad_address");
    assert_eq!(v["nope"]["ErrorMsg"], Value::Null);

    let a = text.find("10.0.0.2").unwrap();
    let b = text.find("10.0.0.1").unwrap();
    let c = text.find("nope").unwrap();
    assert!(a < b && b < c);
}

#[tokio::test]
async fn request_options_are_applied() {
    let (status, text) = post_scan(json!({
        "ips": ["10.0.0.2"],
        "scan_root": false,
        "preserve_ips": false,
        "log_level": "DEBUG"
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["http://10.0.0.2"]["RootListing"], "disabled");
    assert_eq!(v["http://10.0.0.2"]["Status"], "good");
}

#[tokio::test]
async fn empty_ip_list_is_an_empty_map() {
    let (status, text) = post_scan(json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "{}");
}

#[tokio::test]
async fn nothing_to_scan_is_bad_request() {
    let (status, text) = post_scan(json!({
        "ips": ["10.0.0.1"],
        "scan_software": false,
        "scan_root": false
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let v: Value = serde_json::from_str(&text).unwrap();
    assert!(v["error"].as_str().unwrap().contains("nothing to scan"));
}
