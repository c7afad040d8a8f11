mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use marketplace_frontend::services::metrics::init_metrics;
use tower::util::ServiceExt;

use common::{public_dir, test_router};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// The recorder is process-global, so everything lives in one test.
#[tokio::test]
async fn requests_are_counted_and_exported() {
    init_metrics().unwrap();
    init_metrics().unwrap();

    let public = public_dir();
    let app = test_router(&public);

    let health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("http_requests_total"), "{body}");
    assert!(body.contains("http_request_duration_seconds"), "{body}");
    assert!(body.contains(r#"path="/health""#), "{body}");
}
