//! Gateway router tests over the scripted fetcher.

mod common;

use common::{TEST_VERSION, TestWorker, entry_key, origin};

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use rifugio::infra::http::{GatewayState, build_router};
use rifugio::worker::NetworkFetcher;
use tower::ServiceExt;

const BODY_LIMIT: usize = 1024 * 1024;

async fn activated_router() -> (Router, TestWorker) {
    let harness = TestWorker::with_precache_available();
    harness.install_and_activate().await;
    let router = build_router(GatewayState {
        worker: Arc::clone(&harness.worker),
        fetcher: harness.fetcher.clone() as Arc<dyn NetworkFetcher>,
        clients: Arc::clone(&harness.clients),
        storage: Arc::clone(&harness.storage),
        origin: origin(),
    });
    (router, harness)
}

async fn body_bytes(response: axum::response::Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("collectable body")
}

#[tokio::test]
async fn a_navigation_is_served_from_the_network_and_cached() {
    let (router, harness) = activated_router().await;

    let request = Request::builder()
        .uri("/")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from("precached /"));

    assert!(harness.storage.open(TEST_VERSION).contains(&entry_key("/")));
    // The navigation registered a controlled client.
    assert_eq!(harness.clients.controlled_count(), 1);
}

#[tokio::test]
async fn offline_navigations_get_the_precached_offline_page() {
    let (router, harness) = activated_router().await;
    harness.fetcher.fail("/blog/post-1");

    let request = Request::builder()
        .uri("/blog/post-1")
        .header("sec-fetch-dest", "document")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from("precached /offline")
    );
}

#[tokio::test]
async fn offline_subresources_get_a_synthesized_404() {
    let (router, harness) = activated_router().await;
    harness.fetcher.fail("/img/x.png");

    let request = Request::builder()
        .uri("/img/x.png")
        .header("sec-fetch-dest", "image")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from("Resource not available offline")
    );
}

#[tokio::test]
async fn post_requests_are_forwarded_uncached() {
    let (router, harness) = activated_router().await;
    harness.fetcher.serve_ok("/comments", "created");

    let request = Request::builder()
        .method("POST")
        .uri("/comments")
        .body(Body::from("hello"))
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        harness.fetcher.forwarded_urls(),
        vec!["http://origin.test/comments".to_string()]
    );
    assert!(
        harness
            .storage
            .open(TEST_VERSION)
            .get(&entry_key("/comments"))
            .is_none()
    );
}

#[tokio::test]
async fn excluded_api_requests_are_forwarded_uncached() {
    let (router, harness) = activated_router().await;
    harness.fetcher.serve_ok("/api/search?q=x", "[]");

    let request = Request::builder()
        .uri("/api/search?q=x")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        harness.fetcher.forwarded_urls(),
        vec!["http://origin.test/api/search?q=x".to_string()]
    );
    assert!(
        harness
            .storage
            .open(TEST_VERSION)
            .get(&entry_key("/api/search?q=x"))
            .is_none()
    );
}

#[tokio::test]
async fn pass_through_network_failures_surface_as_bad_gateway() {
    let (router, harness) = activated_router().await;
    harness.fetcher.fail("/comments");

    let request = Request::builder()
        .method("POST")
        .uri("/comments")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn the_status_endpoint_reports_the_worker_snapshot() {
    let (router, _harness) = activated_router().await;

    let request = Request::builder()
        .uri("/_worker/status")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("gateway response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let status: serde_json::Value = serde_json::from_slice(&body).expect("json status");
    assert_eq!(status["state"], "activated");
    assert_eq!(status["cache_version"], TEST_VERSION);
    let namespaces = status["namespaces"].as_array().expect("namespaces array");
    assert_eq!(namespaces.len(), 1);
    assert_eq!(namespaces[0]["name"], TEST_VERSION);
    assert_eq!(namespaces[0]["entries"], 5);
}

#[tokio::test]
async fn push_injection_answers_no_content_for_valid_and_malformed_payloads() {
    let (router, _harness) = activated_router().await;

    let valid = Request::builder()
        .method("POST")
        .uri("/_worker/push")
        .body(Body::from(r#"{"title":"Hi","body":"There"}"#))
        .expect("request");
    let response = router
        .clone()
        .oneshot(valid)
        .await
        .expect("gateway response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let malformed = Request::builder()
        .method("POST")
        .uri("/_worker/push")
        .body(Body::from("not json"))
        .expect("request");
    let response = router
        .oneshot(malformed)
        .await
        .expect("gateway response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
