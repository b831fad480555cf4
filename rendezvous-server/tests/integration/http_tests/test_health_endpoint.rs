use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use rendezvous_core::{ConnectionId, Payload};
use serde_json::Value;
use tokio::time::Instant;
use tower::ServiceExt;

use rendezvous_server::router;

use crate::utils::{OFFER_A, connect_peer, create_test_service};

async fn health(service: &rendezvous_server::SignalingService) -> Value {
    let response = router(service.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_reports_connections_and_offers() {
    let service = create_test_service();
    let (_peer, _task) = connect_peer(&service).await;
    service
        .offers()
        .put(ConnectionId::new(), Payload::from(OFFER_A), Instant::now());

    let report = health(&service).await;
    assert_eq!(report["status"], "ok");
    assert_eq!(report["connections"], 1);
    assert_eq!(report["live_offers"], 1);

    service.begin_shutdown();
    assert_eq!(health(&service).await["status"], "draining");
}
