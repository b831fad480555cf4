use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{
    ANSWER_B, OFFER_A, TestClient, TestServer, create_test_service, wait_for_connections,
};

#[tokio::test]
async fn test_offer_replay_and_answer_over_websockets() {
    init_tracing();

    let server = TestServer::start(create_test_service())
        .await
        .expect("Failed to start server");
    let url = server.ws_url();

    let mut peer_b = TestClient::connect(&url).await.expect("B failed to connect");
    let mut peer_a = TestClient::connect(&url).await.expect("A failed to connect");
    wait_for_connections(&server.service, 2).await;

    // A offers, B is already there
    peer_a.send(OFFER_A).await.expect("Send failed");
    assert_eq!(peer_b.recv().await.as_deref(), Some(OFFER_A));

    // C joins later and is handed the cached offer immediately
    let mut peer_c = TestClient::connect(&url).await.expect("C failed to connect");
    assert_eq!(peer_c.recv().await.as_deref(), Some(OFFER_A));
    wait_for_connections(&server.service, 3).await;

    // B answers: only A holds an offer
    peer_b.send(ANSWER_B).await.expect("Send failed");
    assert_eq!(peer_a.recv().await.as_deref(), Some(ANSWER_B));
    assert_eq!(peer_c.recv_within(Duration::from_millis(300)).await, None);
    assert_eq!(peer_b.recv_within(Duration::from_millis(100)).await, None);

    // A leaving takes its offer with it
    peer_a.close().await.expect("Failed to close A");
    wait_for_connections(&server.service, 2).await;
    assert_eq!(server.service.live_offer_count(), 0);

    peer_b.close().await.expect("Failed to close B");
    peer_c.close().await.expect("Failed to close C");
    server.shutdown().await.expect("Server did not shut down");
}
