use crate::integration::init_tracing;
use crate::utils::{OFFER_A, connect_peer, create_test_service};

#[tokio::test]
async fn test_messages_from_one_sender_keep_their_order() {
    init_tracing();

    let service = create_test_service();
    let (peer_a, _task_a) = connect_peer(&service).await;
    let (mut peer_b, _task_b) = connect_peer(&service).await;

    let mut sent = vec![OFFER_A.to_string()];
    for i in 0..40 {
        sent.push(format!(
            r#"{{"type":3,"candidate":"candidate:{} 1 udp 1 10.0.0.1 {} typ host","sdpMLineIndex":0}}"#,
            i,
            5000 + i
        ));
    }
    for message in &sent {
        peer_a.send_text(message);
    }

    let mut received = Vec::new();
    while received.len() < sent.len() {
        match peer_b.recv().await {
            Some(message) => received.push(message),
            None => break,
        }
    }
    assert_eq!(received, sent);
}
