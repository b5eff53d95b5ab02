use std::time::Duration;

use dishy::decoder::decode_frame;
use dishy::ws::{connect, recv_frame};

// Integration probe: only runs when DISHY_WS is set to an agent WebSocket URL.
// Example: DISHY_WS=ws://127.0.0.1:3000/ws cargo test -p dishy --test ws_probe -- --nocapture
#[tokio::test]
async fn probe_ws_push() {
    let url = match std::env::var("DISHY_WS") {
        Ok(v) if !v.is_empty() => v,
        _ => {
            eprintln!("skipping ws_probe: set DISHY_WS=ws://host:port/ws to run this integration test");
            return;
        }
    };

    let mut ws = connect(&url).await.expect("connect ws");
    let frame = tokio::time::timeout(Duration::from_secs(10), recv_frame(&mut ws))
        .await
        .expect("data_update within timeout")
        .expect("text frame");
    let snap = decode_frame(&frame).expect("decodable").expect("data_update event");
    assert!(snap.pop_ping_latency_ms >= 0.0);
}
