//! Background sampler: periodically reads dish status, caches the encoded
//! `data_update` frame and pushes it to every connected socket.

use std::sync::atomic::Ordering;

use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::state::AppState;
use crate::types::Envelope;

/// Sample once, refresh the cache and broadcast. Returns the frame sent.
pub async fn sample_once(state: &AppState) -> Option<String> {
    let status = match state.dish.status() {
        Ok(s) => s,
        Err(e) => {
            warn!("status fetch failed: {e}");
            return None;
        }
    };
    let frame = serde_json::to_string(&status)
        .and_then(|encoded| serde_json::to_string(&Envelope::data_update(encoded)));
    let frame = match frame {
        Ok(f) => f,
        Err(e) => {
            warn!("status encode failed: {e}");
            return None;
        }
    };

    *state.last_json.write().await = frame.clone();
    // Err only means nobody is subscribed right now
    let receivers = state.updates.send(frame.clone()).unwrap_or(0);
    debug!(receivers, state = %status.state, "data_update pushed");
    Some(frame)
}

pub fn spawn_sampler(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // Idle while nobody is watching
            if state.client_count.load(Ordering::Relaxed) == 0 {
                tokio::select! {
                    _ = state.wake_sampler.notified() => {}
                    _ = sleep(period) => {}
                }
                continue;
            }
            sample_once(&state).await;
            sleep(period).await;
        }
    })
}
