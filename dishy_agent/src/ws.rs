//! WebSocket upgrade and per-connection handler: pushes `data_update`
//! frames, accepts `dishy_event` commands.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::sampler::sample_once;
use crate::state::AppState;
use crate::types::{Command, Envelope, EVENT_DISHY};

use std::sync::atomic::Ordering;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Bump client count on connect and wake the sampler.
    state.client_count.fetch_add(1, Ordering::Relaxed);
    state.wake_sampler.notify_waiters();

    // Ensure we decrement on disconnect (drop).
    struct ClientGuard(AppState);
    impl Drop for ClientGuard {
        fn drop(&mut self) {
            self.0.client_count.fetch_sub(1, Ordering::Relaxed);
        }
    }
    let _guard = ClientGuard(state.clone());

    let mut updates = state.updates.subscribe();

    // Serve the cached frame right away; if empty (cold start), sample once.
    let cached = state.last_json.read().await.clone();
    let first = if cached.is_empty() {
        sample_once(&state).await
    } else {
        Some(cached)
    };
    if let Some(frame) = first {
        if socket.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => handle_text(&state, &text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("socket read failed: {e}");
                    break;
                }
            },
            frame = updates.recv() => match frame {
                Ok(frame) => {
                    if socket.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => debug!("client lagged, skipped {n} frames"),
                Err(RecvError::Closed) => break,
            },
        }
    }
}

fn handle_text(state: &AppState, text: &str) {
    let env: Envelope = match serde_json::from_str(text) {
        Ok(env) => env,
        Err(e) => {
            warn!("ignoring undecodable frame: {e}");
            return;
        }
    };
    if env.event != EVENT_DISHY {
        debug!(event = %env.event, "ignoring event");
        return;
    }
    let cmd = match env.data.as_str().map(str::parse::<Command>) {
        Some(Ok(cmd)) => cmd,
        Some(Err(e)) => {
            warn!("{e}");
            return;
        }
        None => {
            warn!("dishy_event without a command name");
            return;
        }
    };
    match state.dish.dispatch(cmd) {
        Ok(()) => info!(%cmd, "dish command sent"),
        Err(e) => warn!(%cmd, "dish command failed: {e}"),
    }
}
