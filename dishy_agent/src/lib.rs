//! dishy_agent: samples a dish terminal and pushes status snapshots to
//! dashboards over WebSocket.

pub mod dish;
pub mod http;
pub mod obstruction;
pub mod sampler;
pub mod state;
pub mod types;
pub mod ws;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/get_inital_data", get(http::initial_data))
        .route("/obstruction_map_image", get(http::obstruction_map_image))
        .with_state(state)
}
