//! Plain HTTP resources next to the socket: model lookup and obstruction map.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::obstruction::render_svg;
use crate::state::AppState;
use crate::types::InitialData;

pub async fn initial_data(State(state): State<AppState>) -> Response {
    match state.dish.status() {
        Ok(s) => Json(InitialData::from_hardware_version(&s.hardware_version)).into_response(),
        Err(e) => {
            warn!("initial data: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}

// Query string (cache buster) is ignored; every request renders fresh.
pub async fn obstruction_map_image(State(state): State<AppState>) -> Response {
    let grid = match state.dish.obstruction_map() {
        Ok(g) => g,
        Err(e) => {
            warn!("obstruction map: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };
    match render_svg(&grid, &state.svg) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => {
            warn!("obstruction map: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
