//! Error taxonomy for the dashboard pipeline.

use thiserror::Error;

use crate::history::LaneId;

#[derive(Debug, Error)]
pub enum DashError {
    /// Undecodable snapshot; the tick is dropped.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// Append to a lane no chart registered. A wiring bug.
    #[error("unknown lane '{0}'")]
    UnknownLane(LaneId),
    #[error("lane '{lane}' takes {expected} values per point, got {got}")]
    ArityMismatch {
        lane: LaneId,
        expected: usize,
        got: usize,
    },
    #[error("lane '{0}' is bound to more than one chart")]
    DuplicateLane(LaneId),
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),
}

impl From<serde_json::Error> for DashError {
    fn from(e: serde_json::Error) -> Self {
        DashError::MalformedPayload(e.to_string())
    }
}
