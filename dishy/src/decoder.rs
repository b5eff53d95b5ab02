//! Streaming decoder: one `data_update` frame in, one fan-out record out.
//! Holds no state between ticks.

use chrono::Local;

use crate::error::DashError;
use crate::history::LaneId;
use crate::types::{Envelope, Snapshot, EVENT_DATA_UPDATE};

/// Fixed fan-out order.
pub const LANE_ORDER: [LaneId; 4] = [
    LaneId::Latency,
    LaneId::Throughput,
    LaneId::Power,
    LaneId::Obstruction,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub lane: LaneId,
    pub values: Vec<f64>,
}

/// Everything one snapshot contributes to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOut {
    pub label: String,
    pub points: Vec<Point>,
    pub state: Option<String>,
    /// Active alert names, sorted. Replaces the previous tick's set.
    pub alerts: Vec<String>,
    pub software_version: Option<String>,
    pub uptime: Option<u64>,
}

/// Presentation label taken from the local clock at receipt.
pub fn time_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Decode the encoded snapshot carried by a `data_update` event.
pub fn decode(payload: &str) -> Result<Snapshot, DashError> {
    Ok(serde_json::from_str(payload)?)
}

/// Decode a whole text frame. Frames for other events yield `Ok(None)`.
pub fn decode_frame(frame: &str) -> Result<Option<Snapshot>, DashError> {
    let env: Envelope = serde_json::from_str(frame)?;
    if env.event != EVENT_DATA_UPDATE {
        return Ok(None);
    }
    let snap = match env.data {
        serde_json::Value::String(s) => decode(&s)?,
        v @ serde_json::Value::Object(_) => serde_json::from_value(v)?,
        other => {
            return Err(DashError::MalformedPayload(format!(
                "data_update carries {other}"
            )))
        }
    };
    Ok(Some(snap))
}

/// Map snapshot fields onto the registered lanes, in [`LANE_ORDER`].
/// Optional fields that are absent produce no point for their lane.
pub fn fan_out(snap: &Snapshot, label: String, lanes: &[LaneId]) -> FanOut {
    let mut points = Vec::with_capacity(lanes.len());
    for lane in LANE_ORDER.into_iter().filter(|l| lanes.contains(l)) {
        let values = match lane {
            LaneId::Latency => Some(vec![snap.pop_ping_latency_ms]),
            LaneId::Throughput => Some(vec![
                snap.downlink_throughput_bps / 1_000_000.0,
                snap.uplink_throughput_bps / 1_000_000.0,
            ]),
            LaneId::Power => snap.power_usage_watts.map(|w| vec![w]),
            LaneId::Obstruction => snap.fraction_obstructed.map(|f| vec![f * 100.0]),
        };
        if let Some(values) = values {
            points.push(Point { lane, values });
        }
    }

    let alerts = snap
        .alerts
        .iter()
        .filter(|&(_, &active)| active)
        .map(|(name, _)| name.clone())
        .collect();

    FanOut {
        label,
        points,
        state: snap.state.clone(),
        alerts,
        software_version: snap.software_version.clone(),
        uptime: snap.uptime,
    }
}
