//! Types that mirror the agent's JSON schema.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const EVENT_DATA_UPDATE: &str = "data_update";
pub const EVENT_DISHY: &str = "dishy_event";

/// One decoded `data_update` payload. Only the three throughput/latency
/// figures are required; everything else is optional on the wire.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub pop_ping_latency_ms: f64,
    pub downlink_throughput_bps: f64,
    pub uplink_throughput_bps: f64,
    #[serde(default)]
    pub power_usage_watts: Option<f64>,
    #[serde(default)]
    pub fraction_obstructed: Option<f64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts: BTreeMap<String, bool>,

    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_secs")]
    pub uptime: Option<u64>,
}

// `null` reads as the empty value
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

// Whole or fractional seconds; negative and non-finite values read as absent
fn lenient_secs<'de, D>(d: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(d)?;
    Ok(secs.filter(|s| s.is_finite() && *s >= 0.0).map(|s| s as u64))
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InitialData {
    pub dishy_model: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Fire-and-forget triggers sent as `dishy_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reboot,
    Stow,
    Unstow,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Reboot => "reboot",
            Command::Stow => "stow",
            Command::Unstow => "unstow",
        }
    }

    pub fn envelope(self) -> Envelope {
        Envelope {
            event: EVENT_DISHY.into(),
            data: serde_json::Value::String(self.as_str().into()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
