//! Data types sent to the client over WebSocket.
//! Keep this module minimal and stable: it defines the wire format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const EVENT_DATA_UPDATE: &str = "data_update";
pub const EVENT_DISHY: &str = "dishy_event";

/// One status sample of the dish, field names as the dashboard expects them.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DishStatus {
    pub id: String,
    pub hardware_version: String,
    pub software_version: String,
    pub state: String,
    pub uptime: u64,
    pub snr_above_noise_floor: bool,
    pub pop_ping_drop_rate: f64,
    pub pop_ping_latency_ms: f64,
    pub downlink_throughput_bps: f64,
    pub uplink_throughput_bps: f64,
    pub power_usage_watts: f64,
    pub fraction_obstructed: f64,
    pub currently_obstructed: bool,
    pub seconds_obstructed: Option<f64>,
    pub direction_azimuth: f64,
    pub direction_elevation: f64,
    // alert name -> active
    pub alerts: BTreeMap<String, bool>,
}

/// Payload of `/get_inital_data`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InitialData {
    pub dishy_model: String,
}

impl InitialData {
    pub fn from_hardware_version(hw: &str) -> Self {
        let dishy_model = match hw {
            "rev3_proto2" => "Standard Actuated".to_string(),
            other => other.to_string(),
        };
        Self { dishy_model }
    }
}

/// `{"event": ..., "data": ...}` text frame.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// `data_update` carries the snapshot as an encoded JSON string.
    pub fn data_update(encoded: String) -> Self {
        Self {
            event: EVENT_DATA_UPDATE.into(),
            data: serde_json::Value::String(encoded),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reboot,
    Stow,
    Unstow,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reboot" => Ok(Command::Reboot),
            "stow" => Ok(Command::Stow),
            "unstow" => Ok(Command::Unstow),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Reboot => "reboot",
            Command::Stow => "stow",
            Command::Unstow => "unstow",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_maps_known_revision() {
        assert_eq!(
            InitialData::from_hardware_version("rev3_proto2").dishy_model,
            "Standard Actuated"
        );
        assert_eq!(
            InitialData::from_hardware_version("rev4_prod1").dishy_model,
            "rev4_prod1"
        );
    }

    #[test]
    fn data_update_wraps_encoded_string() {
        let env = Envelope::data_update("{\"a\":1}".into());
        let js = serde_json::to_string(&env).unwrap();
        assert_eq!(js, r#"{"event":"data_update","data":"{\"a\":1}"}"#);
    }

    #[test]
    fn commands_parse_only_known_names() {
        assert_eq!("stow".parse::<Command>(), Ok(Command::Stow));
        assert!("explode".parse::<Command>().is_err());
        assert_eq!(Command::Unstow.to_string(), "unstow");
    }
}
