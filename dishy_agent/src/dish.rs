//! Dish backends. The agent talks to the terminal only through [`Dish`].

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::Mutex;
use std::time::Instant;

use thiserror::Error;

use crate::types::{Command, DishStatus};

#[derive(Debug, Error)]
pub enum DishError {
    #[error("dish unavailable: {0}")]
    Unavailable(String),
    #[error("dish rejected {0}")]
    Rejected(Command),
}

pub trait Dish: Send + Sync {
    fn status(&self) -> Result<DishStatus, DishError>;

    /// SNR grid, row-major. 1.0 = clear sky, 0.0 = obstructed, negative = no data.
    fn obstruction_map(&self) -> Result<Vec<Vec<f64>>, DishError>;

    fn reboot(&self) -> Result<(), DishError>;

    fn set_stow(&self, unstow: bool) -> Result<(), DishError>;

    fn dispatch(&self, cmd: Command) -> Result<(), DishError> {
        match cmd {
            Command::Reboot => self.reboot(),
            Command::Stow => self.set_stow(false),
            Command::Unstow => self.set_stow(true),
        }
    }
}

const MAP_SIZE: usize = 123;
const BOOT_TICKS: u64 = 10;

struct SimState {
    tick: u64,
    stowed: bool,
    boot_until: Option<u64>,
    booted_at: Instant,
}

/// Deterministic stand-in for a real terminal, used by `--demo` and tests.
pub struct SimulatedDish {
    hardware_version: String,
    state: Mutex<SimState>,
}

impl SimulatedDish {
    pub fn new(hardware_version: impl Into<String>) -> Self {
        Self {
            hardware_version: hardware_version.into(),
            state: Mutex::new(SimState {
                tick: 0,
                stowed: false,
                boot_until: None,
                booted_at: Instant::now(),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SimState>, DishError> {
        self.state
            .lock()
            .map_err(|_| DishError::Unavailable("simulator state poisoned".into()))
    }
}

impl Default for SimulatedDish {
    fn default() -> Self {
        Self::new("rev3_proto2")
    }
}

impl Dish for SimulatedDish {
    fn status(&self) -> Result<DishStatus, DishError> {
        let mut st = self.lock()?;
        st.tick += 1;
        let t = st.tick as f64;

        let booting = st.boot_until.is_some_and(|until| st.tick < until);
        if !booting {
            st.boot_until = None;
        }
        let state = if booting {
            "BOOTING"
        } else if st.stowed {
            "STOWED"
        } else {
            "CONNECTED"
        };
        let online = state == "CONNECTED";

        // Latency spikes every 37 samples
        let spike = if st.tick % 37 == 0 { 40.0 } else { 0.0 };
        let latency = 32.0 + 8.0 * (t / 7.0).sin() + spike;
        let (down, up) = if online {
            (
                60e6 + 40e6 * (t / 11.0).sin().abs(),
                8e6 + 4e6 * (t / 5.0).cos(),
            )
        } else {
            (0.0, 0.0)
        };
        let fraction_obstructed = if online {
            (0.02 + 0.015 * (t / 29.0).sin()).max(0.0)
        } else {
            0.0
        };
        let power = if booting { 20.0 } else { 55.0 + 10.0 * (t / 13.0).sin() };

        let mut alerts = BTreeMap::new();
        alerts.insert("motors_stuck".to_string(), false);
        alerts.insert("thermal_throttle".to_string(), (st.tick / 50) % 4 == 3);
        alerts.insert("thermal_shutdown".to_string(), false);
        alerts.insert("mast_not_near_vertical".to_string(), false);
        alerts.insert("unexpected_location".to_string(), false);
        alerts.insert("slow_ethernet_speeds".to_string(), st.tick % 97 < 5);
        alerts.insert("is_heating".to_string(), power > 63.0);

        Ok(DishStatus {
            id: "ut01000000-00000000-00c0ffee".into(),
            hardware_version: self.hardware_version.clone(),
            software_version: "sim-2024.10.01".into(),
            state: state.into(),
            uptime: st.booted_at.elapsed().as_secs(),
            snr_above_noise_floor: online,
            pop_ping_drop_rate: if online { 0.0 } else { 1.0 },
            pop_ping_latency_ms: latency,
            downlink_throughput_bps: down,
            uplink_throughput_bps: up,
            power_usage_watts: power,
            fraction_obstructed,
            currently_obstructed: fraction_obstructed > 0.03,
            seconds_obstructed: online.then_some(fraction_obstructed * 43_200.0),
            direction_azimuth: 12.5,
            direction_elevation: 64.0,
            alerts,
        })
    }

    fn obstruction_map(&self) -> Result<Vec<Vec<f64>>, DishError> {
        let c = (MAP_SIZE / 2) as f64;
        let mut rows = Vec::with_capacity(MAP_SIZE);
        for y in 0..MAP_SIZE {
            let mut row = Vec::with_capacity(MAP_SIZE);
            for x in 0..MAP_SIZE {
                let dx = x as f64 - c;
                let dy = c - y as f64;
                let r = (dx * dx + dy * dy).sqrt() / c;
                if r > 1.0 {
                    row.push(-1.0);
                    continue;
                }
                // Azimuth clockwise from north, degrees
                let az = (dx.atan2(dy) * 180.0 / PI + 360.0) % 360.0;
                // A tree line to the north-east, low on the horizon
                let v = if (30.0..55.0).contains(&az) && r > 0.7 {
                    (1.0 - r) * 0.8
                } else {
                    1.0
                };
                row.push(v);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn reboot(&self) -> Result<(), DishError> {
        let mut st = self.lock()?;
        st.boot_until = Some(st.tick + BOOT_TICKS);
        st.booted_at = Instant::now();
        Ok(())
    }

    fn set_stow(&self, unstow: bool) -> Result<(), DishError> {
        let mut st = self.lock()?;
        if st.boot_until.is_some() {
            return Err(DishError::Rejected(if unstow {
                Command::Unstow
            } else {
                Command::Stow
            }));
        }
        st.stowed = !unstow;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stow_zeroes_throughput_until_unstowed() {
        let dish = SimulatedDish::default();
        assert_eq!(dish.status().unwrap().state, "CONNECTED");

        dish.dispatch(Command::Stow).unwrap();
        let s = dish.status().unwrap();
        assert_eq!(s.state, "STOWED");
        assert_eq!(s.downlink_throughput_bps, 0.0);
        assert_eq!(s.uplink_throughput_bps, 0.0);

        dish.dispatch(Command::Unstow).unwrap();
        let s = dish.status().unwrap();
        assert_eq!(s.state, "CONNECTED");
        assert!(s.downlink_throughput_bps > 0.0);
    }

    #[test]
    fn reboot_reports_booting_for_a_while() {
        let dish = SimulatedDish::default();
        dish.status().unwrap();
        dish.dispatch(Command::Reboot).unwrap();
        for _ in 0..(BOOT_TICKS - 1) {
            assert_eq!(dish.status().unwrap().state, "BOOTING");
        }
        assert_eq!(dish.status().unwrap().state, "CONNECTED");
    }

    #[test]
    fn stow_is_rejected_while_booting() {
        let dish = SimulatedDish::default();
        dish.reboot().unwrap();
        assert!(matches!(
            dish.set_stow(false),
            Err(DishError::Rejected(Command::Stow))
        ));
    }

    #[test]
    fn obstruction_map_is_square_with_no_data_corners() {
        let map = SimulatedDish::default().obstruction_map().unwrap();
        assert_eq!(map.len(), MAP_SIZE);
        assert!(map.iter().all(|r| r.len() == MAP_SIZE));
        assert!(map[0][0] < 0.0);
        assert_eq!(map[MAP_SIZE / 2][MAP_SIZE / 2], 1.0);
        assert!(map.iter().flatten().any(|v| (0.0..1.0).contains(v)));
    }
}
