//! Terminal dashboard for a satellite dish agent: pushed telemetry feeds
//! rolling windows that are charted once per tick.

pub mod app;
pub mod dashboard;
pub mod decoder;
pub mod error;
pub mod history;
pub mod http;
pub mod logging;
pub mod profiles;
pub mod types;
pub mod ui;
pub mod ws;
