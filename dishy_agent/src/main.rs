//! dishy_agent entry point: parses args, starts the sampler and serves /ws.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dishy_agent::dish::SimulatedDish;
use dishy_agent::obstruction::{hex_to_rgb, SvgOptions};
use dishy_agent::router;
use dishy_agent::sampler::spawn_sampler;
use dishy_agent::state::AppState;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_INTERVAL_MS: u64 = 3000;

fn usage(prog: &str) -> String {
    format!("Usage: {prog} [--port PORT|-p PORT]\n\nEnv: DISHY_AGENT_INTERVAL_MS, DISHY_AGENT_HW, DISHY_AGENT_OBSTRUCTED_COLOR, DISHY_AGENT_UNOBSTRUCTED_COLOR, RUST_LOG")
}

fn parse_port<I: IntoIterator<Item = String>>(args: I, default_port: u16) -> Result<u16, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "dishy_agent".into());
    let mut long: Option<String> = None;
    let mut short: Option<String> = None;
    while let Some(a) = it.next() {
        match a.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--port" => long = it.next(),
            "-p" => short = it.next(),
            _ if a.starts_with("--port=") => {
                if let Some((_, v)) = a.split_once('=') {
                    long = Some(v.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(long
        .or(short)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(default_port))
}

fn interval_from_env() -> Duration {
    let ms = std::env::var("DISHY_AGENT_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_INTERVAL_MS);
    Duration::from_millis(ms)
}

fn svg_options_from_env() -> anyhow::Result<SvgOptions> {
    let mut opts = SvgOptions::default();
    if let Ok(v) = std::env::var("DISHY_AGENT_OBSTRUCTED_COLOR") {
        opts.obstructed = hex_to_rgb(&v).context("DISHY_AGENT_OBSTRUCTED_COLOR")?;
    }
    if let Ok(v) = std::env::var("DISHY_AGENT_UNOBSTRUCTED_COLOR") {
        opts.unobstructed = hex_to_rgb(&v).context("DISHY_AGENT_UNOBSTRUCTED_COLOR")?;
    }
    Ok(opts)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = match parse_port(std::env::args(), DEFAULT_PORT) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let hw = std::env::var("DISHY_AGENT_HW").unwrap_or_else(|_| "rev3_proto2".into());
    let state = AppState::new(Arc::new(SimulatedDish::new(hw)), svg_options_from_env()?);

    let period = interval_from_env();
    let _sampler = spawn_sampler(state.clone(), period);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(
        "dishy_agent listening on ws://{}/ws (interval {} ms)",
        listener.local_addr()?,
        period.as_millis()
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn port_long_short_and_assign() {
        assert_eq!(parse_port(args(&["agent", "--port", "9001"]), 3000), Ok(9001));
        assert_eq!(parse_port(args(&["agent", "-p", "9002"]), 3000), Ok(9002));
        assert_eq!(parse_port(args(&["agent", "--port=9003"]), 3000), Ok(9003));
        assert_eq!(parse_port(args(&["agent", "-p", "nope"]), 3000), Ok(3000));
        assert_eq!(parse_port(args(&["agent"]), 3000), Ok(3000));
    }

    #[test]
    fn help_returns_usage() {
        let err = parse_port(args(&["agent", "--help"]), 3000).unwrap_err();
        assert!(err.contains("--port"));
    }
}
