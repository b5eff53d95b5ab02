//! Entry point for the dishy TUI. Parses args, resolves the agent URL and runs the App.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Child;

use dishy::app::{App, AppConfig};
use dishy::dashboard::Layout;
use dishy::logging::{default_log_path, init_file_logging};
use dishy::profiles::{load_profiles, save_profiles, ProfileRequest, ResolveProfile};
use tracing::info;

const DEMO_PORT: u16 = 3232;

#[derive(Debug, Default)]
struct ParsedArgs {
    url: Option<String>,
    profile: Option<String>,
    save: bool,
    demo: bool,
    dry_run: bool,
    legacy: bool,
    map_out: Option<PathBuf>,
    log: Option<PathBuf>,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--profile NAME|-P NAME] [--save] [--legacy] [--map-out PATH] [--log PATH] [--demo] [--dry-run] [ws://HOST:PORT/ws]"
    )
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "dishy".into());
    let mut parsed = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--profile" | "-P" => parsed.profile = it.next(),
            "--map-out" => parsed.map_out = it.next().map(PathBuf::from),
            "--log" => parsed.log = it.next().map(PathBuf::from),
            "--save" => parsed.save = true,
            "--demo" => parsed.demo = true,
            "--dry-run" => parsed.dry_run = true,
            "--legacy" => parsed.legacy = true,
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--map-out=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.map_out = Some(PathBuf::from(v));
                    }
                }
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown flag '{arg}'. {}", usage(&prog)));
            }
            _ => {
                if parsed.url.is_none() {
                    parsed.url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }
    Ok(parsed)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };
    let layout = if parsed.legacy { Layout::Legacy } else { Layout::Full };

    let demo = parsed.demo || matches!(parsed.profile.as_deref(), Some("demo"));
    let url = if demo {
        format!("ws://127.0.0.1:{DEMO_PORT}/ws")
    } else {
        match resolve_url(&parsed)? {
            Some(url) => url,
            None => return Ok(()),
        }
    };

    if parsed.dry_run {
        println!("dishy: would connect to {url} ({layout:?} layout)");
        return Ok(());
    }

    let log_path = parsed.log.clone().unwrap_or_else(default_log_path);
    if let Err(e) = init_file_logging(&log_path) {
        eprintln!("dishy: logging disabled: {e:#}");
    }

    let _agent = if demo {
        Some(spawn_demo_agent(DEMO_PORT)?)
    } else {
        None
    };

    info!(%url, ?layout, "starting");
    let mut app = App::new(AppConfig {
        url,
        layout,
        map_out: parsed.map_out,
    })?;
    tokio::select! {
        res = app.run() => res,
        // Drop the demo guard (kills the agent) on Ctrl-C as well
        _ = tokio::signal::ctrl_c() => Ok(()),
    }
}

/// Resolve the URL from the command line and saved profiles, prompting
/// where needed. `None` means there is nothing to connect to.
fn resolve_url(parsed: &ParsedArgs) -> anyhow::Result<Option<String>> {
    let mut profiles = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
    };

    let url = match req.resolve(&profiles) {
        ResolveProfile::Direct(url) => {
            if let Some(name) = parsed.profile.as_deref() {
                let existing = profiles.profiles.get(name).map(|e| e.url.clone());
                match existing {
                    // New profile: auto-save immediately
                    None => {
                        profiles.upsert(name, &url);
                        save_profiles(&profiles)?;
                    }
                    Some(old) if old != url => {
                        let overwrite = parsed.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "));
                        if overwrite {
                            profiles.upsert(name, &url);
                            save_profiles(&profiles)?;
                        }
                    }
                    Some(_) => {}
                }
            }
            url
        }
        ResolveProfile::Loaded(url) => url,
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
                .and_then(|name| profiles.profiles.get(name));
            match picked {
                Some(entry) => entry.url.clone(),
                None => return Ok(None),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws or wss://...): ")?;
            let url = url.trim();
            if url.is_empty() {
                return Ok(None);
            }
            profiles.upsert(&name, url);
            save_profiles(&profiles)?;
            url.to_string()
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(None);
        }
    };
    Ok(Some(url))
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

struct DemoGuard(Child);

impl Drop for DemoGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_demo_agent(port: u16) -> anyhow::Result<DemoGuard> {
    let mut cmd = std::process::Command::new(find_agent_executable());
    cmd.arg("--port").arg(port.to_string());
    cmd.env("DISHY_AGENT_INTERVAL_MS", "1000");
    cmd.stdout(std::process::Stdio::null());
    cmd.stderr(std::process::Stdio::null());
    let child = cmd.spawn()?;
    // Give the agent a brief moment to bind
    std::thread::sleep(std::time::Duration::from_millis(300));
    Ok(DemoGuard(child))
}

fn find_agent_executable() -> PathBuf {
    #[cfg(windows)]
    let name = "dishy_agent.exe";
    #[cfg(not(windows))]
    let name = "dishy_agent";
    if let Some(parent) = env::current_exe().ok().as_deref().and_then(|p| p.parent()) {
        let candidate = parent.join(name);
        if candidate.exists() {
            return candidate;
        }
    }
    // Fallback to relying on PATH
    PathBuf::from(name)
}
