//! CLI arg tests for the dishy client binary.
use std::process::Command;

fn run(args: &[&str]) -> (bool, String) {
    let out = Command::new(env!("CARGO_BIN_EXE_dishy"))
        .args(args)
        .output()
        .expect("run dishy");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    (out.status.success(), text)
}

#[test]
fn test_help_mentions_flags() {
    let (ok, text) = run(&["--help"]);
    assert!(ok);
    for flag in ["--profile", "-P", "--legacy", "--map-out", "--demo", "--dry-run"] {
        assert!(text.contains(flag), "help text missing {flag}\n{text}");
    }
}

#[test]
fn test_flags_accepted_before_help() {
    for args in [
        &["--profile", "dev", "--help"][..],
        &["-P", "dev", "--help"][..],
        &["--legacy", "--map-out", "/tmp/map.svg", "--help"][..],
    ] {
        let (ok, text) = run(args);
        assert!(ok, "dishy {args:?} did not succeed");
        assert!(text.contains("Usage:"));
    }
}

#[test]
fn test_dry_run_prints_resolved_url_and_layout() {
    let (ok, text) = run(&["--dry-run", "--legacy", "ws://127.0.0.1:9/ws"]);
    assert!(ok);
    assert!(text.contains("ws://127.0.0.1:9/ws"), "{text}");
    assert!(text.contains("Legacy"), "{text}");
}
