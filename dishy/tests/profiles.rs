//! Profile persistence through the CLI (non-interactive paths only). Each
//! test points XDG_CONFIG_HOME of the child process at its own temp dir.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn run_dishy(config_home: &Path, args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_dishy"))
        .env("XDG_CONFIG_HOME", config_home)
        .args(args)
        .output()
        .expect("run dishy");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

fn profiles_path(config_home: &Path) -> PathBuf {
    config_home.join("dishy").join("profiles.json")
}

#[test]
fn test_profile_created_on_first_use() {
    let td = tempfile::tempdir().unwrap();
    let (ok, _) = run_dishy(td.path(), &["--profile", "unittest", "ws://example:1/ws", "--dry-run"]);
    assert!(ok);
    let data = fs::read_to_string(profiles_path(td.path())).expect("profiles.json created");
    assert!(data.contains("unittest"), "profiles.json missing profile entry: {data}");
    assert!(data.contains("ws://example:1/ws"));
}

#[test]
fn test_profile_overwrite_only_when_changed() {
    let td = tempfile::tempdir().unwrap();
    run_dishy(td.path(), &["--profile", "prod", "ws://one/ws", "--dry-run"]);
    let first = fs::read_to_string(profiles_path(td.path())).unwrap();

    run_dishy(td.path(), &["--profile", "prod", "ws://one/ws", "--dry-run"]);
    let second = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert_eq!(first, second, "Profile file changed despite identical input");

    run_dishy(td.path(), &["--profile", "prod", "--save", "ws://two/ws", "--dry-run"]);
    let third = fs::read_to_string(profiles_path(td.path())).unwrap();
    assert!(third.contains("two"), "Updated URL not written: {third}");
}

#[test]
fn test_saved_profile_is_loaded_by_name() {
    let td = tempfile::tempdir().unwrap();
    run_dishy(td.path(), &["-P", "cabin", "ws://cabin:3000/ws", "--dry-run"]);
    let (ok, text) = run_dishy(td.path(), &["-P", "cabin", "--dry-run"]);
    assert!(ok);
    assert!(text.contains("ws://cabin:3000/ws"), "{text}");
}
