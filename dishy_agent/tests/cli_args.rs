//! CLI arg tests for dishy_agent (server)
use std::process::Command;

#[test]
fn help_mentions_port_flags() {
    let out = Command::new(env!("CARGO_BIN_EXE_dishy_agent"))
        .arg("--help")
        .output()
        .expect("run dishy_agent --help");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(out.status.success());
    assert!(text.contains("--port") && text.contains("-p"), "{text}");
}

#[test]
fn starts_with_long_and_short_port() {
    // We verify port flags are accepted by ensuring the process starts (then we kill quickly).
    let exe = env!("CARGO_BIN_EXE_dishy_agent");

    let mut child = Command::new(exe)
        .args(["--port", "0"])
        .spawn()
        .expect("spawn agent");
    std::thread::sleep(std::time::Duration::from_millis(150));
    assert!(child.try_wait().expect("poll").is_none(), "agent exited early");
    let _ = child.kill();
    let _ = child.wait();

    let mut child2 = Command::new(exe)
        .args(["-p", "0"])
        .spawn()
        .expect("spawn agent");
    std::thread::sleep(std::time::Duration::from_millis(150));
    assert!(child2.try_wait().expect("poll").is_none(), "agent exited early");
    let _ = child2.kill();
    let _ = child2.wait();
}
