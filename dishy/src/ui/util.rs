//! Small UI helpers: human-readable sizes and durations.

pub fn human(b: u64) -> String {
    const K: f64 = 1024.0;
    let b = b as f64;
    if b < K { return format!("{b:.0}B"); }
    let kb = b / K;
    if kb < K { return format!("{kb:.1}KB"); }
    let mb = kb / K;
    format!("{mb:.1}MB")
}

pub fn uptime(secs: u64) -> String {
    let (d, h, m) = (secs / 86_400, (secs / 3600) % 24, (secs / 60) % 60);
    if d > 0 {
        format!("{d}d{h:02}h")
    } else if h > 0 {
        format!("{h}h{m:02}m")
    } else {
        format!("{m}m{:02}s", secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_durations() {
        assert_eq!(human(512), "512B");
        assert_eq!(human(31_948), "31.2KB");
        assert_eq!(human(3 * 1024 * 1024), "3.0MB");
        assert_eq!(uptime(59), "0m59s");
        assert_eq!(uptime(3_725), "1h02m");
        assert_eq!(uptime(2 * 86_400 + 5 * 3600), "2d05h");
    }
}
