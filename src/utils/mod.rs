// Tue Jan 13 2026 - Alex

pub mod binary;
pub mod logging;

pub use binary::BinaryUtils;
pub use logging::LoggingUtils;

use std::time::{Duration, Instant};

pub fn measure_time<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    (result, elapsed)
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();

    if total_secs < 0.001 {
        format!("{}µs", duration.as_micros())
    } else if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0).floor();
        let secs = total_secs % 60.0;
        format!("{:.0}m {:.1}s", mins, secs)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

pub fn parse_hex(s: &str) -> Option<Vec<u8>> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let s = s.replace("0x", "").replace("0X", "");

    if s.len() % 2 != 0 {
        return None;
    }

    let mut result = Vec::with_capacity(s.len() / 2);
    for i in (0..s.len()).step_by(2) {
        let byte = u8::from_str_radix(s.get(i..i + 2)?, 16).ok()?;
        result.push(byte);
    }

    Some(result)
}

pub fn parse_u32(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_cheat_text() {
        let bytes = parse_hex("00D0C0DE 00D0C0DE\nF0000000 00000000").unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[0x00, 0xD0, 0xC0, 0xDE]);
        assert!(parse_hex("ABC").is_none());
        assert!(parse_hex("ZZ").is_none());
    }

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("0x80001000"), Some(0x8000_1000));
        assert_eq!(parse_u32("cc002000"), Some(0xCC00_2000));
        assert_eq!(parse_u32("100000000"), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(0xF800), "62.00 KB");
        assert_eq!(format_bytes(24 * 1024 * 1024), "24.00 MB");
    }
}
