use pulse::core::config::UnitMode;
use pulse::ui::{format_bytes, format_rate, format_uptime};

#[test]
fn test_rate_respects_unit_mode() {
    let bytes = format_rate(125_000.0, UnitMode::BytesPerSecond);
    assert!(bytes.ends_with("kB/s"), "{}", bytes);

    assert_eq!(format_rate(125_000.0, UnitMode::BitsPerSecond), "1.0 Mbps");
}

#[test]
fn test_format_bytes_uses_decimal_units() {
    assert_eq!(format_bytes(0), "0 B");
    assert!(format_bytes(2_000_000_000).ends_with("GB"));
}

#[test]
fn test_format_uptime_days() {
    assert_eq!(format_uptime(86_400), "1d 0h 0m");
}
