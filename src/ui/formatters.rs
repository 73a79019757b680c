use chrono::{Local, TimeZone};
use humansize::{format_size, DECIMAL};

use crate::core::config::UnitMode;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format a byte count with decimal units (kB, MB, GB)
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a transfer rate given in bytes per second
///
/// Bytes mode uses decimal byte units ("1.2 MB/s"); bits mode multiplies by 8
/// and uses bps/Kbps/Mbps/Gbps.
pub fn format_rate(bytes_per_sec: f64, mode: UnitMode) -> String {
    let bytes_per_sec = if bytes_per_sec.is_finite() {
        bytes_per_sec.max(0.0)
    } else {
        0.0
    };

    match mode {
        UnitMode::BytesPerSecond => format!("{}/s", format_bytes(bytes_per_sec.round() as u64)),
        UnitMode::BitsPerSecond => {
            let bits = bytes_per_sec * 8.0;
            if bits < 1_000.0 {
                format!("{:.0} bps", bits)
            } else if bits < 1_000_000.0 {
                format!("{:.1} Kbps", bits / 1_000.0)
            } else if bits < 1_000_000_000.0 {
                format!("{:.1} Mbps", bits / 1_000_000.0)
            } else {
                format!("{:.1} Gbps", bits / 1_000_000_000.0)
            }
        }
    }
}

/// Format uptime as "3d 4h 12m", dropping leading zero units
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format a Unix timestamp in local time (HH:MM:SS)
pub fn format_time(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|datetime| datetime.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Fixed-width usage bar, e.g. `[#####.....]`
pub fn usage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled.min(width)))
}

/// One block character per value, scaled against `max`
pub fn sparkline(values: &[u64], max: u64) -> String {
    if max == 0 {
        return SPARK_LEVELS[0].to_string().repeat(values.len());
    }
    let top = SPARK_LEVELS.len() - 1;
    values
        .iter()
        .map(|&v| {
            let idx = (v.min(max) as f64 / max as f64 * top as f64).round() as usize;
            SPARK_LEVELS[idx.min(top)]
        })
        .collect()
}
