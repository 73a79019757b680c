// UI and formatting module

pub mod formatters;
pub mod system_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_bytes, format_rate, format_time, format_uptime, sparkline, usage_bar};
pub use system_formatters::{colored_thermal, print_snapshot, print_topology};
