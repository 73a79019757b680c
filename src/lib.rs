// Pulse Library - Public API

// Re-export error types
pub mod error;
pub use error::{PulseError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::MonitorConfig;
pub use core::system_monitor::{DerivedMetrics, MetricsRuntime, Snapshot, Sources};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
