use serde::{Deserialize, Serialize};

use super::history::MetricsHistory;
use super::memory::MemoryBreakdown;
use super::thermal::ThermalLevel;
use super::topology::CoreDescriptor;

/// Derived values published to the presentation layer
///
/// Every field keeps its last good value when a sampler fails; unavailable
/// subsystems are flagged rather than zeroed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub cpu_usage_percent: f64,
    pub per_core_usage_percent: Vec<f64>,
    pub cores: Vec<CoreDescriptor>,

    pub memory_usage_percent: f64,
    pub memory: MemoryBreakdown,

    pub network_interface: Option<String>,
    pub network_upload_bps: f64,
    pub network_download_bps: f64,
    pub session_upload_total: u64,
    pub session_download_total: u64,

    pub top_processes: Vec<ProcessMetrics>,

    pub thermal_level: ThermalLevel,
    pub thermal_raw_code: Option<u64>,
    pub thermal_available: bool,

    /// `None` until the first successful GPU read
    pub gpu_usage_percent: Option<f64>,
    pub gpu_name: Option<String>,
    pub gpu_available: bool,

    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub resident_bytes: u64,
}

/// Complete published snapshot: derived values plus their history
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp: i64, // Unix timestamp
    pub metrics: DerivedMetrics,
    pub history: MetricsHistory,
}

impl Snapshot {
    pub fn new(network_points: usize) -> Self {
        Self {
            timestamp: 0,
            metrics: DerivedMetrics {
                thermal_available: true,
                gpu_available: true,
                ..Default::default()
            },
            history: MetricsHistory::new(network_points),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_NETWORK_HISTORY_POINTS)
    }
}
