//! Async tasks for collecting system metrics.
//!
//! Each sampler family runs in its own task at its own cadence and reports to
//! the orchestrator through [`SubsystemUpdate`] messages.

mod cpu_memory;
mod gpu;
mod network;
mod thermal;

pub use cpu_memory::cpu_memory_process_task;
pub use gpu::gpu_task;
pub use network::{network_task, NETWORK_PERIOD};
pub use thermal::{thermal_task, THERMAL_PERIOD};

use super::gpu::GpuMetrics;
use super::memory::MemoryBreakdown;
use super::metrics::ProcessMetrics;
use super::network::NetworkRate;
use super::thermal::ThermalLevel;

/// Updates sent from subsystem tasks to the orchestrator.
///
/// A `None` field means that reading failed or had no baseline this tick;
/// the orchestrator keeps the previously published value for it.
#[derive(Debug, Clone)]
pub enum SubsystemUpdate {
    /// CPU, memory and process metrics (sampled together on the shared interval)
    CpuMemoryProcess {
        cpu: Option<f64>,
        per_core: Option<Vec<f64>>,
        memory: Option<MemoryBreakdown>,
        processes: Option<Vec<ProcessMetrics>>,
        uptime_seconds: u64,
    },

    /// Primary interface reading; `rate` is `None` while there is no baseline
    Network {
        interface: String,
        rate: Option<NetworkRate>,
        session_upload_total: u64,
        session_download_total: u64,
    },

    Thermal {
        level: ThermalLevel,
        raw_code: Option<u64>,
        available: bool,
    },

    Gpu(GpuMetrics),

    /// No device, or the provider was given up on
    GpuUnavailable,
}
