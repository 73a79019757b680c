// Platform-specific code module
//
// The sampling engine only sees the source traits below. Each OS backend
// provides raw counters; every derived number is computed in core.

pub mod gpu;
#[cfg(target_os = "macos")]
mod macos;
pub mod procfs;
mod system;

pub use system::{SystemCounters, SystemNetworks};

use crate::core::system_monitor::{CpuTicks, MemoryCounters, NetworkCounters, ProcessSample};
use crate::error::Result;

/// Host-level counters: CPU ticks, VM pages, processes, uptime.
pub trait CounterSource: Send {
    /// Number of logical cores reported by the host
    fn active_core_count(&self) -> usize;

    /// Cumulative host-wide ticks
    fn host_cpu_ticks(&mut self) -> Result<CpuTicks>;

    /// Cumulative ticks for each logical core, in core order
    fn per_core_ticks(&mut self) -> Result<Vec<CpuTicks>>;

    fn memory_counters(&mut self) -> Result<MemoryCounters>;

    /// Every visible process with its cumulative CPU time
    fn processes(&mut self) -> Result<Vec<ProcessSample>>;

    fn uptime_secs(&mut self) -> u64;
}

/// Interface byte counters.
pub trait NetworkSource: Send {
    /// Interface carrying the default route, if any
    fn primary_interface(&mut self) -> Option<String>;

    /// Cumulative bytes sent and received on `name`
    fn interface_counters(&mut self, name: &str) -> Result<NetworkCounters>;
}

/// Raw OS thermal pressure code.
pub trait ThermalSource: Send {
    fn read_code(&mut self) -> Result<u64>;
}

/// Open the host's thermal pressure source.
pub fn open_thermal_source() -> Result<Box<dyn ThermalSource>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::NotifyThermalSource::register()?))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Err(crate::error::PulseError::unavailable(
            "thermal pressure notifications are not provided by this OS",
        ))
    }
}
