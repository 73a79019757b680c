//! sysinfo-backed sources, with OS-specific tick and page readers underneath.

use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, Networks, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};

use super::{CounterSource, NetworkSource};
use crate::core::system_monitor::{CpuTicks, MemoryCounters, NetworkCounters, ProcessSample};
use crate::error::{PulseError, Result};

/// Host counters for the local machine
pub struct SystemCounters {
    system: System,
    ticks: TickCache,
}

/// Host and per-core ticks taken from one reading
type TickReading = (CpuTicks, Vec<CpuTicks>);

/// Hands the per-core half of the last host reading to the per-core query, so
/// both values of one sampling pass describe the same moment.
#[derive(Debug, Default)]
struct TickCache {
    pending_cores: Option<Vec<CpuTicks>>,
}

impl TickCache {
    fn host(&mut self, read: impl FnOnce() -> Result<TickReading>) -> Result<CpuTicks> {
        let (host, cores) = read()?;
        self.pending_cores = Some(cores);
        Ok(host)
    }

    fn per_core(&mut self, read: impl FnOnce() -> Result<TickReading>) -> Result<Vec<CpuTicks>> {
        match self.pending_cores.take() {
            Some(cores) => Ok(cores),
            None => read().map(|(_, cores)| cores),
        }
    }
}

impl SystemCounters {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing())
            .with_memory(MemoryRefreshKind::nothing().with_ram())
            .with_processes(ProcessRefreshKind::nothing().with_cpu().with_memory());

        let mut system = System::new_with_specifics(refresh_kind);
        system.refresh_cpu_list(CpuRefreshKind::nothing());
        Self {
            system,
            ticks: TickCache::default(),
        }
    }

    fn physical_memory(&mut self) -> Option<u64> {
        self.system.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        Some(self.system.total_memory()).filter(|&total| total > 0)
    }
}

impl Default for SystemCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SystemCounters {
    fn active_core_count(&self) -> usize {
        match self.system.cpus().len() {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(0),
            n => n,
        }
    }

    fn host_cpu_ticks(&mut self) -> Result<CpuTicks> {
        self.ticks.host(read_platform_ticks)
    }

    fn per_core_ticks(&mut self) -> Result<Vec<CpuTicks>> {
        self.ticks.per_core(read_platform_ticks)
    }

    fn memory_counters(&mut self) -> Result<MemoryCounters> {
        let mut counters = read_platform_memory()?;
        if counters.physical_bytes.is_none() {
            counters.physical_bytes = self.physical_memory();
        }
        Ok(counters)
    }

    fn processes(&mut self) -> Result<Vec<ProcessSample>> {
        let refreshed = self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        if refreshed == 0 && self.system.processes().is_empty() {
            return Err(PulseError::syscall("process enumeration returned nothing"));
        }

        let mut samples: Vec<ProcessSample> = self
            .system
            .processes()
            .values()
            .map(|p| ProcessSample {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                // accumulated_cpu_time is in milliseconds
                cpu_time_ns: p.accumulated_cpu_time().saturating_mul(1_000_000),
                resident_bytes: p.memory(),
            })
            .collect();
        // HashMap order is arbitrary; enumerate in pid order so ties are stable
        samples.sort_by_key(|p| p.pid);
        Ok(samples)
    }

    fn uptime_secs(&mut self) -> u64 {
        System::uptime()
    }
}

fn read_platform_ticks() -> Result<TickReading> {
    #[cfg(target_os = "linux")]
    {
        super::procfs::read_stat()
    }
    #[cfg(target_os = "macos")]
    {
        let cores = super::macos::per_core_ticks()?;
        Ok((super::macos::host_ticks_from(&cores), cores))
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Err(PulseError::syscall("CPU ticks not supported on this platform"))
    }
}

fn read_platform_memory() -> Result<MemoryCounters> {
    #[cfg(target_os = "linux")]
    {
        super::procfs::read_meminfo()
    }
    #[cfg(target_os = "macos")]
    {
        super::macos::memory_counters()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Err(PulseError::syscall("page counters not supported on this platform"))
    }
}

fn default_route_interface() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        super::procfs::read_default_route()
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Interface byte counters and primary interface detection
pub struct SystemNetworks {
    networks: Networks,
}

impl SystemNetworks {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }

    /// First non-loopback interface (by name) that has seen traffic
    fn fallback_interface(&self) -> Option<String> {
        let mut names: Vec<&String> = self
            .networks
            .iter()
            .filter(|(name, data)| {
                !name.starts_with("lo") && data.total_received() + data.total_transmitted() > 0
            })
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names.first().map(|name| name.to_string())
    }
}

impl Default for SystemNetworks {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSource for SystemNetworks {
    fn primary_interface(&mut self) -> Option<String> {
        if let Some(name) = default_route_interface() {
            return Some(name);
        }
        self.networks.refresh(true);
        self.fallback_interface()
    }

    fn interface_counters(&mut self, name: &str) -> Result<NetworkCounters> {
        self.networks.refresh(true);
        self.networks
            .iter()
            .find(|(iface, _)| iface.as_str() == name)
            .map(|(_, data)| NetworkCounters {
                upload: data.total_transmitted(),
                download: data.total_received(),
            })
            .ok_or_else(|| PulseError::syscall(format!("interface {} not found", name)))
    }
}
