//! System monitoring core functionality.
//!
//! Turns cumulative OS counters into percentages and rates, keeps bounded
//! history for each series and publishes one immutable [`Snapshot`] per tick.
//! OS access goes through the source traits in [`crate::platform`].

pub mod alerts;
mod cpu;
mod gpu;
mod history;
mod memory;
mod metrics;
mod network;
mod processes;
mod runtime;
mod tasks;
mod thermal;
mod topology;

pub use alerts::{evaluate_alerts, Alert, AlertCategory, AlertConfig, AlertSeverity};
pub use cpu::{counter_delta, usage_percent, CpuDeltaEngine, CpuTicks};
pub use gpu::{GpuMetrics, GpuProvider, GpuReader, GpuReading, GpuVendor, MAX_GPU_FAILURES};
pub use history::{HistoryBuffer, MetricsHistory, NetworkSpeed, DEFAULT_HISTORY_SIZE};
pub use memory::{build_memory_snapshot, MemoryBreakdown, MemoryCounters, VmPageCounts};
pub use metrics::{DerivedMetrics, ProcessMetrics, Snapshot};
pub use network::{NetworkCounters, NetworkRate, NetworkRateEngine};
pub use processes::{default_excluded_names, ProcessRanker, ProcessSample, TOP_PROCESS_COUNT};
pub use runtime::{spawn_all_tasks, MetricsRuntime, Sources};
pub use tasks::{SubsystemUpdate, NETWORK_PERIOD, THERMAL_PERIOD};
pub use thermal::{ThermalLevel, ThermalMapper};
pub use topology::{core_split, CoreDescriptor, CoreTopology};
