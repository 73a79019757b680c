//! Host-wide and per-core CPU usage from cumulative tick counters.

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};

/// Cumulative ticks spent in each CPU state since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTicks {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub nice: u64,
}

impl CpuTicks {
    pub fn new(user: u64, system: u64, idle: u64, nice: u64) -> Self {
        Self {
            user,
            system,
            idle,
            nice,
        }
    }
}

/// Difference between two readings of a cumulative counter.
///
/// A reading below the previous one (counter reset, interface bounce, pid
/// reuse) yields 0, never a negative or wrapped value.
pub fn counter_delta(current: u64, previous: u64) -> u64 {
    if current < previous {
        log::debug!("counter regression: {} -> {}", previous, current);
    }
    current.saturating_sub(previous)
}

/// Busy share of the elapsed ticks between two readings, in percent.
///
/// Not clamped: values a hair outside 0/100 from float rounding are expected.
pub fn usage_percent(previous: &CpuTicks, current: &CpuTicks) -> f64 {
    let user = counter_delta(current.user, previous.user);
    let system = counter_delta(current.system, previous.system);
    let idle = counter_delta(current.idle, previous.idle);
    let nice = counter_delta(current.nice, previous.nice);

    let total = user
        .saturating_add(system)
        .saturating_add(idle)
        .saturating_add(nice);
    if total == 0 {
        return 0.0;
    }
    (total - idle) as f64 * 100.0 / total as f64
}

/// Pairs consecutive tick readings and turns them into usage percentages.
///
/// Produces nothing until a baseline exists.
#[derive(Debug, Clone, Default)]
pub struct CpuDeltaEngine {
    core_count: usize,
    previous_host: Option<CpuTicks>,
    previous_cores: Option<Vec<CpuTicks>>,
}

impl CpuDeltaEngine {
    /// `core_count` is the classified topology size; 0 disables the topology check.
    pub fn new(core_count: usize) -> Self {
        Self {
            core_count,
            previous_host: None,
            previous_cores: None,
        }
    }

    pub fn update_host(&mut self, current: CpuTicks) -> Option<f64> {
        let usage = self
            .previous_host
            .as_ref()
            .map(|previous| usage_percent(previous, &current));
        self.previous_host = Some(current);
        usage
    }

    /// Per-core usage, or `Ok(None)` on the first reading.
    ///
    /// A reading whose length differs from the previous one or from the
    /// topology is rejected with [`PulseError::TopologyMismatch`]; the caller
    /// keeps its prior values. The baseline is rebased on the new reading so a
    /// stable layout can be computed again on the next tick.
    pub fn update_per_core(&mut self, current: Vec<CpuTicks>) -> Result<Option<Vec<f64>>> {
        let previous = self.previous_cores.replace(current);
        let current = self.previous_cores.as_deref().unwrap_or_default();

        if self.core_count > 0 && current.len() != self.core_count {
            return Err(PulseError::topology_mismatch(self.core_count, current.len()));
        }

        let Some(previous) = previous else {
            return Ok(None);
        };

        if previous.len() != current.len() {
            return Err(PulseError::topology_mismatch(previous.len(), current.len()));
        }

        Ok(Some(
            previous
                .iter()
                .zip(current)
                .map(|(prev, cur)| usage_percent(prev, cur))
                .collect(),
        ))
    }
}
