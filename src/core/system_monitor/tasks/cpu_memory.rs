//! CPU, Memory, and Process monitoring task.
//!
//! These subsystems are grouped together because they share one counter
//! source and the user-configured interval.

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, Duration, Instant, Interval, MissedTickBehavior};

use super::SubsystemUpdate;
use crate::core::config::MonitorConfig;
use crate::core::system_monitor::{
    build_memory_snapshot, CpuDeltaEngine, MemoryBreakdown, ProcessMetrics, ProcessRanker,
};
use crate::platform::CounterSource;

pub(super) fn new_ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Task that monitors CPU, Memory, and Processes.
///
/// Polling frequency: `updateInterval` from the config. An interval change
/// replaces the ticker; baselines survive it.
pub async fn cpu_memory_process_task(
    mut source: Box<dyn CounterSource>,
    core_count: usize,
    update_tx: mpsc::Sender<SubsystemUpdate>,
    mut config_rx: watch::Receiver<MonitorConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::debug!("CPU/Memory/Process task started ({} cores)", core_count);

    let mut cpu_engine = CpuDeltaEngine::new(core_count);
    let mut ranker = ProcessRanker::new();

    let mut period = config_rx.borrow_and_update().interval();
    let mut ticker = new_ticker(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let update = sample(source.as_mut(), &mut cpu_engine, &mut ranker);
                if update_tx.send(update).await.is_err() {
                    break;
                }
            }
            Ok(()) = config_rx.changed() => {
                let next = config_rx.borrow_and_update().interval();
                if next != period {
                    log::info!("Sampling interval changed: {:?} -> {:?}", period, next);
                    period = next;
                    ticker = new_ticker(period);
                }
            }
            _ = shutdown.recv() => {
                log::debug!("CPU/Memory/Process task shutting down");
                break;
            }
        }
    }
}

fn sample(
    source: &mut dyn CounterSource,
    cpu_engine: &mut CpuDeltaEngine,
    ranker: &mut ProcessRanker,
) -> SubsystemUpdate {
    let cpu = match source.host_cpu_ticks() {
        Ok(ticks) => cpu_engine.update_host(ticks),
        Err(e) => {
            log::debug!("Host CPU ticks unavailable: {}", e);
            None
        }
    };

    let per_core = match source.per_core_ticks() {
        Ok(ticks) => cpu_engine.update_per_core(ticks).unwrap_or_else(|e| {
            log::debug!("Skipping per-core update: {}", e);
            None
        }),
        Err(e) => {
            log::debug!("Per-core ticks unavailable: {}", e);
            None
        }
    };

    let memory: Option<MemoryBreakdown> = match source.memory_counters() {
        Ok(counters) => Some(build_memory_snapshot(&counters)),
        Err(e) => {
            log::debug!("Memory counters unavailable: {}", e);
            None
        }
    };

    let processes: Option<Vec<ProcessMetrics>> = match source.processes() {
        Ok(live) => Some(ranker.rank(&live, Instant::now().into_std())),
        Err(e) => {
            log::debug!("Process enumeration failed: {}", e);
            None
        }
    };

    SubsystemUpdate::CpuMemoryProcess {
        cpu,
        per_core,
        memory,
        processes,
        uptime_seconds: source.uptime_secs(),
    }
}
