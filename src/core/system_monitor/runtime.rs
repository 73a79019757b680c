//! Tokio runtime and orchestrator for metrics collection.
//!
//! Sampler tasks send [`SubsystemUpdate`]s to a single orchestrator task, the
//! only writer of the published [`Snapshot`]. Readers get whole snapshots
//! through a `watch` channel and never see a partial update.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use super::gpu::{GpuProvider, GpuReader};
use super::history::NetworkSpeed;
use super::metrics::Snapshot;
use super::tasks::{
    cpu_memory_process_task, gpu_task, network_task, thermal_task, SubsystemUpdate,
};
use super::thermal::ThermalMapper;
use super::topology::CoreTopology;
use crate::core::config::MonitorConfig;
use crate::error::Result;
use crate::platform::{
    self, gpu::get_gpu_provider, CounterSource, NetworkSource, SystemCounters, SystemNetworks,
    ThermalSource,
};

/// OS access handed to the sampler tasks.
///
/// Thermal and GPU sources may have failed to open; the matching sampler then
/// reports the subsystem as unavailable.
pub struct Sources {
    pub counters: Box<dyn CounterSource>,
    pub network: Box<dyn NetworkSource>,
    pub thermal: Result<Box<dyn ThermalSource>>,
    pub gpu: Result<Box<dyn GpuProvider>>,
}

impl Sources {
    /// Sources for the local machine
    pub fn system() -> Self {
        Self {
            counters: Box::new(SystemCounters::new()),
            network: Box::new(SystemNetworks::new()),
            thermal: platform::open_thermal_source(),
            gpu: get_gpu_provider(),
        }
    }
}

/// Wrapper around the Tokio runtime for metrics collection.
pub struct MetricsRuntime {
    /// Receiver for published snapshots
    pub snapshot_rx: watch::Receiver<Arc<Snapshot>>,

    config_tx: watch::Sender<MonitorConfig>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    /// Dropping the runtime stops every task
    _runtime_handle: tokio::runtime::Runtime,
}

impl MetricsRuntime {
    /// Start sampling the local machine.
    pub fn new(config: MonitorConfig) -> anyhow::Result<Self> {
        Self::with_sources(config, Sources::system())
    }

    /// Start sampling from the given sources.
    pub fn with_sources(config: MonitorConfig, sources: Sources) -> anyhow::Result<Self> {
        log::info!("Starting metrics runtime");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("pulse-worker")
            .build()?;

        let config = config.normalized();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::new(
            config.network_history_points,
        )));
        let (config_tx, config_rx) = watch::channel(config);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let shutdown = shutdown_tx.subscribe();
        runtime.spawn(async move { spawn_all_tasks(sources, snapshot_tx, config_rx, shutdown).await });

        Ok(Self {
            snapshot_rx,
            config_tx,
            shutdown_tx,
            _runtime_handle: runtime,
        })
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// A new receiver; dropping it ends the subscription.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }

    pub fn config(&self) -> MonitorConfig {
        self.config_tx.borrow().clone()
    }

    /// Publish a new configuration; samplers pick it up on their next loop.
    pub fn update_config(&self, config: MonitorConfig) {
        self.config_tx.send_replace(config.normalized());
    }

    /// Shutdown the runtime gracefully.
    pub fn shutdown(self) {
        log::info!("Shutting down metrics runtime");
        let _ = self.shutdown_tx.send(());
        // Runtime will shutdown when dropped
    }
}

/// Spawn the orchestrator and one task per sampler family.
///
/// The core topology is classified here, once, from the source's core count.
pub async fn spawn_all_tasks(
    sources: Sources,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    config_rx: watch::Receiver<MonitorConfig>,
    shutdown: broadcast::Receiver<()>,
) {
    let Sources {
        counters,
        network,
        thermal,
        gpu,
    } = sources;

    let topology = CoreTopology::classify(counters.active_core_count());
    log::debug!(
        "Core topology: {} efficiency, {} performance",
        topology.efficiency_count(),
        topology.performance_count()
    );

    let (update_tx, update_rx) = mpsc::channel::<SubsystemUpdate>(32);

    tokio::spawn(orchestrator_task(
        topology.clone(),
        update_rx,
        snapshot_tx,
        config_rx.clone(),
        shutdown.resubscribe(),
    ));

    tokio::spawn(cpu_memory_process_task(
        counters,
        topology.len(),
        update_tx.clone(),
        config_rx.clone(),
        shutdown.resubscribe(),
    ));

    tokio::spawn(network_task(
        network,
        update_tx.clone(),
        shutdown.resubscribe(),
    ));

    tokio::spawn(thermal_task(
        ThermalMapper::new(thermal),
        update_tx.clone(),
        shutdown.resubscribe(),
    ));

    tokio::spawn(gpu_task(
        GpuReader::new(gpu),
        update_tx,
        config_rx,
        shutdown.resubscribe(),
    ));
}

/// Merge one update into the snapshot and its history.
fn apply_update(snapshot: &mut Snapshot, update: SubsystemUpdate, now: i64) {
    let metrics = &mut snapshot.metrics;
    let history = &mut snapshot.history;

    match update {
        SubsystemUpdate::CpuMemoryProcess {
            cpu,
            per_core,
            memory,
            processes,
            uptime_seconds,
        } => {
            if let Some(cpu) = cpu {
                metrics.cpu_usage_percent = cpu;
                history.push_cpu(cpu);
            }
            if let Some(per_core) = per_core {
                history.push_per_core(&per_core);
                metrics.per_core_usage_percent = per_core;
            }
            if let Some(memory) = memory {
                metrics.memory_usage_percent = memory.usage_percent;
                history.push_memory(memory.usage_percent);
                metrics.memory = memory;
            }
            if let Some(processes) = processes {
                metrics.top_processes = processes;
            }
            metrics.uptime_seconds = uptime_seconds;
        }
        SubsystemUpdate::Network {
            interface,
            rate,
            session_upload_total,
            session_download_total,
        } => {
            metrics.network_interface = Some(interface);
            if let Some(rate) = rate {
                metrics.network_upload_bps = rate.upload_bps;
                metrics.network_download_bps = rate.download_bps;
                history.push_network(NetworkSpeed {
                    upload_bps: rate.upload_bps,
                    download_bps: rate.download_bps,
                    timestamp: now,
                });
            }
            metrics.session_upload_total = session_upload_total;
            metrics.session_download_total = session_download_total;
        }
        SubsystemUpdate::Thermal {
            level,
            raw_code,
            available,
        } => {
            metrics.thermal_level = level;
            metrics.thermal_raw_code = raw_code;
            metrics.thermal_available = available;
        }
        SubsystemUpdate::Gpu(gpu) => {
            metrics.gpu_usage_percent = Some(gpu.utilization_percent);
            metrics.gpu_name = Some(gpu.name);
            metrics.gpu_available = true;
            history.push_gpu(gpu.utilization_percent);
        }
        SubsystemUpdate::GpuUnavailable => {
            // Last value stays visible, flagged as unavailable
            metrics.gpu_available = false;
        }
    }
}

/// Orchestrator task that merges updates from samplers into snapshots.
async fn orchestrator_task(
    topology: CoreTopology,
    mut update_rx: mpsc::Receiver<SubsystemUpdate>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    mut config_rx: watch::Receiver<MonitorConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut current_snapshot = Snapshot::new(config_rx.borrow_and_update().network_history_points);
    current_snapshot.metrics.cores = topology.cores;

    loop {
        tokio::select! {
            Some(update) = update_rx.recv() => {
                let now = chrono::Utc::now().timestamp();
                apply_update(&mut current_snapshot, update, now);
                current_snapshot.timestamp = now;

                // Only fails once every reader is gone
                if snapshot_tx.send(Arc::new(current_snapshot.clone())).is_err() {
                    log::debug!("No snapshot readers left");
                }
            }
            Ok(()) = config_rx.changed() => {
                let points = config_rx.borrow_and_update().network_history_points;
                if points != current_snapshot.history.network.capacity() {
                    current_snapshot.history.set_network_capacity(points);
                    let _ = snapshot_tx.send(Arc::new(current_snapshot.clone()));
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Orchestrator task shutting down");
                break;
            }
        }
    }
}
