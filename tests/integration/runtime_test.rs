use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pulse::core::system_monitor::{
    CpuTicks, GpuMetrics, GpuProvider, GpuVendor, MemoryCounters, NetworkCounters,
    ProcessSample, Snapshot, ThermalLevel, VmPageCounts,
};
use pulse::platform::{CounterSource, NetworkSource, ThermalSource};
use pulse::{MetricsRuntime, MonitorConfig, PulseError, Result, Sources};

struct FakeCounters {
    tick: u64,
}

impl CounterSource for FakeCounters {
    fn active_core_count(&self) -> usize {
        2
    }

    fn host_cpu_ticks(&mut self) -> Result<CpuTicks> {
        self.tick += 1;
        Ok(CpuTicks::new(50 * self.tick, 0, 50 * self.tick, 0))
    }

    fn per_core_ticks(&mut self) -> Result<Vec<CpuTicks>> {
        Ok(vec![
            CpuTicks::new(25 * self.tick, 0, 25 * self.tick, 0),
            CpuTicks::new(25 * self.tick, 0, 25 * self.tick, 0),
        ])
    }

    fn memory_counters(&mut self) -> Result<MemoryCounters> {
        Ok(MemoryCounters {
            pages: VmPageCounts {
                internal: 10,
                ..Default::default()
            },
            page_size: 4096,
            physical_bytes: Some(100 * 4096),
        })
    }

    fn processes(&mut self) -> Result<Vec<ProcessSample>> {
        Ok(vec![ProcessSample {
            pid: 7,
            name: "worker".to_string(),
            cpu_time_ns: self.tick * 1_000_000,
            resident_bytes: 1 << 20,
        }])
    }

    fn uptime_secs(&mut self) -> u64 {
        3_600
    }
}

struct FakeNetwork {
    sent: Arc<AtomicU64>,
}

impl NetworkSource for FakeNetwork {
    fn primary_interface(&mut self) -> Option<String> {
        Some("eth0".to_string())
    }

    fn interface_counters(&mut self, _name: &str) -> Result<NetworkCounters> {
        let sent = self.sent.fetch_add(500, Ordering::SeqCst);
        Ok(NetworkCounters::new(sent, sent))
    }
}

struct NominalThermal;

impl ThermalSource for NominalThermal {
    fn read_code(&mut self) -> Result<u64> {
        Ok(0)
    }
}

struct NoGpu;

impl GpuProvider for NoGpu {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Unknown
    }

    fn collect_metrics(&mut self) -> Result<GpuMetrics> {
        Err(PulseError::unavailable("no utilization property"))
    }

    fn is_available(&self) -> bool {
        false
    }
}

fn sources() -> Sources {
    Sources {
        counters: Box::new(FakeCounters { tick: 0 }),
        network: Box::new(FakeNetwork {
            sent: Arc::new(AtomicU64::new(0)),
        }),
        thermal: Ok(Box::new(NominalThermal)),
        gpu: Ok(Box::new(NoGpu)),
    }
}

fn wait_for(runtime: &MetricsRuntime, check: impl Fn(&Snapshot) -> bool) -> Arc<Snapshot> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let snapshot = runtime.snapshot();
        if check(&snapshot) || Instant::now() >= deadline {
            return snapshot;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_runtime_publishes_snapshots() {
    let config = MonitorConfig {
        update_interval: 1,
        ..Default::default()
    };
    let runtime = MetricsRuntime::with_sources(config, sources()).unwrap();

    let snapshot = wait_for(&runtime, |s| {
        !s.history.cpu_usage.is_empty() && !s.history.network.is_empty()
    });

    let metrics = &snapshot.metrics;
    assert!((metrics.cpu_usage_percent - 50.0).abs() < 1e-9);
    assert_eq!(metrics.per_core_usage_percent, vec![50.0, 50.0]);
    assert_eq!(metrics.cores.len(), 2);
    assert!((metrics.memory_usage_percent - 10.0).abs() < 1e-9);
    assert_eq!(metrics.top_processes.len(), 1);
    assert_eq!(metrics.top_processes[0].name, "worker");
    assert_eq!(metrics.network_interface.as_deref(), Some("eth0"));
    assert_eq!(metrics.thermal_level, ThermalLevel::Nominal);
    assert_eq!(metrics.uptime_seconds, 3_600);
    assert_eq!(metrics.gpu_usage_percent, None);

    runtime.shutdown();
}

#[test]
fn test_runtime_config_updates_are_normalized() {
    let runtime = MetricsRuntime::with_sources(MonitorConfig::default(), sources()).unwrap();

    runtime.update_config(MonitorConfig {
        update_interval: 7,
        network_history_points: 1_000,
        ..Default::default()
    });

    let config = runtime.config();
    assert_eq!(config.update_interval, 5);
    assert_eq!(config.network_history_points, 100);

    let snapshot = wait_for(&runtime, |s| s.history.network.capacity() == 100);
    assert_eq!(snapshot.history.network.capacity(), 100);

    runtime.shutdown();
}
