use std::time::{Duration, Instant};

use pulse::core::system_monitor::{
    build_memory_snapshot, core_split, counter_delta, CoreTopology, CpuDeltaEngine, CpuTicks,
    HistoryBuffer, MemoryCounters, NetworkCounters, NetworkRateEngine, ProcessRanker,
    ProcessSample, ThermalLevel, VmPageCounts,
};
use pulse::platform::procfs::parse_stat;
use pulse::PulseError;

#[test]
fn test_host_usage_from_two_snapshots() {
    let mut engine = CpuDeltaEngine::new(0);
    assert_eq!(engine.update_host(CpuTicks::new(100, 50, 850, 0)), None);
    let usage = engine.update_host(CpuTicks::new(110, 55, 935, 0)).unwrap();
    assert!((usage - 15.0).abs() < 1e-9);
}

#[test]
fn test_proc_stat_readings_feed_the_delta_engine() {
    let first = "cpu  100 0 50 850 0 0 0 0\ncpu0 50 0 25 425 0 0 0 0\ncpu1 50 0 25 425 0 0 0 0\n";
    let second = "cpu  110 0 55 935 0 0 0 0\ncpu0 60 0 30 460 0 0 0 0\ncpu1 50 0 25 475 0 0 0 0\n";

    let topology = CoreTopology::classify(2);
    let mut engine = CpuDeltaEngine::new(topology.len());

    let (host, cores) = parse_stat(first).unwrap();
    engine.update_host(host);
    assert_eq!(engine.update_per_core(cores).unwrap(), None);

    let (host, cores) = parse_stat(second).unwrap();
    assert!((engine.update_host(host).unwrap() - 15.0).abs() < 1e-9);

    let per_core = engine.update_per_core(cores).unwrap().unwrap();
    assert_eq!(per_core.len(), 2);
    assert!((per_core[0] - 30.0).abs() < 1e-9);
    assert_eq!(per_core[1], 0.0);
}

#[test]
fn test_core_count_change_is_a_topology_mismatch() {
    let mut engine = CpuDeltaEngine::new(4);
    engine.update_per_core(vec![CpuTicks::default(); 4]).unwrap();

    let err = engine
        .update_per_core(vec![CpuTicks::new(1, 1, 1, 1); 6])
        .unwrap_err();
    assert!(matches!(
        err,
        PulseError::TopologyMismatch {
            expected: 4,
            actual: 6
        }
    ));
}

#[test]
fn test_topology_table_counts_add_up() {
    for cores in [8, 10, 12, 14, 16, 20, 24] {
        let (efficiency, performance) = core_split(cores);
        assert_eq!(efficiency + performance, cores);
    }
    assert_eq!(core_split(10), (2, 8));
    assert_eq!(core_split(6), (3, 3));

    let topology = CoreTopology::classify(12);
    assert_eq!(topology.efficiency_count(), 2);
    assert_eq!(topology.performance_count(), 10);
}

#[test]
fn test_counter_regression_never_goes_negative() {
    assert_eq!(counter_delta(5, 10), 0);
    assert_eq!(counter_delta(10, 5), 5);
}

#[test]
fn test_memory_falls_back_to_page_total() {
    let counters = MemoryCounters {
        pages: VmPageCounts {
            internal: 300,
            purgeable: 100,
            wired: 100,
            compressed: 0,
            free: 500,
            inactive: 200,
            ..Default::default()
        },
        page_size: 1024,
        physical_bytes: None,
    };
    let memory = build_memory_snapshot(&counters);
    assert_eq!(memory.app_bytes, 200 * 1024);
    assert_eq!(memory.total_bytes, (300 + 500 + 200) * 1024);
    assert!((memory.usage_percent - 30.0).abs() < 1e-9);
}

#[test]
fn test_interface_switch_yields_no_spike() {
    let mut engine = NetworkRateEngine::new();
    let t0 = Instant::now();
    engine.update("en0", NetworkCounters::new(1_000, 2_000), t0);

    let rate = engine.update("en1", NetworkCounters::new(50, 80), t0 + Duration::from_secs(1));
    assert!(rate.is_none());
    assert_eq!(engine.session_upload_total(), 0);
    assert_eq!(engine.session_download_total(), 0);
}

#[test]
fn test_ranking_ties_keep_enumeration_order() {
    let mut ranker = ProcessRanker::with_exclusions(Vec::<String>::new(), 5);
    let t0 = Instant::now();
    let sample = |pid, name: &str, ns| ProcessSample {
        pid,
        name: name.to_string(),
        cpu_time_ns: ns,
        resident_bytes: 0,
    };

    ranker.rank(&[sample(1, "A", 0), sample(2, "B", 0), sample(3, "C", 0)], t0);
    let ranked = ranker.rank(
        &[
            sample(1, "A", 100_000_000),
            sample(2, "B", 300_000_000),
            sample(3, "C", 300_000_000),
        ],
        t0 + Duration::from_secs(1),
    );

    let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["B", "C", "A"]);
    assert!((ranked[0].cpu_percent - 30.0).abs() < 1e-9);
}

#[test]
fn test_history_buffer_is_fifo() {
    let mut buffer = HistoryBuffer::with_capacity(3);
    for value in 1..=4 {
        buffer.push(value);
    }
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.to_vec(), vec![2, 3, 4]);
}

#[test]
fn test_thermal_codes() {
    assert_eq!(ThermalLevel::from_code(2), ThermalLevel::Heavy);
    assert_eq!(ThermalLevel::from_code(99), ThermalLevel::Unknown);
}
