//! Top-N process ranking from accumulated CPU time.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::cpu::counter_delta;
use super::metrics::ProcessMetrics;

/// Number of processes kept in the published ranking
pub const TOP_PROCESS_COUNT: usize = 5;

/// Kernel-owned processes that never appear in the ranking
const KERNEL_PROCESS_NAMES: &[&str] = &["kernel_task", "kthreadd", "swapper"];

/// File name of the running executable, resolved once
static OWN_PROCESS_NAME: Lazy<Option<String>> = Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
});

/// Per-process accounting from one enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// Cumulative user + system CPU time in nanoseconds
    pub cpu_time_ns: u64,
    pub resident_bytes: u64,
}

/// Names excluded by default: this process and the kernel's own tasks
pub fn default_excluded_names() -> Vec<String> {
    let mut names: Vec<String> = KERNEL_PROCESS_NAMES.iter().map(|s| s.to_string()).collect();
    if let Some(own) = OWN_PROCESS_NAME.as_ref() {
        names.push(own.clone());
    }
    names
}

/// Keeps the last CPU-time sample per pid and ranks processes by CPU share.
#[derive(Debug, Clone)]
pub struct ProcessRanker {
    samples: HashMap<u32, (u64, Instant)>,
    excluded: HashSet<String>,
    top_n: usize,
}

impl ProcessRanker {
    pub fn new() -> Self {
        Self::with_exclusions(default_excluded_names(), TOP_PROCESS_COUNT)
    }

    pub fn with_exclusions<I, S>(excluded: I, top_n: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            samples: HashMap::new(),
            excluded: excluded.into_iter().map(Into::into).collect(),
            top_n,
        }
    }

    /// Rank the live processes enumerated at `now`.
    ///
    /// A pid without a prior sample contributes 0% this tick. The ranking is a
    /// stable descending sort, so ties keep enumeration order. Pids missing from
    /// `live` are pruned from the sample table afterwards.
    pub fn rank(&mut self, live: &[ProcessSample], now: Instant) -> Vec<ProcessMetrics> {
        let mut ranked: Vec<ProcessMetrics> = live
            .iter()
            .filter(|p| !self.excluded.contains(&p.name))
            .map(|p| {
                let cpu_percent = self
                    .samples
                    .get(&p.pid)
                    .map(|&(prior_ns, seen_at)| {
                        let elapsed = now.saturating_duration_since(seen_at).as_secs_f64();
                        if elapsed <= 0.0 {
                            return 0.0;
                        }
                        let busy_secs = counter_delta(p.cpu_time_ns, prior_ns) as f64 / 1e9;
                        busy_secs / elapsed * 100.0
                    })
                    .unwrap_or(0.0);

                ProcessMetrics {
                    pid: p.pid,
                    name: p.name.clone(),
                    cpu_percent,
                    resident_bytes: p.resident_bytes,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(self.top_n);

        for p in live {
            self.samples.insert(p.pid, (p.cpu_time_ns, now));
        }
        let alive: HashSet<u32> = live.iter().map(|p| p.pid).collect();
        self.samples.retain(|pid, _| alive.contains(pid));

        ranked
    }

    /// Number of pids currently tracked
    pub fn tracked(&self) -> usize {
        self.samples.len()
    }
}

impl Default for ProcessRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SEC: u64 = 1_000_000_000;

    fn sample(pid: u32, name: &str, cpu_time_ns: u64) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            cpu_time_ns,
            resident_bytes: 1024 * pid as u64,
        }
    }

    fn ranker() -> ProcessRanker {
        ProcessRanker::with_exclusions(["kernel_task", "pulse"], TOP_PROCESS_COUNT)
    }

    #[test]
    fn test_new_processes_report_zero() {
        let mut ranker = ranker();
        let ranked = ranker.rank(&[sample(1, "a", 5 * SEC)], Instant::now());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].cpu_percent, 0.0);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let mut ranker = ranker();
        let t0 = Instant::now();
        ranker.rank(&[sample(1, "A", 0), sample(2, "B", 0), sample(3, "C", 0)], t0);

        // Over one second: A=10%, B=30%, C=30%
        let ranked = ranker.rank(
            &[
                sample(1, "A", SEC / 10),
                sample(2, "B", 3 * SEC / 10),
                sample(3, "C", 3 * SEC / 10),
            ],
            t0 + Duration::from_secs(1),
        );
        let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert!((ranked[0].cpu_percent - 30.0).abs() < 1e-6);
        assert!((ranked[2].cpu_percent - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_keeps_top_five() {
        let mut ranker = ranker();
        let t0 = Instant::now();
        let first: Vec<_> = (1..=8).map(|pid| sample(pid, "p", 0)).collect();
        ranker.rank(&first, t0);

        let second: Vec<_> = (1..=8)
            .map(|pid| sample(pid, "p", pid as u64 * SEC / 100))
            .collect();
        let ranked = ranker.rank(&second, t0 + Duration::from_secs(1));
        let pids: Vec<u32> = ranked.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn test_excluded_names_are_skipped() {
        let mut ranker = ranker();
        let ranked = ranker.rank(
            &[sample(0, "kernel_task", 0), sample(7, "pulse", 0), sample(9, "x", 0)],
            Instant::now(),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].pid, 9);
    }

    #[test]
    fn test_stale_pids_are_pruned() {
        let mut ranker = ranker();
        let t0 = Instant::now();
        ranker.rank(&[sample(1, "a", 0), sample(2, "b", 0)], t0);
        assert_eq!(ranker.tracked(), 2);

        ranker.rank(&[sample(2, "b", SEC)], t0 + Duration::from_secs(1));
        assert_eq!(ranker.tracked(), 1);

        // pid 1 comes back: treated as newly observed
        let ranked = ranker.rank(&[sample(1, "a", 10 * SEC)], t0 + Duration::from_secs(2));
        assert_eq!(ranked[0].cpu_percent, 0.0);
    }

    #[test]
    fn test_pid_reuse_regression_is_zero() {
        let mut ranker = ranker();
        let t0 = Instant::now();
        ranker.rank(&[sample(4, "old", 50 * SEC)], t0);
        let ranked = ranker.rank(&[sample(4, "new", SEC)], t0 + Duration::from_secs(1));
        assert_eq!(ranked[0].cpu_percent, 0.0);
    }

    #[test]
    fn test_no_elapsed_time_is_zero() {
        let mut ranker = ranker();
        let t0 = Instant::now();
        ranker.rank(&[sample(3, "busy", SEC)], t0);
        let ranked = ranker.rank(&[sample(3, "busy", 4 * SEC)], t0);
        assert_eq!(ranked[0].cpu_percent, 0.0);
    }

    #[test]
    fn test_default_exclusions_include_kernel() {
        let names = default_excluded_names();
        assert!(names.iter().any(|n| n == "kernel_task"));
    }
}
