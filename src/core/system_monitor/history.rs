use std::collections::VecDeque;

use serde::Serialize;

/// Capacity of the CPU, per-core, memory and GPU series
pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// Fixed-capacity FIFO of samples (for sparklines)
///
/// Once full, every append evicts exactly the oldest entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryBuffer<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> HistoryBuffer<T> {
    /// A zero capacity is bumped to one so `push` always retains the latest value.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(value);
    }

    /// Change the capacity, dropping the oldest entries if the buffer is now over it.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }
}

impl<T: Clone> HistoryBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// One network history point, in bytes per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NetworkSpeed {
    pub upload_bps: f64,
    pub download_bps: f64,
    /// Unix timestamp (seconds) of the sample
    pub timestamp: i64,
}

/// Bounded history of every time-series metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricsHistory {
    pub cpu_usage: HistoryBuffer<f64>,
    pub per_core_usage: Vec<HistoryBuffer<f64>>,
    pub memory_usage: HistoryBuffer<f64>,
    pub gpu_usage: HistoryBuffer<f64>,
    pub network: HistoryBuffer<NetworkSpeed>,
}

impl MetricsHistory {
    pub fn new(network_points: usize) -> Self {
        Self {
            cpu_usage: HistoryBuffer::with_capacity(DEFAULT_HISTORY_SIZE),
            per_core_usage: Vec::new(),
            memory_usage: HistoryBuffer::with_capacity(DEFAULT_HISTORY_SIZE),
            gpu_usage: HistoryBuffer::with_capacity(DEFAULT_HISTORY_SIZE),
            network: HistoryBuffer::with_capacity(network_points),
        }
    }

    pub fn push_cpu(&mut self, value: f64) {
        self.cpu_usage.push(value);
    }

    /// Append one sample per core. A change in core count starts the per-core
    /// series over rather than mixing samples from different layouts.
    pub fn push_per_core(&mut self, samples: &[f64]) {
        if self.per_core_usage.len() != samples.len() {
            self.per_core_usage = (0..samples.len())
                .map(|_| HistoryBuffer::with_capacity(DEFAULT_HISTORY_SIZE))
                .collect();
        }
        for (buffer, &value) in self.per_core_usage.iter_mut().zip(samples) {
            buffer.push(value);
        }
    }

    pub fn push_memory(&mut self, value: f64) {
        self.memory_usage.push(value);
    }

    pub fn push_gpu(&mut self, value: f64) {
        self.gpu_usage.push(value);
    }

    pub fn push_network(&mut self, speed: NetworkSpeed) {
        self.network.push(speed);
    }

    pub fn set_network_capacity(&mut self, points: usize) {
        self.network.resize(points);
    }

    /// Convert cpu_usage to u64 for sparkline widgets.
    /// Scales values by 10 to preserve decimal precision (0-1000 range)
    pub fn cpu_as_u64(&self) -> Vec<u64> {
        self.cpu_usage.iter().map(|&v| (v * 10.0) as u64).collect()
    }

    /// Same scaling as [`cpu_as_u64`](Self::cpu_as_u64)
    pub fn memory_as_u64(&self) -> Vec<u64> {
        self.memory_usage.iter().map(|&v| (v * 10.0) as u64).collect()
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_NETWORK_HISTORY_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::with_capacity(3);
        for i in 0..10 {
            buffer.push(i);
            assert!(buffer.len() <= 3);
        }
        assert_eq!(buffer.to_vec(), vec![7, 8, 9]);
    }

    #[test]
    fn test_append_when_full_evicts_oldest_once() {
        let mut buffer = HistoryBuffer::with_capacity(4);
        for i in 1..=4 {
            buffer.push(i);
        }
        assert_eq!(buffer.to_vec(), vec![1, 2, 3, 4]);

        buffer.push(5);
        assert_eq!(buffer.to_vec(), vec![2, 3, 4, 5]);
        assert_eq!(buffer.latest(), Some(&5));
    }

    #[test]
    fn test_resize_drops_oldest() {
        let mut buffer = HistoryBuffer::with_capacity(5);
        for i in 0..5 {
            buffer.push(i);
        }
        buffer.resize(2);
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer.to_vec(), vec![3, 4]);

        buffer.resize(10);
        buffer.push(5);
        assert_eq!(buffer.to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut buffer = HistoryBuffer::with_capacity(0);
        buffer.push("a");
        buffer.push("b");
        assert_eq!(buffer.to_vec(), vec!["b"]);
    }

    #[test]
    fn test_per_core_history_resets_on_core_count_change() {
        let mut history = MetricsHistory::new(30);
        history.push_per_core(&[10.0, 20.0]);
        history.push_per_core(&[11.0, 21.0]);
        assert_eq!(history.per_core_usage.len(), 2);
        assert_eq!(history.per_core_usage[0].to_vec(), vec![10.0, 11.0]);

        history.push_per_core(&[1.0, 2.0, 3.0]);
        assert_eq!(history.per_core_usage.len(), 3);
        assert_eq!(history.per_core_usage[1].to_vec(), vec![2.0]);
    }

    #[test]
    fn test_cpu_as_u64_scaling() {
        let mut history = MetricsHistory::default();
        history.push_cpu(12.34);
        assert_eq!(history.cpu_as_u64(), vec![123]);

        history.push_memory(55.0);
        history.push_memory(60.25);
        assert_eq!(history.memory_as_u64(), vec![550, 602]);
    }
}
