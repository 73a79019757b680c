//! Memory usage derived from virtual-memory page counters.

use serde::{Deserialize, Serialize};

/// Virtual-memory page counts as reported by the OS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmPageCounts {
    pub free: u64,
    pub active: u64,
    pub inactive: u64,
    pub wired: u64,
    pub compressed: u64,
    pub internal: u64,
    pub purgeable: u64,
    pub external: u64,
}

/// One memory reading: pages plus the sizes needed to turn them into bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCounters {
    pub pages: VmPageCounts,
    pub page_size: u64,
    /// `None` when the physical memory size lookup failed
    pub physical_bytes: Option<u64>,
}

/// Memory usage breakdown in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryBreakdown {
    pub app_bytes: u64,
    pub wired_bytes: u64,
    pub compressed_bytes: u64,
    pub free_bytes: u64,
    pub total_bytes: u64,
    pub usage_percent: f64,
}

impl MemoryBreakdown {
    pub fn used_bytes(&self) -> u64 {
        self.app_bytes
            .saturating_add(self.wired_bytes)
            .saturating_add(self.compressed_bytes)
    }
}

/// Build the usage breakdown from a page reading.
///
/// App memory is anonymous memory that cannot be purged; used memory is app +
/// wired + compressed. Without a physical size the total falls back to
/// used + free + inactive.
pub fn build_memory_snapshot(counters: &MemoryCounters) -> MemoryBreakdown {
    let page_size = counters.page_size;
    let pages = &counters.pages;
    let bytes = |count: u64| count.saturating_mul(page_size);

    let app_bytes = bytes(pages.internal.saturating_sub(pages.purgeable));
    let wired_bytes = bytes(pages.wired);
    let compressed_bytes = bytes(pages.compressed);
    let used = app_bytes
        .saturating_add(wired_bytes)
        .saturating_add(compressed_bytes);

    let total_bytes = counters.physical_bytes.unwrap_or_else(|| {
        used.saturating_add(bytes(pages.free))
            .saturating_add(bytes(pages.inactive))
    });

    let usage_percent = if total_bytes > 0 {
        used as f64 / total_bytes as f64 * 100.0
    } else {
        0.0
    };

    MemoryBreakdown {
        app_bytes,
        wired_bytes,
        compressed_bytes,
        free_bytes: total_bytes.saturating_sub(used),
        total_bytes,
        usage_percent,
    }
}
