//! Linux `/proc` readers for tick counters, memory pages and the default route.
//!
//! Parsing is kept separate from file access so it can be tested on any host.

use crate::core::system_monitor::{CpuTicks, MemoryCounters, VmPageCounts};
use crate::error::{PulseError, Result};

/// Fold one `/proc/stat` cpu line into the four-state tick layout.
///
/// Format: `cpu user nice system idle iowait irq softirq steal ...`
/// irq, softirq and steal count as system time; iowait counts as idle.
fn parse_cpu_line(line: &str) -> Result<CpuTicks> {
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|tok| tok.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| PulseError::syscall(format!("bad /proc/stat field: {}", e)))?;

    if fields.len() < 4 {
        return Err(PulseError::syscall(format!(
            "cpu line too short: expected at least 4 values, got {}",
            fields.len()
        )));
    }

    let field = |idx: usize| fields.get(idx).copied().unwrap_or(0);
    Ok(CpuTicks {
        user: field(0),
        nice: field(1),
        system: field(2) + field(5) + field(6) + field(7),
        idle: field(3) + field(4),
    })
}

/// Host-wide ticks and per-core ticks, in core order.
pub fn parse_stat(content: &str) -> Result<(CpuTicks, Vec<CpuTicks>)> {
    let mut host = None;
    let mut cores = Vec::new();

    for line in content.lines() {
        if line.starts_with("cpu ") {
            host = Some(parse_cpu_line(line)?);
        } else if line.starts_with("cpu") {
            cores.push(parse_cpu_line(line)?);
        }
    }

    let host = host.ok_or_else(|| PulseError::syscall("no aggregate cpu line in /proc/stat"))?;
    Ok((host, cores))
}

/// Map `/proc/meminfo` onto the page-counter model.
pub fn parse_meminfo(content: &str, page_size: u64) -> Result<MemoryCounters> {
    if page_size == 0 {
        return Err(PulseError::syscall("page size is zero"));
    }

    let kb = |key: &str| -> Option<u64> {
        content.lines().find_map(|line| {
            let rest = line.strip_prefix(key)?.strip_prefix(':')?;
            rest.split_whitespace().next()?.parse::<u64>().ok()
        })
    };
    let pages = |key: &str| kb(key).unwrap_or(0) * 1024 / page_size;

    let total_kb = kb("MemTotal")
        .ok_or_else(|| PulseError::syscall("MemTotal missing from /proc/meminfo"))?;

    let shmem = pages("Shmem");
    let counts = VmPageCounts {
        free: pages("MemFree"),
        active: pages("Active"),
        inactive: pages("Inactive"),
        wired: pages("Unevictable")
            + pages("SUnreclaim")
            + pages("KernelStack")
            + pages("PageTables"),
        compressed: pages("Zswap"),
        internal: pages("AnonPages") + shmem,
        purgeable: 0,
        external: pages("Cached").saturating_sub(shmem),
    };

    Ok(MemoryCounters {
        pages: counts,
        page_size,
        physical_bytes: Some(total_kb * 1024),
    })
}

/// Interface carrying the default route in `/proc/net/route`, if any.
pub fn parse_default_route(content: &str) -> Option<String> {
    content.lines().skip(1).find_map(|line| {
        let mut cols = line.split_whitespace();
        let iface = cols.next()?;
        let destination = cols.next()?;
        let _gateway = cols.next()?;
        let flags = u32::from_str_radix(cols.next()?, 16).ok()?;
        // RTF_UP
        let up = flags & 0x1 != 0;
        (destination == "00000000" && up).then(|| iface.to_string())
    })
}

#[cfg(target_os = "linux")]
pub fn read_stat() -> Result<(CpuTicks, Vec<CpuTicks>)> {
    let content = std::fs::read_to_string("/proc/stat")?;
    parse_stat(&content)
}

#[cfg(target_os = "linux")]
pub fn read_meminfo() -> Result<MemoryCounters> {
    let content = std::fs::read_to_string("/proc/meminfo")?;
    parse_meminfo(&content, page_size())
}

#[cfg(target_os = "linux")]
pub fn read_default_route() -> Option<String> {
    std::fs::read_to_string("/proc/net/route")
        .ok()
        .and_then(|content| parse_default_route(&content))
}

#[cfg(unix)]
pub fn page_size() -> u64 {
    // SAFETY: sysconf has no memory-safety preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}
