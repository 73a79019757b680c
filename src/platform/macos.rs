//! Mach host statistics and Darwin notify(3) thermal pressure.

use std::ffi::CString;
use std::mem;

use libc::{c_char, c_int};

use super::ThermalSource;
use crate::core::system_monitor::{CpuTicks, MemoryCounters, VmPageCounts};
use crate::error::{PulseError, Result};

const THERMAL_PRESSURE_KEY: &str = "com.apple.system.thermalpressurelevel";
const NOTIFY_STATUS_OK: u32 = 0;

extern "C" {
    fn notify_register_check(name: *const c_char, out_token: *mut c_int) -> u32;
    fn notify_get_state(token: c_int, state64: *mut u64) -> u32;
    fn notify_cancel(token: c_int) -> u32;
}

/// Per-processor ticks from `host_processor_info(PROCESSOR_CPU_LOAD_INFO)`.
#[allow(deprecated)]
pub fn per_core_ticks() -> Result<Vec<CpuTicks>> {
    let mut cpu_count: libc::natural_t = 0;
    let mut info: libc::processor_info_array_t = std::ptr::null_mut();
    let mut info_count: libc::mach_msg_type_number_t = 0;

    // SAFETY: out-pointers are valid; on success the kernel hands us an array
    // we own and release with vm_deallocate below.
    let result = unsafe {
        libc::host_processor_info(
            libc::mach_host_self(),
            libc::PROCESSOR_CPU_LOAD_INFO,
            &mut cpu_count,
            &mut info,
            &mut info_count,
        )
    };
    if result != libc::KERN_SUCCESS || info.is_null() {
        return Err(PulseError::syscall(format!(
            "host_processor_info failed with {}",
            result
        )));
    }

    let states = libc::CPU_STATE_MAX as usize;
    // SAFETY: the kernel returned cpu_count * CPU_STATE_MAX integers
    let raw = unsafe { std::slice::from_raw_parts(info, cpu_count as usize * states) };
    let ticks = raw
        .chunks_exact(states)
        .map(|core| CpuTicks {
            user: core[libc::CPU_STATE_USER as usize] as u32 as u64,
            system: core[libc::CPU_STATE_SYSTEM as usize] as u32 as u64,
            idle: core[libc::CPU_STATE_IDLE as usize] as u32 as u64,
            nice: core[libc::CPU_STATE_NICE as usize] as u32 as u64,
        })
        .collect();

    // SAFETY: releases the buffer allocated by host_processor_info
    unsafe {
        libc::vm_deallocate(
            libc::mach_task_self(),
            info as libc::vm_address_t,
            info_count as usize * mem::size_of::<libc::integer_t>(),
        );
    }

    Ok(ticks)
}

/// Host-wide ticks as the sum over all processors
pub fn host_ticks_from(cores: &[CpuTicks]) -> CpuTicks {
    cores.iter().fold(CpuTicks::default(), |acc, core| CpuTicks {
        user: acc.user + core.user,
        system: acc.system + core.system,
        idle: acc.idle + core.idle,
        nice: acc.nice + core.nice,
    })
}

fn physical_memory() -> Option<u64> {
    let name = CString::new("hw.memsize").ok()?;
    let mut value: u64 = 0;
    let mut size = mem::size_of::<u64>();
    // SAFETY: value/size describe a valid u64 out-buffer
    let result = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            &mut value as *mut u64 as *mut libc::c_void,
            &mut size,
            std::ptr::null_mut(),
            0,
        )
    };
    (result == 0 && value > 0).then_some(value)
}

/// Page counters from `host_statistics64(HOST_VM_INFO64)`.
#[allow(deprecated)]
pub fn memory_counters() -> Result<MemoryCounters> {
    // SAFETY: vm_statistics64 is plain old data
    let mut stats: libc::vm_statistics64 = unsafe { mem::zeroed() };
    let mut count = (mem::size_of::<libc::vm_statistics64>() / mem::size_of::<libc::integer_t>())
        as libc::mach_msg_type_number_t;

    // SAFETY: stats is large enough for `count` integers
    let result = unsafe {
        libc::host_statistics64(
            libc::mach_host_self(),
            libc::HOST_VM_INFO64,
            &mut stats as *mut libc::vm_statistics64 as *mut libc::integer_t,
            &mut count,
        )
    };
    if result != libc::KERN_SUCCESS {
        return Err(PulseError::syscall(format!(
            "host_statistics64 failed with {}",
            result
        )));
    }

    Ok(MemoryCounters {
        pages: VmPageCounts {
            free: stats.free_count as u64,
            active: stats.active_count as u64,
            inactive: stats.inactive_count as u64,
            wired: stats.wire_count as u64,
            compressed: stats.compressor_page_count as u64,
            internal: stats.internal_page_count as u64,
            purgeable: stats.purgeable_count as u64,
            external: stats.external_page_count as u64,
        },
        page_size: super::procfs::page_size(),
        physical_bytes: physical_memory(),
    })
}

/// Thermal pressure through a notify(3) check token
pub struct NotifyThermalSource {
    token: c_int,
}

impl NotifyThermalSource {
    pub fn register() -> Result<Self> {
        let name = CString::new(THERMAL_PRESSURE_KEY)
            .map_err(|e| PulseError::unavailable(e.to_string()))?;
        let mut token: c_int = 0;
        // SAFETY: name is NUL-terminated and token is a valid out-pointer
        let status = unsafe { notify_register_check(name.as_ptr(), &mut token) };
        if status != NOTIFY_STATUS_OK {
            return Err(PulseError::unavailable(format!(
                "notify_register_check({}) returned {}",
                THERMAL_PRESSURE_KEY, status
            )));
        }
        Ok(Self { token })
    }
}

impl ThermalSource for NotifyThermalSource {
    fn read_code(&mut self) -> Result<u64> {
        let mut state: u64 = 0;
        // SAFETY: token came from notify_register_check and is still registered
        let status = unsafe { notify_get_state(self.token, &mut state) };
        if status != NOTIFY_STATUS_OK {
            return Err(PulseError::syscall(format!(
                "notify_get_state returned {}",
                status
            )));
        }
        Ok(state)
    }
}

impl Drop for NotifyThermalSource {
    fn drop(&mut self) {
        // SAFETY: releases the registration taken in `register`
        unsafe {
            notify_cancel(self.token);
        }
    }
}
