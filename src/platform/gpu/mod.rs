//! GPU-specific platform code.
//!
//! Supports NVIDIA (via NVML) and any device the kernel DRM layer reports a
//! busy percentage for.

mod drm;
mod nvidia;

pub use drm::DrmGpuProvider;
pub use nvidia::NvidiaGpuProvider;

use crate::core::system_monitor::GpuProvider;
use crate::error::{PulseError, Result};

/// Attempt to get an available GPU provider
///
/// Tries each supported backend in order of preference:
/// 1. NVIDIA (via NVML)
/// 2. DRM sysfs (`gpu_busy_percent`)
pub fn get_gpu_provider() -> Result<Box<dyn GpuProvider>> {
    match NvidiaGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("NVML provider skipped: {}", e),
    }

    match DrmGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("DRM provider skipped: {}", e),
    }

    Err(PulseError::gpu_not_available("No supported GPU found"))
}
