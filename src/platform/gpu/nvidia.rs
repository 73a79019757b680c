#[cfg(feature = "nvml")]
use nvml_wrapper::{Device, Nvml};

use crate::core::system_monitor::{GpuMetrics, GpuProvider, GpuVendor};
use crate::error::{PulseError, Result};

/// NVIDIA GPU provider using NVML
pub struct NvidiaGpuProvider {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
    #[cfg_attr(not(feature = "nvml"), allow(dead_code))]
    device_index: u32,
}

impl NvidiaGpuProvider {
    /// Initializes NVML and selects the first GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init().map_err(|e| {
                PulseError::gpu_not_available(format!("Failed to init NVML: {}", e))
            })?;

            nvml.device_by_index(index).map_err(|e| {
                PulseError::gpu_not_available(format!("GPU {} not found: {}", index, e))
            })?;

            Ok(Self {
                nvml,
                device_index: index,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            let _ = index;
            Err(PulseError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device(&self) -> Result<Device<'_>> {
        self.nvml
            .device_by_index(self.device_index)
            .map_err(|e| PulseError::syscall(format!("Failed to get GPU device: {}", e)))
    }
}

impl GpuProvider for NvidiaGpuProvider {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Nvidia
    }

    fn is_available(&self) -> bool {
        #[cfg(feature = "nvml")]
        {
            self.get_device().is_ok()
        }
        #[cfg(not(feature = "nvml"))]
        {
            false
        }
    }

    fn collect_metrics(&mut self) -> Result<GpuMetrics> {
        #[cfg(feature = "nvml")]
        {
            let device = self.get_device()?;

            let name = device
                .name()
                .unwrap_or_else(|_| "Unknown NVIDIA GPU".to_string());

            // No utilization counter means no reading, not a zero
            let utilization = device.utilization_rates().map_err(|e| {
                PulseError::syscall(format!("Failed to read GPU utilization: {}", e))
            })?;

            Ok(GpuMetrics {
                vendor: GpuVendor::Nvidia,
                name,
                utilization_percent: f64::from(utilization.gpu).min(100.0),
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(PulseError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }
}
