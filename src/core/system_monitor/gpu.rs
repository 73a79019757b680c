use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Consecutive failed reads before a provider is given up on
pub const MAX_GPU_FAILURES: u32 = 5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Apple,
    #[default]
    Unknown,
}

/// Utilization of the first matching accelerator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuMetrics {
    pub vendor: GpuVendor,
    pub name: String,
    pub utilization_percent: f64,
}

/// Trait for GPU metrics providers
///
/// Implementations live in the platform layer. A provider whose device lacks
/// the utilization property returns an error from `collect_metrics`.
pub trait GpuProvider: Send {
    /// Get the vendor of the GPU
    fn vendor(&self) -> GpuVendor;

    /// Collect current GPU metrics
    fn collect_metrics(&mut self) -> Result<GpuMetrics>;

    /// Check if the GPU provider is available and functional
    fn is_available(&self) -> bool;
}

/// Outcome of one GPU poll
#[derive(Debug, Clone, PartialEq)]
pub enum GpuReading {
    Updated(GpuMetrics),
    /// Read failed; the last published value stays as is
    Unchanged,
    /// No device, or the device stopped answering
    Unavailable,
}

/// Polls a provider and decides when to give up on it.
pub struct GpuReader {
    provider: Option<Box<dyn GpuProvider>>,
    consecutive_failures: u32,
}

impl GpuReader {
    pub fn new(provider: Result<Box<dyn GpuProvider>>) -> Self {
        let provider = match provider {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::warn!("GPU provider not available: {}", e);
                None
            }
        };
        Self {
            provider,
            consecutive_failures: 0,
        }
    }

    pub fn poll(&mut self) -> GpuReading {
        let Some(provider) = self.provider.as_mut() else {
            return GpuReading::Unavailable;
        };

        match provider.collect_metrics() {
            Ok(metrics) => {
                self.consecutive_failures = 0;
                GpuReading::Updated(metrics)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                log::debug!(
                    "GPU collection failed (attempt {}): {}",
                    self.consecutive_failures,
                    e
                );
                if self.consecutive_failures >= MAX_GPU_FAILURES {
                    log::warn!(
                        "GPU monitoring disabled after {} consecutive failures",
                        MAX_GPU_FAILURES
                    );
                    self.provider = None;
                    GpuReading::Unavailable
                } else {
                    GpuReading::Unchanged
                }
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }
}
