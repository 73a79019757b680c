//! Kernel DRM sysfs provider.
//!
//! amdgpu and recent i915/xe drivers expose a `gpu_busy_percent` attribute
//! under `/sys/class/drm/cardN/device`. The first card that has one wins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::system_monitor::{GpuMetrics, GpuProvider, GpuVendor};
use crate::error::{PulseError, Result};

const DRM_CLASS_DIR: &str = "/sys/class/drm";
const BUSY_ATTRIBUTE: &str = "gpu_busy_percent";

pub struct DrmGpuProvider {
    device_dir: PathBuf,
    vendor: GpuVendor,
    name: String,
}

impl DrmGpuProvider {
    pub fn new() -> Result<Self> {
        Self::scan(Path::new(DRM_CLASS_DIR))
    }

    /// Find the first `cardN` under `class_dir` with a busy attribute
    pub fn scan(class_dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(class_dir).map_err(|e| {
            PulseError::gpu_not_available(format!("{} unreadable: {}", class_dir.display(), e))
        })?;

        let mut cards: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| is_card_node(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.path().join("device"))
            .filter(|device| device.join(BUSY_ATTRIBUTE).is_file())
            .collect();
        cards.sort();

        let device_dir = cards.into_iter().next().ok_or_else(|| {
            PulseError::gpu_not_available("no DRM device exposes gpu_busy_percent")
        })?;

        let vendor = read_trimmed(&device_dir.join("vendor"))
            .map(|id| vendor_from_pci_id(&id))
            .unwrap_or_default();
        let name = read_trimmed(&device_dir.join("product_name"))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{:?} GPU", vendor));

        log::debug!("Using DRM GPU at {}", device_dir.display());
        Ok(Self {
            device_dir,
            vendor,
            name,
        })
    }
}

/// `card0`, `card1`, ... but not connector nodes like `card0-DP-1`
fn is_card_node(name: &str) -> bool {
    name.strip_prefix("card")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn vendor_from_pci_id(id: &str) -> GpuVendor {
    match id.to_ascii_lowercase().as_str() {
        "0x1002" => GpuVendor::Amd,
        "0x8086" => GpuVendor::Intel,
        "0x10de" => GpuVendor::Nvidia,
        "0x106b" => GpuVendor::Apple,
        _ => GpuVendor::Unknown,
    }
}

impl GpuProvider for DrmGpuProvider {
    fn vendor(&self) -> GpuVendor {
        self.vendor
    }

    fn collect_metrics(&mut self) -> Result<GpuMetrics> {
        let path = self.device_dir.join(BUSY_ATTRIBUTE);
        let raw = fs::read_to_string(&path)?;
        let busy: f64 = raw.trim().parse().map_err(|_| {
            PulseError::syscall(format!("unexpected {} value {:?}", BUSY_ATTRIBUTE, raw.trim()))
        })?;

        Ok(GpuMetrics {
            vendor: self.vendor,
            name: self.name.clone(),
            utilization_percent: busy.clamp(0.0, 100.0),
        })
    }

    fn is_available(&self) -> bool {
        self.device_dir.join(BUSY_ATTRIBUTE).is_file()
    }
}
