//! Upload/download rates for the primary network interface.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::cpu::counter_delta;

/// Cumulative byte counters of one interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCounters {
    pub upload: u64,
    pub download: u64,
}

impl NetworkCounters {
    pub fn new(upload: u64, download: u64) -> Self {
        Self { upload, download }
    }
}

/// Rates derived from one pair of readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkRate {
    pub upload_bps: f64,
    pub download_bps: f64,
    pub upload_delta: u64,
    pub download_delta: u64,
}

/// Baseline tracking for the current primary interface.
///
/// The baseline is dropped whenever the primary interface changes, so no delta
/// is ever taken across two unrelated interfaces.
#[derive(Debug, Clone, Default)]
pub struct NetworkRateEngine {
    interface: Option<String>,
    baseline: Option<(NetworkCounters, Instant)>,
    session_upload: u64,
    session_download: u64,
}

impl NetworkRateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current primary interface. Returns true if it changed, in
    /// which case the baseline has been discarded.
    pub fn observe_interface(&mut self, name: &str) -> bool {
        if self.interface.as_deref() == Some(name) {
            return false;
        }
        if let Some(old) = &self.interface {
            log::info!("Primary interface changed: {} -> {}", old, name);
        }
        self.interface = Some(name.to_string());
        self.baseline = None;
        true
    }

    /// Feed one reading for `interface` taken at `now`.
    ///
    /// Returns `None` when there is no usable baseline (first reading, or just
    /// after an interface switch); the reading then becomes the new baseline.
    /// A reading taken with no elapsed time also returns `None` but leaves the
    /// baseline in place.
    pub fn update(
        &mut self,
        interface: &str,
        current: NetworkCounters,
        now: Instant,
    ) -> Option<NetworkRate> {
        self.observe_interface(interface);

        let (previous, at) = match self.baseline {
            Some(baseline) => baseline,
            None => {
                self.baseline = Some((current, now));
                return None;
            }
        };

        let elapsed = now.saturating_duration_since(at).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        let rate = {
            let upload_delta = counter_delta(current.upload, previous.upload);
            let download_delta = counter_delta(current.download, previous.download);
            NetworkRate {
                upload_bps: upload_delta as f64 / elapsed,
                download_bps: download_delta as f64 / elapsed,
                upload_delta,
                download_delta,
            }
        };

        self.session_upload = self.session_upload.saturating_add(rate.upload_delta);
        self.session_download = self.session_download.saturating_add(rate.download_delta);

        self.baseline = Some((current, now));
        Some(rate)
    }

    /// Forget the baseline without changing the tracked interface.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn session_upload_total(&self) -> u64 {
        self.session_upload
    }

    pub fn session_download_total(&self) -> u64 {
        self.session_download
    }
}
