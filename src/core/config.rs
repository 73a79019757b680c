use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::system_monitor::ThermalLevel;

pub const CONFIG_VERSION: u32 = 1;

/// Sampling intervals offered to the user, in seconds
pub const ALLOWED_INTERVALS_SECS: [u64; 5] = [1, 2, 5, 10, 30];
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

pub const MIN_NETWORK_HISTORY_POINTS: usize = 10;
pub const MAX_NETWORK_HISTORY_POINTS: usize = 100;
pub const DEFAULT_NETWORK_HISTORY_POINTS: usize = 30;

/// How network rates are displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitMode {
    #[default]
    BytesPerSecond,
    BitsPerSecond,
}

/// User configuration read by the engine and persisted by the settings layer
///
/// Stored as a flat JSON object with camelCase keys. Missing keys take their
/// defaults, unknown keys are ignored and a value of the wrong type is skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub version: u32,

    /// CPU/memory/process/GPU sampling interval in seconds
    pub update_interval: u64,
    pub network_history_points: usize,
    pub use_bits_per_second: bool,

    pub show_core_details: bool,
    pub show_memory_details: bool,
    pub show_thermal_info: bool,
    pub show_network_details: bool,
    pub show_notifications: bool,

    pub cpu_alert_threshold: f64,
    pub memory_alert_threshold: f64,
    pub thermal_alert_threshold: ThermalLevel,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            update_interval: DEFAULT_INTERVAL_SECS,
            network_history_points: DEFAULT_NETWORK_HISTORY_POINTS,
            use_bits_per_second: false,
            show_core_details: true,
            show_memory_details: true,
            show_thermal_info: true,
            show_network_details: true,
            show_notifications: false,
            cpu_alert_threshold: 90.0,
            memory_alert_threshold: 85.0,
            thermal_alert_threshold: ThermalLevel::Heavy,
        }
    }
}

/// Closest allowed interval; ties go to the shorter one
pub fn snap_interval(secs: u64) -> u64 {
    ALLOWED_INTERVALS_SECS
        .iter()
        .copied()
        .min_by_key(|allowed| allowed.abs_diff(secs))
        .unwrap_or(DEFAULT_INTERVAL_SECS)
}

impl MonitorConfig {
    /// Bring every field back into its documented range.
    pub fn normalized(mut self) -> Self {
        self.version = CONFIG_VERSION;
        self.update_interval = snap_interval(self.update_interval);
        self.network_history_points = self
            .network_history_points
            .clamp(MIN_NETWORK_HISTORY_POINTS, MAX_NETWORK_HISTORY_POINTS);

        let defaults = Self::default();
        self.cpu_alert_threshold = clamp_threshold(self.cpu_alert_threshold, defaults.cpu_alert_threshold);
        self.memory_alert_threshold =
            clamp_threshold(self.memory_alert_threshold, defaults.memory_alert_threshold);
        if !matches!(
            self.thermal_alert_threshold,
            ThermalLevel::Moderate | ThermalLevel::Heavy | ThermalLevel::Trapping
        ) {
            self.thermal_alert_threshold = defaults.thermal_alert_threshold;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(snap_interval(self.update_interval))
    }

    pub fn unit_mode(&self) -> UnitMode {
        if self.use_bits_per_second {
            UnitMode::BitsPerSecond
        } else {
            UnitMode::BytesPerSecond
        }
    }

    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Parse an exported object. Only a non-object document is an error.
    pub fn import_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data).context("Config import is not valid JSON")?;
        let object = value
            .as_object()
            .context("Config import is not a settings object")?;
        Ok(Self::from_object(object))
    }

    /// Apply each known key over the defaults.
    fn from_object(object: &Map<String, Value>) -> Self {
        let mut config = Self::default();
        for (key, value) in object {
            if !config.apply_key(key, value) {
                log::debug!("Skipping config key {} with unusable value {}", key, value);
            }
        }
        config.normalized()
    }

    /// Returns false when a known key carries a value of the wrong type.
    fn apply_key(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "updateInterval" => set(&mut self.update_interval, whole_number(value)),
            "networkHistoryPoints" => set(
                &mut self.network_history_points,
                whole_number(value).and_then(|n| usize::try_from(n).ok()),
            ),
            "useBitsPerSecond" => set(&mut self.use_bits_per_second, value.as_bool()),
            "showCoreDetails" => set(&mut self.show_core_details, value.as_bool()),
            "showMemoryDetails" => set(&mut self.show_memory_details, value.as_bool()),
            "showThermalInfo" => set(&mut self.show_thermal_info, value.as_bool()),
            "showNetworkDetails" => set(&mut self.show_network_details, value.as_bool()),
            "showNotifications" => set(&mut self.show_notifications, value.as_bool()),
            "cpuAlertThreshold" => set(&mut self.cpu_alert_threshold, value.as_f64()),
            "memoryAlertThreshold" => set(&mut self.memory_alert_threshold, value.as_f64()),
            "thermalAlertThreshold" => set(
                &mut self.thermal_alert_threshold,
                value.as_str().and_then(|s| s.parse().ok()),
            ),
            _ => true,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Missing, empty or corrupted files give the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(Self::import_json(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {:?}: {:#}", path, e);
            Self::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, self.export_json()?)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("pulse").join("config.json"))
    }
}

fn set<T>(field: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            *field = value;
            true
        }
        None => false,
    }
}

/// Non-negative number, integer or float, rounded to the nearest integer
fn whole_number(value: &Value) -> Option<u64> {
    let n = value.as_f64()?;
    (n.is_finite() && n >= 0.0).then(|| n.round() as u64)
}

fn clamp_threshold(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(50.0, 100.0)
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_interval() {
        assert_eq!(snap_interval(1), 1);
        assert_eq!(snap_interval(0), 1);
        assert_eq!(snap_interval(3), 2);
        assert_eq!(snap_interval(4), 5);
        assert_eq!(snap_interval(7), 5);
        assert_eq!(snap_interval(20), 10);
        assert_eq!(snap_interval(25), 30);
        assert_eq!(snap_interval(600), 30);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = MonitorConfig::import_json(r#"{"updateInterval": 5}"#).unwrap();
        assert_eq!(config.update_interval, 5);
        assert_eq!(config.network_history_points, DEFAULT_NETWORK_HISTORY_POINTS);
        assert_eq!(config.thermal_alert_threshold, ThermalLevel::Heavy);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config =
            MonitorConfig::import_json(r#"{"launchAtLogin": true, "useBitsPerSecond": true}"#)
                .unwrap();
        assert!(config.use_bits_per_second);
        assert_eq!(config.unit_mode(), UnitMode::BitsPerSecond);
    }

    #[test]
    fn test_out_of_range_values_are_normalized() {
        let config = MonitorConfig::import_json(
            r#"{"updateInterval": 3, "networkHistoryPoints": 500, "cpuAlertThreshold": 10.0,
                "thermalAlertThreshold": "Nominal"}"#,
        )
        .unwrap();
        assert_eq!(config.update_interval, 2);
        assert_eq!(config.network_history_points, MAX_NETWORK_HISTORY_POINTS);
        assert_eq!(config.cpu_alert_threshold, 50.0);
        assert_eq!(config.thermal_alert_threshold, ThermalLevel::Heavy);
    }

    #[test]
    fn test_export_uses_camel_case_keys() {
        let json = MonitorConfig::default().export_json().unwrap();
        assert!(json.contains("\"updateInterval\": 2"));
        assert!(json.contains("\"networkHistoryPoints\": 30"));
        assert!(json.contains("\"thermalAlertThreshold\": \"Heavy\""));
    }

    #[test]
    fn test_non_object_import_fails() {
        assert!(MonitorConfig::import_json("[1, 2, 3]").is_err());
        assert!(MonitorConfig::import_json("not json").is_err());
        assert!(MonitorConfig::import_json("42").is_err());
        assert!(MonitorConfig::import_json(r#""updateInterval""#).is_err());
    }

    #[test]
    fn test_float_interval_is_accepted() {
        let config = MonitorConfig::import_json(
            r#"{"updateInterval": 2.0, "showCoreDetails": false, "networkHistoryPoints": 50.0}"#,
        )
        .unwrap();
        assert_eq!(config.update_interval, 2);
        assert!(!config.show_core_details);
        assert_eq!(config.network_history_points, 50);

        let config = MonitorConfig::import_json(r#"{"updateInterval": 9.6}"#).unwrap();
        assert_eq!(config.update_interval, 10);
    }

    #[test]
    fn test_wrong_typed_keys_are_skipped() {
        let config = MonitorConfig::import_json(
            r#"{"updateInterval": 5, "showCoreDetails": false, "thermalAlertThreshold": "Scorching"}"#,
        )
        .unwrap();
        assert_eq!(config.update_interval, 5);
        assert!(!config.show_core_details);
        assert_eq!(config.thermal_alert_threshold, ThermalLevel::Heavy);

        let config = MonitorConfig::import_json(
            r#"{"updateInterval": "fast", "showMemoryDetails": 1, "cpuAlertThreshold": 75}"#,
        )
        .unwrap();
        assert_eq!(config.update_interval, DEFAULT_INTERVAL_SECS);
        assert!(config.show_memory_details);
        assert_eq!(config.cpu_alert_threshold, 75.0);
    }
}
