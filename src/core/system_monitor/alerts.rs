//! Alert evaluation for resource thresholds.
//!
//! Checks the published metrics against the configured thresholds. Delivering
//! the alerts (notifications, badges) is left to the presentation layer.

use super::metrics::DerivedMetrics;
use super::thermal::ThermalLevel;
use crate::core::config::MonitorConfig;
use serde::{Deserialize, Serialize};

/// Alert configuration with thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub cpu_threshold: f64,    // percent
    pub memory_threshold: f64, // percent
    pub thermal_threshold: ThermalLevel,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for AlertConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            cpu_threshold: config.cpu_alert_threshold,
            memory_threshold: config.memory_alert_threshold,
            thermal_threshold: config.thermal_alert_threshold,
        }
    }
}

/// An individual alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCategory {
    Cpu,
    Memory,
    Thermal,
}

/// Readings this far past a percentage threshold are critical
const CRITICAL_MARGIN: f64 = 5.0;

fn percent_severity(value: f64, threshold: f64) -> Option<AlertSeverity> {
    if value >= (threshold + CRITICAL_MARGIN).min(100.0) {
        Some(AlertSeverity::Critical)
    } else if value >= threshold {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

/// Evaluate the metrics and generate alerts
pub fn evaluate_alerts(metrics: &DerivedMetrics, config: &AlertConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(severity) = percent_severity(metrics.cpu_usage_percent, config.cpu_threshold) {
        alerts.push(Alert {
            severity,
            category: AlertCategory::Cpu,
            message: format!(
                "CPU usage at {:.1}% (threshold: {:.0}%)",
                metrics.cpu_usage_percent, config.cpu_threshold
            ),
            value: metrics.cpu_usage_percent,
            threshold: config.cpu_threshold,
        });
    }

    if let Some(severity) =
        percent_severity(metrics.memory_usage_percent, config.memory_threshold)
    {
        alerts.push(Alert {
            severity,
            category: AlertCategory::Memory,
            message: format!(
                "Memory usage at {:.1}% (threshold: {:.0}%)",
                metrics.memory_usage_percent, config.memory_threshold
            ),
            value: metrics.memory_usage_percent,
            threshold: config.memory_threshold,
        });
    }

    // Unknown never alerts
    if let (Some(level), Some(threshold)) = (
        metrics.thermal_level.severity(),
        config.thermal_threshold.severity(),
    ) {
        if level >= threshold {
            let severity = if matches!(
                metrics.thermal_level,
                ThermalLevel::Trapping | ThermalLevel::Sleeping
            ) {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(Alert {
                severity,
                category: AlertCategory::Thermal,
                message: format!(
                    "Thermal pressure {}: {}",
                    metrics.thermal_level,
                    metrics.thermal_level.description()
                ),
                value: metrics.thermal_level.pressure_percent(),
                threshold: config.thermal_threshold.pressure_percent(),
            });
        }
    }

    alerts
}
