use pulse::core::config::{
    MonitorConfig, UnitMode, DEFAULT_INTERVAL_SECS, DEFAULT_NETWORK_HISTORY_POINTS,
    MIN_NETWORK_HISTORY_POINTS,
};
use pulse::core::system_monitor::ThermalLevel;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = MonitorConfig::default();
    assert_eq!(config.update_interval, DEFAULT_INTERVAL_SECS);
    assert_eq!(config.network_history_points, DEFAULT_NETWORK_HISTORY_POINTS);
    assert_eq!(config.unit_mode(), UnitMode::BytesPerSecond);
    assert_eq!(config.interval().as_secs(), 2);
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let config = MonitorConfig {
        update_interval: 10,
        network_history_points: 60,
        use_bits_per_second: true,
        show_core_details: false,
        thermal_alert_threshold: ThermalLevel::Trapping,
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let loaded = MonitorConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_load_nonexistent_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = MonitorConfig::load_from(&temp_dir.path().join("missing.json")).unwrap();
    assert_eq!(loaded, MonitorConfig::default());
}

#[test]
fn test_config_corrupt_or_empty_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    fs::write(&path, "{ not json").unwrap();
    assert_eq!(MonitorConfig::load_from(&path).unwrap(), MonitorConfig::default());

    fs::write(&path, "   \n").unwrap();
    assert_eq!(MonitorConfig::load_from(&path).unwrap(), MonitorConfig::default());
}

#[test]
fn test_import_ignores_unknown_and_defaults_missing() {
    let exported = r#"{
        "updateInterval": 30,
        "networkHistoryPoints": 5,
        "launchAtLogin": true,
        "useFahrenheit": false,
        "cpuAlertThreshold": 75
    }"#;

    let config = MonitorConfig::import_json(exported).unwrap();
    assert_eq!(config.update_interval, 30);
    assert_eq!(config.network_history_points, MIN_NETWORK_HISTORY_POINTS);
    assert_eq!(config.cpu_alert_threshold, 75.0);
    assert_eq!(config.memory_alert_threshold, 85.0);
    assert!(config.show_thermal_info);
}

#[test]
fn test_export_then_import_preserves_values() {
    let config = MonitorConfig {
        update_interval: 5,
        use_bits_per_second: true,
        ..Default::default()
    };
    let imported = MonitorConfig::import_json(&config.export_json().unwrap()).unwrap();
    assert_eq!(imported, config);
}
