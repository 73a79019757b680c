use colored::*;

use super::formatters::{format_bytes, format_rate, format_time, format_uptime, sparkline, usage_bar};
use crate::core::config::MonitorConfig;
use crate::core::system_monitor::{
    Alert, AlertSeverity, CoreDescriptor, CoreTopology, Snapshot, ThermalLevel,
};

const BAR_WIDTH: usize = 20;

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

/// Thermal level colored by severity
pub fn colored_thermal(level: ThermalLevel) -> ColoredString {
    match level {
        ThermalLevel::Nominal => level.as_str().green(),
        ThermalLevel::Moderate => level.as_str().yellow(),
        ThermalLevel::Heavy => level.as_str().bright_red(),
        ThermalLevel::Trapping | ThermalLevel::Sleeping => level.as_str().red().bold(),
        ThermalLevel::Unknown => level.as_str().dimmed(),
    }
}

fn colored_percent(percent: f64) -> ColoredString {
    let text = format!("{:5.1}%", percent);
    if percent >= 90.0 {
        text.red()
    } else if percent >= 70.0 {
        text.yellow()
    } else {
        text.normal()
    }
}

/// Print one snapshot as a compact text block
pub fn print_snapshot(snapshot: &Snapshot, config: &MonitorConfig, alerts: &[Alert]) {
    let metrics = &snapshot.metrics;
    let unit_mode = config.unit_mode();

    println!(
        "\n{} {}  {} {}",
        "PULSE".bold().bright_cyan(),
        format_time(snapshot.timestamp).dimmed(),
        "up".dimmed(),
        format_uptime(metrics.uptime_seconds)
    );
    println!("{}", "=".repeat(60));

    print_section_header("CPU");
    println!(
        "  Total  {} {}  {}",
        usage_bar(metrics.cpu_usage_percent, BAR_WIDTH),
        colored_percent(metrics.cpu_usage_percent),
        sparkline(&snapshot.history.cpu_as_u64(), 1000).dimmed()
    );
    if config.show_core_details {
        for (core, usage) in metrics.cores.iter().zip(&metrics.per_core_usage_percent) {
            let class = if core.is_efficiency_core { "E" } else { "P" };
            println!(
                "  {}{:<3}  {} {}",
                class.dimmed(),
                core.id,
                usage_bar(*usage, BAR_WIDTH),
                colored_percent(*usage)
            );
        }
    }

    print_section_header("Memory");
    let memory = &metrics.memory;
    println!(
        "  Used   {} {}  {}  {} / {}",
        usage_bar(metrics.memory_usage_percent, BAR_WIDTH),
        colored_percent(metrics.memory_usage_percent),
        sparkline(&snapshot.history.memory_as_u64(), 1000).dimmed(),
        format_bytes(memory.used_bytes()),
        format_bytes(memory.total_bytes)
    );
    if config.show_memory_details {
        println!(
            "  App {}  Wired {}  Compressed {}  Free {}",
            format_bytes(memory.app_bytes),
            format_bytes(memory.wired_bytes),
            format_bytes(memory.compressed_bytes),
            format_bytes(memory.free_bytes)
        );
    }

    if config.show_network_details {
        print_section_header("Network");
        match &metrics.network_interface {
            Some(interface) => {
                println!(
                    "  {}  {} {}  {} {}",
                    interface.cyan(),
                    "up".dimmed(),
                    format_rate(metrics.network_upload_bps, unit_mode),
                    "down".dimmed(),
                    format_rate(metrics.network_download_bps, unit_mode)
                );
                println!(
                    "  Session  {} sent, {} received",
                    format_bytes(metrics.session_upload_total),
                    format_bytes(metrics.session_download_total)
                );
            }
            None => println!("  {}", "No primary interface".dimmed()),
        }
    }

    if !metrics.top_processes.is_empty() {
        print_section_header("Top Processes");
        for process in &metrics.top_processes {
            println!(
                "  {:>7}  {:<24} {}  {}",
                process.pid,
                process.name,
                colored_percent(process.cpu_percent),
                format_bytes(process.resident_bytes)
            );
        }
    }

    if config.show_thermal_info {
        print_section_header("Thermal");
        if metrics.thermal_available {
            println!(
                "  {}  {}",
                colored_thermal(metrics.thermal_level),
                metrics.thermal_level.description().dimmed()
            );
        } else {
            println!("  {} {}", colored_thermal(ThermalLevel::Unknown), "(unavailable)".dimmed());
        }
    }

    print_section_header("GPU");
    match (metrics.gpu_usage_percent, &metrics.gpu_name) {
        (Some(usage), name) => {
            let stale = if metrics.gpu_available { "" } else { " (stale)" };
            println!(
                "  {}  {} {}{}",
                name.as_deref().unwrap_or("GPU"),
                usage_bar(usage, BAR_WIDTH),
                colored_percent(usage),
                stale.dimmed()
            );
        }
        (None, _) if !metrics.gpu_available => println!("  {}", "Not available".dimmed()),
        (None, _) => println!("  {}", "Waiting for first reading".dimmed()),
    }

    if !alerts.is_empty() {
        println!();
        for alert in alerts {
            match alert.severity {
                AlertSeverity::Critical => println!("{} {}", "CRITICAL".red().bold(), alert.message),
                AlertSeverity::Warning => println!("{} {}", "WARNING".yellow().bold(), alert.message),
            }
        }
    }
}

fn core_ids(cores: &[&CoreDescriptor]) -> String {
    cores
        .iter()
        .map(|c| c.id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print the efficiency/performance split
pub fn print_topology(topology: &CoreTopology) {
    print_section_header("Core Topology");
    println!("  Active cores: {}", topology.len());

    let efficiency: Vec<&CoreDescriptor> = topology.efficiency_cores().collect();
    let performance: Vec<&CoreDescriptor> = topology.performance_cores().collect();
    println!(
        "  {} {:>2}  [{}]",
        "Efficiency ".cyan(),
        efficiency.len(),
        core_ids(&efficiency)
    );
    println!(
        "  {} {:>2}  [{}]",
        "Performance".magenta(),
        performance.len(),
        core_ids(&performance)
    );
}
