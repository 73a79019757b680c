//! Live monitor command handler.
//!
//! Starts the metrics runtime and prints one snapshot per interval, as text or
//! as JSON lines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::config::MonitorConfig;
use crate::core::system_monitor::{evaluate_alerts, AlertConfig, MetricsRuntime};
use crate::ui::print_snapshot;

const POLL_STEP: Duration = Duration::from_millis(100);

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = MonitorConfig::load().context("Failed to load config")?;
    if let Some(&secs) = matches.get_one::<u64>("interval") {
        config.update_interval = secs;
    }
    let config = config.normalized();

    let json_output = matches.get_flag("json");
    let count = matches.get_one::<usize>("count").copied();

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let runtime = MetricsRuntime::new(config.clone()).context("Failed to start metrics runtime")?;
    let alert_config = AlertConfig::from(&config);

    if !json_output {
        println!("{}", "Press Ctrl+C to stop".dimmed());
    }

    let mut printed = 0usize;
    // Rates need two readings, so the first print waits one full interval
    while sleep_while_running(&running, config.interval()) {
        let snapshot = runtime.snapshot();

        if json_output {
            println!(
                "{}",
                serde_json::to_string(&*snapshot).context("Failed to serialize snapshot")?
            );
        } else {
            let alerts = evaluate_alerts(&snapshot.metrics, &alert_config);
            print_snapshot(&snapshot, &config, &alerts);
        }

        printed += 1;
        if count.is_some_and(|limit| printed >= limit) {
            break;
        }
    }

    runtime.shutdown();
    Ok(())
}

/// Sleep for `duration`, waking early on Ctrl+C. Returns false if interrupted.
fn sleep_while_running(running: &AtomicBool, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    while running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(POLL_STEP.min(deadline - now));
    }
    false
}
