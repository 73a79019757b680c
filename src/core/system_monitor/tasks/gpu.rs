//! GPU monitoring task.

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Duration;

use super::cpu_memory::new_ticker;
use super::SubsystemUpdate;
use crate::core::config::MonitorConfig;
use crate::core::system_monitor::{GpuReader, GpuReading};

/// Task that monitors GPU utilization.
///
/// Polling frequency: `updateInterval`, backing off exponentially after a
/// failed read. The task ends once the reader gives up on the device.
pub async fn gpu_task(
    mut reader: GpuReader,
    update_tx: mpsc::Sender<SubsystemUpdate>,
    mut config_rx: watch::Receiver<MonitorConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    if !reader.is_available() {
        let _ = update_tx.send(SubsystemUpdate::GpuUnavailable).await;
        return;
    }

    let mut period = config_rx.borrow_and_update().interval();
    let mut ticker = new_ticker(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match reader.poll() {
                    GpuReading::Updated(metrics) => {
                        if let Err(e) = update_tx.send(SubsystemUpdate::Gpu(metrics)).await {
                            log::error!("Failed to send GPU update: {}", e);
                            break;
                        }
                    }
                    GpuReading::Unchanged => {
                        let backoff = Duration::from_secs(2u64.pow(reader.consecutive_failures().min(5)));
                        ticker.reset_after(backoff);
                    }
                    GpuReading::Unavailable => {
                        let _ = update_tx.send(SubsystemUpdate::GpuUnavailable).await;
                        break;
                    }
                }
            }
            Ok(()) = config_rx.changed() => {
                let next = config_rx.borrow_and_update().interval();
                if next != period {
                    period = next;
                    ticker = new_ticker(period);
                }
            }
            _ = shutdown.recv() => {
                log::debug!("GPU task shutting down");
                break;
            }
        }
    }
}
