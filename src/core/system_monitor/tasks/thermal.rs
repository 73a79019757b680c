//! Thermal pressure task.

use tokio::sync::{broadcast, mpsc};
use tokio::time::Duration;

use super::cpu_memory::new_ticker;
use super::SubsystemUpdate;
use crate::core::system_monitor::ThermalMapper;

pub const THERMAL_PERIOD: Duration = Duration::from_secs(3);

/// Task that polls the thermal pressure level.
///
/// Polling frequency: 3 seconds. If the source never registered, Unknown is
/// reported once and the task ends; registration is not retried.
pub async fn thermal_task(
    mut mapper: ThermalMapper,
    update_tx: mpsc::Sender<SubsystemUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    if !mapper.is_available() {
        let _ = update_tx
            .send(SubsystemUpdate::Thermal {
                level: mapper.read(),
                raw_code: None,
                available: false,
            })
            .await;
        return;
    }

    let mut ticker = new_ticker(THERMAL_PERIOD);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let level = mapper.read();
                let update = SubsystemUpdate::Thermal {
                    level,
                    raw_code: mapper.raw_code(),
                    available: true,
                };
                if update_tx.send(update).await.is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Thermal task shutting down");
                break;
            }
        }
    }
    // Dropping the mapper releases the notification token
}
