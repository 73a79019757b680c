//! Network monitoring task.

use tokio::sync::{broadcast, mpsc};
use tokio::time::{Duration, Instant};

use super::cpu_memory::new_ticker;
use super::SubsystemUpdate;
use crate::core::system_monitor::NetworkRateEngine;
use crate::platform::NetworkSource;

/// Fixed network cadence, independent of the configured interval
pub const NETWORK_PERIOD: Duration = Duration::from_secs(1);

/// Task that monitors the primary network interface.
///
/// Polling frequency: 1 second. The primary interface is looked up on every
/// tick so a route change drops the baseline before the next delta.
pub async fn network_task(
    mut source: Box<dyn NetworkSource>,
    update_tx: mpsc::Sender<SubsystemUpdate>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::debug!("Network task started");

    let mut engine = NetworkRateEngine::new();
    let mut ticker = new_ticker(NETWORK_PERIOD);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(interface) = source.primary_interface() else {
                    log::debug!("No primary network interface");
                    engine.reset();
                    continue;
                };

                let counters = match source.interface_counters(&interface) {
                    Ok(counters) => counters,
                    Err(e) => {
                        log::debug!("Interface counters unavailable for {}: {}", interface, e);
                        engine.observe_interface(&interface);
                        continue;
                    }
                };

                let rate = engine.update(&interface, counters, Instant::now().into_std());
                let update = SubsystemUpdate::Network {
                    interface,
                    rate,
                    session_upload_total: engine.session_upload_total(),
                    session_download_total: engine.session_download_total(),
                };
                if update_tx.send(update).await.is_err() {
                    break;
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Network task shutting down");
                break;
            }
        }
    }
}
