// src/scheduler.rs
use tokio::task::JoinHandle;

use crate::monitor::BrandMonitor;

/// Spawn the interval trigger for one brand's monitor. Ticks are sequential
/// (no overlapping runs); retry/backoff is not this loop's business — a
/// failed run is logged and the next tick starts fresh.
pub fn spawn_monitor_loop(monitor: BrandMonitor, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            match monitor.run().await {
                Ok(report) => {
                    tracing::info!(
                        target: "monitor",
                        brand = %report.brand,
                        new = report.new,
                        delivered = report.notify_delivered,
                        "scheduled run finished"
                    );
                }
                Err(e) => {
                    // Seen-store outage: the run was aborted before notifying.
                    tracing::error!(target: "monitor", brand = monitor.brand(), error = ?e, "scheduled run aborted");
                }
            }
        }
    })
}
