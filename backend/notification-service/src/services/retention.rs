//! Periodic retention sweep
//!
//! Deletes notifications older than the configured retention window. Runs
//! until the shutdown signal flips; failures are logged and the next tick
//! tries again.

use crate::services::NotificationService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

pub async fn run_retention_sweep(
    service: Arc<NotificationService>,
    retention_days: i64,
    sweep_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(sweep_interval);
    // The first tick fires immediately; skip it so boot is quiet
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("Retention sweep shutting down");
                    return;
                }
            }
            _ = ticker.tick() => {
                match service.delete_older_than(retention_days).await {
                    Ok(deleted) if deleted > 0 => {
                        info!(deleted, retention_days, "Retention sweep removed old notifications");
                    }
                    Ok(_) => {}
                    Err(e) => error!("Retention sweep failed: {}", e),
                }
            }
        }
    }
}
