use std::time::Duration;
use tracing::info;

use crate::store::CheckoutStore;

/// Периодическая уборка брошенных оформлений: пользователь ушёл со
/// страницы выбора мест и не вернулся.
pub struct CleanupService {
    store: CheckoutStore,
    ttl: Duration,
    busy_ttl: Duration,
}

impl CleanupService {
    pub fn new(store: CheckoutStore, ttl: Duration, busy_ttl: Duration) -> Self {
        Self { store, ttl, busy_ttl }
    }

    pub async fn run_cleanup(&self) -> usize {
        let removed = self.store.sweep_idle(self.ttl, self.busy_ttl).await;
        if removed == 0 {
            info!("🧹 No idle checkouts to clean up");
        } else {
            info!("🧹 Removed {} idle checkouts, {} still active", removed, self.store.len().await);
        }
        removed
    }

    /// Бесконечный цикл уборки, запускается через `tokio::spawn`.
    pub async fn run_forever(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_cleanup().await;
        }
    }
}
