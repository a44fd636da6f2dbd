//! Stale-claim recovery
//!
//! A worker that dies between claiming a URL and completing it leaves the
//! row in-flight forever, invisible to every scheduler. The reclaimer runs
//! alongside the pipeline and periodically clears claim timestamps older
//! than the configured age, putting those rows back in line.
//!
//! The first scan fires immediately on startup, so a worker restarting
//! after a crash recovers its own abandoned claims without waiting a full
//! scan interval.

use crate::crawler::CrawlContext;
use crate::store::FrontierStore;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Background task that requeues abandoned claims
pub(crate) struct Reclaimer {
    pub ctx: Arc<CrawlContext>,
}

impl Reclaimer {
    /// Runs scans on the configured interval until shutdown
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.ctx.reclaim.scan_interval());
        debug!("reclaimer started");
        loop {
            tokio::select! {
                _ = self.ctx.shutdown.cancelled() => break,
                _ = ticker.tick() => self.scan().await,
            }
        }
        debug!("reclaimer stopped");
    }

    async fn scan(&self) {
        match self
            .ctx
            .store
            .reclaim_stale(self.ctx.reclaim.timeout())
            .await
        {
            Ok(0) => trace!("no stale claims"),
            Ok(count) => {
                self.ctx.metrics.record_reclaimed(count);
                info!(count, "requeued stale claims");
            }
            Err(e) => {
                self.ctx.metrics.record_store_error();
                warn!(error = %e, "reclaim scan failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, ReclaimConfig};
    use crate::crawler::CrawlMetrics;
    use crate::store::{MemoryStore, UrlState};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn create_test_context(store: Arc<MemoryStore>, reclaim: ReclaimConfig) -> Arc<CrawlContext> {
        Arc::new(CrawlContext {
            crawler: CrawlerConfig::default(),
            reclaim,
            store,
            client: reqwest::Client::new(),
            metrics: Arc::new(CrawlMetrics::new()),
            shutdown: CancellationToken::new(),
        })
    }

    #[tokio::test]
    async fn test_stale_claim_is_requeued() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_discovered("demo", "https://example.com/a")
            .await
            .unwrap();
        store.claim_next(2).await.unwrap();

        // Zero timeout makes any claim stale on the immediate first scan.
        let reclaim = ReclaimConfig {
            timeout_secs: 0,
            scan_interval_secs: 1,
        };
        let ctx = create_test_context(store.clone(), reclaim);
        let reclaimer = Reclaimer { ctx: ctx.clone() };
        let handle = tokio::spawn(reclaimer.run());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let record = store.get("demo", "https://example.com/a").unwrap();
            if record.state() == UrlState::Queued {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "claim was never requeued"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        ctx.shutdown.cancel();
        handle.await.unwrap();
        assert!(ctx.metrics.snapshot().urls_reclaimed >= 1);
    }

    #[tokio::test]
    async fn test_reclaimer_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let ctx = create_test_context(store, ReclaimConfig::default());
        let reclaimer = Reclaimer { ctx: ctx.clone() };
        let handle = tokio::spawn(reclaimer.run());

        ctx.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reclaimer should stop promptly")
            .unwrap();
    }
}
