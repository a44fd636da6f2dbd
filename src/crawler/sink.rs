//! Discovery sink persisting extracted links
//!
//! All fetchers funnel their same-host discoveries into one sink task, which
//! inserts them into the shared frontier. Duplicates are the common case on
//! real sites and are absorbed by the store's conflict handling, so the sink
//! only distinguishes new from already-known for the counters.

use crate::crawler::{CrawlContext, WorkUnit};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Sink task: drains the discovered queue into the store
pub(crate) struct DiscoverySink {
    pub ctx: Arc<CrawlContext>,
    pub discovered: flume::Receiver<WorkUnit>,
}

impl DiscoverySink {
    /// Runs until the discovered queue is closed and drained
    ///
    /// The queue closes once every fetcher has dropped its sender, so the
    /// sink is always the last pipeline stage to finish. It deliberately
    /// ignores shutdown: discoveries already extracted are persisted rather
    /// than thrown away.
    pub async fn run(self) {
        debug!("discovery sink started");
        while let Ok(unit) = self.discovered.recv_async().await {
            match self
                .ctx
                .store
                .insert_discovered(&unit.project, unit.url.as_str())
                .await
            {
                Ok(true) => {
                    self.ctx.metrics.record_discovery_inserted();
                    trace!(project = %unit.project, url = %unit.url, "discovered");
                }
                Ok(false) => {
                    self.ctx.metrics.record_discovery_duplicate();
                    trace!(url = %unit.url, "already known");
                }
                Err(e) => {
                    self.ctx.metrics.record_store_error();
                    warn!(url = %unit.url, error = %e, "failed to persist discovery");
                }
            }
        }
        debug!("discovery sink stopped");
    }
}
