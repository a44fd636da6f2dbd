//! Claim scheduler feeding the fetcher queue
//!
//! This module is the single point where rows leave the shared frontier and
//! enter this worker's pipeline. The scheduler:
//! - Polls the store for the next claimable URL, honoring the per-project cap
//! - Parses the stored text back into a `Url` for the fetchers
//! - Retires stored URLs that no longer parse so they cannot wedge the queue
//! - Backs off for one poll interval when the frontier is idle or erroring
//!
//! Claiming is what bounds the blast radius of a crash: a URL is only claimed
//! right before it is enqueued locally, so at most `to-crawl-capacity` plus
//! in-flight fetches can ever be stranded for the reclaimer.

use crate::crawler::{CrawlContext, WorkUnit};
use crate::store::{ClaimedUrl, FrontierStore};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// Scheduler task: claims URLs from the store and feeds the to-crawl queue
///
/// Exactly one scheduler runs per worker process. Multiple workers sharing
/// one store coordinate through the claim query alone, never through each
/// other.
pub(crate) struct Scheduler {
    pub ctx: Arc<CrawlContext>,
    pub to_crawl: flume::Sender<WorkUnit>,
}

impl Scheduler {
    /// Runs until shutdown is requested or the fetchers are gone
    ///
    /// Dropping `to_crawl` on exit is the shutdown signal for the fetchers;
    /// they drain whatever this task already enqueued before stopping.
    pub async fn run(self) {
        debug!("scheduler started");
        loop {
            if self.ctx.shutdown.is_cancelled() {
                break;
            }

            match self
                .ctx
                .store
                .claim_next(self.ctx.crawler.per_project_cap)
                .await
            {
                Ok(Some(claimed)) => {
                    if !self.dispatch(claimed).await {
                        break;
                    }
                }
                Ok(None) => {
                    trace!("nothing claimable; sleeping");
                    if !self.idle().await {
                        break;
                    }
                }
                Err(e) => {
                    self.ctx.metrics.record_store_error();
                    warn!(error = %e, "claim query failed; backing off");
                    if !self.idle().await {
                        break;
                    }
                }
            }
        }
        info!("scheduler stopped");
    }

    /// Parses a claimed row and hands it to the fetchers
    ///
    /// Returns `false` when the loop should stop: shutdown arrived mid-send,
    /// or the queue is closed because every fetcher has exited. A claim
    /// stranded by shutdown here is recovered later by the reclaimer.
    async fn dispatch(&self, claimed: ClaimedUrl) -> bool {
        let url = match Url::parse(&claimed.url) {
            Ok(url) => url,
            Err(e) => {
                // Left unfinished this row would be claimed again on every
                // poll, so retire it using the stored text as-is.
                error!(url = %claimed.url, error = %e, "claimed URL does not parse; retiring it");
                if let Err(e) = self
                    .ctx
                    .store
                    .mark_completed(&claimed.project, &claimed.url)
                    .await
                {
                    self.ctx.metrics.record_store_error();
                    warn!(url = %claimed.url, error = %e, "failed to retire unparseable URL");
                }
                return true;
            }
        };

        trace!(project = %claimed.project, url = %url, "claimed");
        let unit = WorkUnit {
            project: claimed.project,
            url,
        };

        let unit_url = unit.url.clone();
        tokio::select! {
            _ = self.ctx.shutdown.cancelled() => {
                debug!(url = %unit_url, "shutdown during dispatch; claim left for the reclaimer");
                false
            }
            sent = self.to_crawl.send_async(unit) => sent.is_ok(),
        }
    }

    /// Sleeps one poll interval; returns `false` if shutdown arrives first
    async fn idle(&self) -> bool {
        tokio::select! {
            _ = self.ctx.shutdown.cancelled() => false,
            _ = tokio::time::sleep(self.ctx.crawler.poll_interval()) => true,
        }
    }
}
