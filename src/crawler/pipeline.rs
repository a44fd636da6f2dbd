//! Pipeline assembly and lifecycle
//!
//! A pipeline is four kinds of task wired together by two bounded queues:
//!
//! ```text
//! store -> scheduler -> [to-crawl] -> fetchers -> [discovered] -> sink -> store
//!                                     reclaimer ---------------------------^
//! ```
//!
//! Shutdown starts at the cancellation token and then rides the queues. The
//! scheduler stops claiming and drops its sender; the fetchers drain what was
//! already claimed and drop theirs; the sink drains the discoveries and
//! exits. Only the scheduler and reclaimer watch the token directly, so a
//! claimed unit is either fully processed during the drain or left for a
//! reclaimer to requeue.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::reclaimer::Reclaimer;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::sink::DiscoverySink;
use crate::crawler::{CrawlContext, CrawlMetrics, MetricsSnapshot, WorkUnit};
use crate::store::FrontierStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// One worker's crawl pipeline over a shared frontier store
///
/// The pipeline runs until its shutdown token is cancelled; an empty
/// frontier means idle polling, not exit, because sibling workers may still
/// be producing discoveries.
///
/// # Example
///
/// ```no_run
/// use crawld::{Config, CrawlPipeline, MemoryStore};
/// use std::sync::Arc;
///
/// # async fn example(config: Config) -> crawld::Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let pipeline = CrawlPipeline::new(&config, store)?;
/// let shutdown = pipeline.shutdown_token();
/// tokio::spawn(async move {
///     tokio::signal::ctrl_c().await.ok();
///     shutdown.cancel();
/// });
/// let summary = pipeline.run().await?;
/// println!("fetched {} pages", summary.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub struct CrawlPipeline {
    ctx: Arc<CrawlContext>,
}

impl CrawlPipeline {
    /// Creates a pipeline over the given store
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `store` - The shared frontier store
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlPipeline)` - Ready to run
    /// * `Err(CrawldError)` - The HTTP client could not be built
    pub fn new(config: &Config, store: Arc<dyn FrontierStore>) -> crate::Result<Self> {
        let client = build_http_client(&config.crawler)?;
        let ctx = Arc::new(CrawlContext {
            crawler: config.crawler.clone(),
            reclaim: config.reclaim.clone(),
            store,
            client,
            metrics: Arc::new(CrawlMetrics::new()),
            shutdown: CancellationToken::new(),
        });
        Ok(Self { ctx })
    }

    /// Token that stops the pipeline when cancelled
    ///
    /// Clone it out before calling [`run`](Self::run); cancelling is safe
    /// from any task or signal handler.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.ctx.shutdown.clone()
    }

    /// Current counter values; callable while the pipeline runs
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// Runs all tasks to completion and returns the final counters
    pub async fn run(self) -> crate::Result<MetricsSnapshot> {
        let (crawl_tx, crawl_rx) = flume::bounded::<WorkUnit>(self.ctx.crawler.to_crawl_capacity);
        let (found_tx, found_rx) = flume::bounded::<WorkUnit>(self.ctx.crawler.discovered_capacity);

        info!(
            fetchers = self.ctx.crawler.fetchers,
            per_project_cap = self.ctx.crawler.per_project_cap,
            "starting crawl pipeline"
        );

        let mut handles = Vec::new();
        handles.push(tokio::spawn(
            Scheduler {
                ctx: self.ctx.clone(),
                to_crawl: crawl_tx,
            }
            .run(),
        ));

        for id in 0..self.ctx.crawler.fetchers {
            handles.push(tokio::spawn(
                Fetcher {
                    id,
                    ctx: self.ctx.clone(),
                    to_crawl: crawl_rx.clone(),
                    discovered: found_tx.clone(),
                }
                .run(),
            ));
        }

        // The spawned tasks now hold the only senders and receivers that
        // matter; dropping the originals lets disconnection cascade from
        // stage to stage during shutdown.
        drop(crawl_rx);
        drop(found_tx);

        handles.push(tokio::spawn(
            DiscoverySink {
                ctx: self.ctx.clone(),
                discovered: found_rx,
            }
            .run(),
        ));
        handles.push(tokio::spawn(
            Reclaimer {
                ctx: self.ctx.clone(),
            }
            .run(),
        ));

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "pipeline task panicked");
            }
        }

        let snapshot = self.ctx.metrics.snapshot();
        info!(
            pages_fetched = snapshot.pages_fetched,
            fetch_failures = snapshot.fetch_failures,
            links_extracted = snapshot.links_extracted,
            discovered_inserted = snapshot.discovered_inserted,
            discovered_duplicate = snapshot.discovered_duplicate,
            urls_reclaimed = snapshot.urls_reclaimed,
            store_errors = snapshot.store_errors,
            "crawl pipeline stopped"
        );
        Ok(snapshot)
    }
}
