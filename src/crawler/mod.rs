//! Crawler module for claiming, fetching, and discovering URLs
//!
//! This module contains the worker pipeline, including:
//! - Claim polling against the frontier store
//! - HTTP fetching with configurable retry
//! - HTML link extraction and same-host filtering
//! - Discovery persistence and stale-claim recovery
//! - Pipeline assembly and graceful shutdown

mod fetcher;
mod metrics;
mod parser;
mod pipeline;
mod reclaimer;
mod scheduler;
mod sink;

pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use metrics::{CrawlMetrics, MetricsSnapshot};
pub use parser::extract_links;
pub use pipeline::CrawlPipeline;

use crate::config::{CrawlerConfig, ReclaimConfig};
use crate::store::FrontierStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// One claimed (project, url) pair moving through the pipeline
///
/// The same shape rides both queues: the scheduler produces units for the
/// fetchers, and the fetchers produce units (inherited project, discovered
/// URL) for the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub project: String,
    pub url: Url,
}

/// Everything a pipeline task needs, passed explicitly at spawn time
///
/// One instance is built per `crawl` invocation and shared behind an `Arc`;
/// no task reads configuration or reaches the store any other way.
pub struct CrawlContext {
    pub crawler: CrawlerConfig,
    pub reclaim: ReclaimConfig,
    pub store: Arc<dyn FrontierStore>,
    pub client: reqwest::Client,
    pub metrics: Arc<CrawlMetrics>,
    pub shutdown: CancellationToken,
}
