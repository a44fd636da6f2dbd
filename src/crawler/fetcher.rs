//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the worker, including:
//! - Building the shared HTTP client
//! - GET requests with configurable retry
//! - Outcome classification (HTML, non-HTML, failure)
//! - Same-host link forwarding into the discovered queue
//!
//! A fetcher never decides a unit's fate twice: whatever the outcome, the
//! unit is marked completed exactly once at the end of processing. Losing
//! links on a failed fetch is accepted; losing the completion is not.

use crate::config::CrawlerConfig;
use crate::crawler::parser::extract_links;
use crate::crawler::{CrawlContext, WorkUnit};
use crate::url::same_host;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// Result of fetching one page
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with an HTML body
    Html {
        /// Page body content
        body: String,
    },

    /// 2xx response that is not HTML (Content-Type mismatch)
    NotHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Transport error, timeout, or non-2xx status
    Failed {
        /// Error description
        reason: String,
    },
}

/// Builds the HTTP client shared by all fetcher tasks
///
/// Redirects follow the client default (up to 10 hops); links are resolved
/// against the claimed URL, not the post-redirect one, so a redirecting site
/// cannot widen the crawl scope.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.fetch_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and classifies the outcome
async fn fetch_once(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                e.to_string()
            };
            return FetchOutcome::Failed { reason };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::Failed {
            reason: format!("HTTP {status}"),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // A missing Content-Type gets the benefit of the doubt.
    if !content_type.is_empty() && !content_type.contains("text/html") {
        return FetchOutcome::NotHtml { content_type };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Html { body },
        Err(e) => FetchOutcome::Failed {
            reason: format!("failed to read body: {e}"),
        },
    }
}

/// Fetches a URL with up to `max_attempts` tries
///
/// Only failures are retried; the delay doubles after each attempt. With
/// `max_attempts` of 1 (the default) this is a single try with no retry.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_attempts` - Total attempts, not additional retries
/// * `retry_delay` - Delay before the first retry
pub async fn fetch_page(
    client: &Client,
    url: &str,
    max_attempts: u32,
    retry_delay: Duration,
) -> FetchOutcome {
    let mut delay = retry_delay;
    let mut attempt = 1;

    loop {
        let outcome = fetch_once(client, url).await;
        match &outcome {
            FetchOutcome::Failed { reason } if attempt < max_attempts => {
                debug!(url, attempt, reason, "fetch attempt failed; retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            _ => return outcome,
        }
    }
}

/// Fetcher task: consumes claimed units, emits same-host discoveries
///
/// Several fetchers can run against the same pair of queues; each unit is
/// processed by exactly one of them.
pub(crate) struct Fetcher {
    pub id: u32,
    pub ctx: Arc<CrawlContext>,
    pub to_crawl: flume::Receiver<WorkUnit>,
    pub discovered: flume::Sender<WorkUnit>,
}

impl Fetcher {
    /// Runs until the to-crawl queue is closed and drained
    ///
    /// Shutdown rides the channel: the scheduler dropping its sender is the
    /// signal, so units already claimed into the queue still get processed
    /// instead of waiting out a reclaim timeout.
    pub async fn run(self) {
        debug!(fetcher = self.id, "fetcher started");
        while let Ok(unit) = self.to_crawl.recv_async().await {
            self.process(unit).await;
        }
        debug!(fetcher = self.id, "fetcher stopped");
    }

    async fn process(&self, unit: WorkUnit) {
        let outcome = fetch_page(
            &self.ctx.client,
            unit.url.as_str(),
            self.ctx.crawler.max_fetch_attempts,
            self.ctx.crawler.retry_delay(),
        )
        .await;

        match outcome {
            FetchOutcome::Html { body } => {
                self.ctx.metrics.record_page_fetched();
                let links = extract_links(&body, &unit.url);
                self.ctx.metrics.record_links_extracted(links.len());
                trace!(url = %unit.url, links = links.len(), "page fetched");
                self.forward_same_host(&unit, links).await;
            }
            FetchOutcome::NotHtml { content_type } => {
                self.ctx.metrics.record_page_fetched();
                debug!(url = %unit.url, content_type, "not HTML; nothing to extract");
            }
            FetchOutcome::Failed { reason } => {
                self.ctx.metrics.record_fetch_failure();
                warn!(url = %unit.url, reason, "fetch failed; unit will still be completed");
            }
        }

        // Completion is unconditional. A unit that failed to fetch must not
        // return to the queue, or a dead URL would cycle forever.
        match self
            .ctx
            .store
            .mark_completed(&unit.project, unit.url.as_str())
            .await
        {
            Ok(true) => trace!(url = %unit.url, "marked completed"),
            Ok(false) => debug!(url = %unit.url, "completion matched no open record"),
            Err(e) => {
                self.ctx.metrics.record_store_error();
                warn!(url = %unit.url, error = %e, "failed to mark completed");
            }
        }
    }

    async fn forward_same_host(&self, unit: &WorkUnit, links: Vec<Url>) {
        for link in links {
            if !same_host(&unit.url, &link) {
                trace!(link = %link, "cross-host link skipped");
                continue;
            }

            let discovery = WorkUnit {
                project: unit.project.clone(),
                url: link,
            };
            if self.discovered.send_async(discovery).await.is_err() {
                warn!(
                    fetcher = self.id,
                    "discovery queue closed; dropping remaining links"
                );
                break;
            }
        }
    }
}
