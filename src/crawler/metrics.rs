//! Pipeline counters
//!
//! Every task increments these shared atomics instead of keeping private
//! tallies, so the final summary reflects the whole pipeline and tests can
//! assert on concrete counts rather than scraping log output.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters updated by the pipeline tasks
#[derive(Debug, Default)]
pub struct CrawlMetrics {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    links_extracted: AtomicU64,
    discovered_inserted: AtomicU64,
    discovered_duplicate: AtomicU64,
    store_errors: AtomicU64,
    urls_reclaimed: AtomicU64,
}

impl CrawlMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links_extracted(&self, count: usize) {
        self.links_extracted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_discovery_inserted(&self) {
        self.discovered_inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discovery_duplicate(&self) {
        self.discovered_duplicate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reclaimed(&self, count: u64) {
        self.urls_reclaimed.fetch_add(count, Ordering::Relaxed);
    }

    /// A consistent-enough copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            links_extracted: self.links_extracted.load(Ordering::Relaxed),
            discovered_inserted: self.discovered_inserted.load(Ordering::Relaxed),
            discovered_duplicate: self.discovered_duplicate.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            urls_reclaimed: self.urls_reclaimed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub links_extracted: u64,
    pub discovered_inserted: u64,
    pub discovered_duplicate: u64,
    pub store_errors: u64,
    pub urls_reclaimed: u64,
}

impl MetricsSnapshot {
    /// Units that went through a fetch attempt, successful or not
    pub fn units_processed(&self) -> u64 {
        self.pages_fetched + self.fetch_failures
    }
}
