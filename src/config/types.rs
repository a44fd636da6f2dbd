use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for crawld
///
/// Every field outside `[store]` has a default, so a minimal config is just
/// the store URL. Workers sharing one store should share one config file;
/// the loader's hash makes drift visible in the logs.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub reclaim: ReclaimConfig,
}

/// Frontier store connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Postgres connection string for the shared frontier
    pub url: String,

    /// Connection pool size
    #[serde(rename = "max-connections", default = "default_max_connections")]
    pub max_connections: u32,
}

/// Crawler pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of fetcher tasks consuming the to-crawl queue
    #[serde(default = "default_fetchers")]
    pub fetchers: u32,

    /// Maximum in-flight URLs per project across all workers
    #[serde(rename = "per-project-cap", default = "default_per_project_cap")]
    pub per_project_cap: u32,

    /// Scheduler sleep between claim attempts when the frontier is idle (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout for page fetches (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Attempts per unit before giving up; 1 means no retries
    #[serde(rename = "max-fetch-attempts", default = "default_max_fetch_attempts")]
    pub max_fetch_attempts: u32,

    /// Base delay between fetch attempts, doubled per retry (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Capacity of the claimed-to-fetch queue
    #[serde(rename = "to-crawl-capacity", default = "default_to_crawl_capacity")]
    pub to_crawl_capacity: usize,

    /// Capacity of the discovered-links queue
    #[serde(rename = "discovered-capacity", default = "default_discovered_capacity")]
    pub discovered_capacity: usize,

    /// User-Agent header sent with every fetch
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Stale-claim recovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReclaimConfig {
    /// Age after which an unfinished claim is considered abandoned (seconds)
    #[serde(rename = "timeout-secs", default = "default_reclaim_timeout_secs")]
    pub timeout_secs: u64,

    /// How often the reclaimer scans for abandoned claims (seconds)
    #[serde(rename = "scan-interval-secs", default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl CrawlerConfig {
    /// Scheduler idle poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Base retry delay as a `Duration`
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl ReclaimConfig {
    /// Claim age threshold as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Scan interval as a `Duration`
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetchers: default_fetchers(),
            per_project_cap: default_per_project_cap(),
            poll_interval_ms: default_poll_interval_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_fetch_attempts: default_max_fetch_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            to_crawl_capacity: default_to_crawl_capacity(),
            discovered_capacity: default_discovered_capacity(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_reclaim_timeout_secs(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_fetchers() -> u32 {
    1
}

fn default_per_project_cap() -> u32 {
    2
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_fetch_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_to_crawl_capacity() -> usize {
    12
}

fn default_discovered_capacity() -> usize {
    32
}

fn default_user_agent() -> String {
    concat!("crawld/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_reclaim_timeout_secs() -> u64 {
    300
}

fn default_scan_interval_secs() -> u64 {
    300
}
