//! Crawld: a project-scoped crawler around a shared crawl frontier
//!
//! This crate implements a web crawler whose unit of work is a (project, url)
//! pair and whose coordination point is a persistent frontier store. Any
//! number of worker processes can share one store; atomic claim semantics in
//! the store keep them from stepping on each other without any direct
//! inter-process communication.

pub mod config;
pub mod crawler;
pub mod monitor;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for crawld operations
#[derive(Debug, Error)]
pub enum CrawldError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { scheme: String, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for crawld operations
pub type Result<T> = std::result::Result<T, CrawldError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlPipeline, MetricsSnapshot, WorkUnit};
pub use store::{FrontierStore, MemoryStore, PgFrontierStore, UrlState};
