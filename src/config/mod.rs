//! Configuration module for crawld
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawld::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawld.toml")).unwrap();
//! println!("Scheduler polls every {}ms", config.crawler.poll_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ReclaimConfig, StoreConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
