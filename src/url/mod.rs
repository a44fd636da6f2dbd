//! URL handling module for crawld
//!
//! This module provides href resolution against a page URL and the
//! exact-host comparison that keeps a crawl inside its seed's site.

mod resolve;

// Re-export main functions
pub use resolve::{resolve_href, same_host};
