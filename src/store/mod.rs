//! Frontier store module
//!
//! This module handles all persistence for the crawl frontier, including:
//! - The shared `urls` table that coordinates every worker process
//! - Atomic claim semantics (claim, complete, reclaim)
//! - Idempotent discovery inserts
//! - Read-only queries behind the `status` report
//!
//! Record state is derived from timestamp nullability, never stored: a row
//! with no claim timestamp is queued, a claimed-but-unfinished row is in
//! flight, and a finished row is completed.

mod memory;
mod postgres;
mod schema;
mod traits;

pub use memory::MemoryStore;
pub use postgres::PgFrontierStore;
pub use schema::{ensure_schema, SCHEMA_SQL};
pub use traits::{FrontierStore, StoreError, StoreResult};

use chrono::{DateTime, Utc};

/// A record claimed from the frontier, ready to fetch
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ClaimedUrl {
    pub project: String,
    pub url: String,
}

/// A full frontier record as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UrlRecord {
    pub project: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub started_processing_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// The derived state of this record
    pub fn state(&self) -> UrlState {
        if self.finished_at.is_some() {
            UrlState::Completed
        } else if self.started_processing_at.is_some() {
            UrlState::InFlight
        } else {
            UrlState::Queued
        }
    }
}

/// Derived lifecycle state of a frontier record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Discovered but not yet handed to any fetcher
    Queued,
    /// Claimed by some worker, fetch pending or running
    InFlight,
    /// Processed; terminal regardless of fetch success
    Completed,
}

impl UrlState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in-flight",
            Self::Completed => "completed",
        }
    }

    /// Returns true if no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Aggregate counts for the whole frontier
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct FrontierOverview {
    pub urls_queued: i64,
    pub urls_in_flight: i64,
    pub urls_completed: i64,
    /// Projects with at least one URL currently in flight
    pub projects_in_progress: i64,
    /// Projects with at least one completed URL
    pub projects_completed: i64,
}

impl FrontierOverview {
    pub fn total_urls(&self) -> i64 {
        self.urls_queued + self.urls_in_flight + self.urls_completed
    }
}
