//! Frontier store trait and error types
//!
//! This module defines the trait interface every frontier backend implements
//! and the associated error types.

use crate::store::{ClaimedUrl, FrontierOverview, UrlRecord, UrlState};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during frontier store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to connect to frontier store: {source}")]
    Connect {
        #[source]
        source: sqlx::Error,
    },
}

/// Result type for frontier store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for frontier store backends
///
/// The frontier is the shared coordination point between any number of
/// worker processes, so every mutating operation here must be atomic and
/// idempotent in the sense documented per method. Implementations are
/// shared across tasks behind an `Arc`, hence `&self` receivers throughout.
#[async_trait]
pub trait FrontierStore: Send + Sync {
    /// Atomically claims the oldest eligible queued URL
    ///
    /// A URL is eligible when it is unclaimed, unfinished, and its project
    /// currently has fewer than `per_project_cap` URLs in flight. The claimed
    /// record gets its claim timestamp set before this method returns, so a
    /// concurrent claimant can never receive the same record.
    ///
    /// # Arguments
    ///
    /// * `per_project_cap` - Maximum in-flight URLs per project
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ClaimedUrl))` - A record was claimed
    /// * `Ok(None)` - Nothing eligible right now
    async fn claim_next(&self, per_project_cap: u32) -> StoreResult<Option<ClaimedUrl>>;

    /// Inserts a newly discovered URL, absorbing duplicates
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A new record was created
    /// * `Ok(false)` - The (project, url) pair already existed; no change
    async fn insert_discovered(&self, project: &str, url: &str) -> StoreResult<bool>;

    /// Marks a URL as finished, keeping the first completion time
    ///
    /// Repeated calls are no-ops; the original completion timestamp is never
    /// overwritten. The claim timestamp also stays untouched, so a finished
    /// record can never be reclaimed.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record transitioned to completed on this call
    /// * `Ok(false)` - Already completed (or unknown); no change
    async fn mark_completed(&self, project: &str, url: &str) -> StoreResult<bool>;

    /// Returns abandoned claims to the queue
    ///
    /// A claim is abandoned when the record is unfinished and was claimed
    /// longer ago than `older_than`. Finished records are never touched.
    ///
    /// # Returns
    ///
    /// The number of records returned to the queue
    async fn reclaim_stale(&self, older_than: Duration) -> StoreResult<u64>;

    /// Read-only aggregate counts over the whole frontier
    async fn overview(&self) -> StoreResult<FrontierOverview>;

    /// Read-only listing of the most relevant records in one state
    ///
    /// In-flight records come longest-running first; queued and completed
    /// records come newest first.
    async fn recent_urls(&self, state: UrlState, limit: i64) -> StoreResult<Vec<UrlRecord>>;
}
