//! Postgres-backed frontier store
//!
//! This is the production backend. Claims rely on `FOR UPDATE SKIP LOCKED`
//! so any number of worker processes can poll the same table without ever
//! receiving the same record twice, and without claim attempts queueing up
//! behind each other's row locks.

use crate::config::StoreConfig;
use crate::store::schema::ensure_schema;
use crate::store::traits::{FrontierStore, StoreError, StoreResult};
use crate::store::{ClaimedUrl, FrontierOverview, UrlRecord, UrlState};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Claims the oldest queued URL among projects under the in-flight cap.
///
/// The inner SELECT locks at most one candidate row; SKIP LOCKED makes
/// concurrent claimants pass over each other's candidates instead of
/// blocking, and the UPDATE publishes the claim in the same statement.
const CLAIM_SQL: &str = r#"
WITH next_url AS (
    SELECT id
    FROM urls
    WHERE finished_at IS NULL
      AND started_processing_at IS NULL
      AND project IN (
          SELECT project
          FROM urls
          WHERE finished_at IS NULL
          GROUP BY project
          HAVING COUNT(started_processing_at) < $1
      )
    ORDER BY created_at
    LIMIT 1
    FOR UPDATE SKIP LOCKED
)
UPDATE urls
SET started_processing_at = NOW()
WHERE id IN (SELECT id FROM next_url)
RETURNING project, url
"#;

const INSERT_SQL: &str = r#"
INSERT INTO urls (project, url)
VALUES ($1, $2)
ON CONFLICT (project, url) DO NOTHING
"#;

const COMPLETE_SQL: &str = r#"
UPDATE urls
SET finished_at = NOW()
WHERE project = $1 AND url = $2 AND finished_at IS NULL
"#;

const RECLAIM_SQL: &str = r#"
UPDATE urls
SET started_processing_at = NULL
WHERE finished_at IS NULL
  AND started_processing_at IS NOT NULL
  AND started_processing_at < NOW() - ($1 || ' milliseconds')::INTERVAL
"#;

const OVERVIEW_SQL: &str = r#"
SELECT
    COUNT(*) FILTER (WHERE finished_at IS NULL AND started_processing_at IS NULL) AS urls_queued,
    COUNT(*) FILTER (WHERE finished_at IS NULL AND started_processing_at IS NOT NULL) AS urls_in_flight,
    COUNT(*) FILTER (WHERE finished_at IS NOT NULL) AS urls_completed,
    COUNT(DISTINCT project) FILTER (WHERE finished_at IS NULL AND started_processing_at IS NOT NULL) AS projects_in_progress,
    COUNT(DISTINCT project) FILTER (WHERE finished_at IS NOT NULL) AS projects_completed
FROM urls
"#;

/// Postgres implementation of the frontier store
pub struct PgFrontierStore {
    pool: PgPool,
}

impl PgFrontierStore {
    /// Wraps an existing connection pool
    ///
    /// The caller is responsible for the schema; see [`ensure_schema`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the frontier database and applies the schema
    ///
    /// # Arguments
    ///
    /// * `config` - Store section of the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PgFrontierStore)` - Pool is up and the schema is in place
    /// * `Err(StoreError)` - Connection or DDL failed
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|source| StoreError::Connect { source })?;

        ensure_schema(&pool).await?;
        info!(
            max_connections = config.max_connections,
            "connected to frontier store"
        );

        Ok(Self { pool })
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FrontierStore for PgFrontierStore {
    async fn claim_next(&self, per_project_cap: u32) -> StoreResult<Option<ClaimedUrl>> {
        let claimed = sqlx::query_as::<_, ClaimedUrl>(CLAIM_SQL)
            .bind(i64::from(per_project_cap))
            .fetch_optional(&self.pool)
            .await?;
        Ok(claimed)
    }

    async fn insert_discovered(&self, project: &str, url: &str) -> StoreResult<bool> {
        let result = sqlx::query(INSERT_SQL)
            .bind(project)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_completed(&self, project: &str, url: &str) -> StoreResult<bool> {
        let result = sqlx::query(COMPLETE_SQL)
            .bind(project)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn reclaim_stale(&self, older_than: Duration) -> StoreResult<u64> {
        let result = sqlx::query(RECLAIM_SQL)
            .bind(older_than.as_millis().to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn overview(&self) -> StoreResult<FrontierOverview> {
        let overview = sqlx::query_as::<_, FrontierOverview>(OVERVIEW_SQL)
            .fetch_one(&self.pool)
            .await?;
        Ok(overview)
    }

    async fn recent_urls(&self, state: UrlState, limit: i64) -> StoreResult<Vec<UrlRecord>> {
        // In-flight listings surface the longest-running claims first; the
        // other two show the newest activity.
        let sql = match state {
            UrlState::Queued => {
                "SELECT project, url, created_at, started_processing_at, finished_at \
                 FROM urls \
                 WHERE finished_at IS NULL AND started_processing_at IS NULL \
                 ORDER BY created_at DESC LIMIT $1"
            }
            UrlState::InFlight => {
                "SELECT project, url, created_at, started_processing_at, finished_at \
                 FROM urls \
                 WHERE finished_at IS NULL AND started_processing_at IS NOT NULL \
                 ORDER BY started_processing_at ASC LIMIT $1"
            }
            UrlState::Completed => {
                "SELECT project, url, created_at, started_processing_at, finished_at \
                 FROM urls \
                 WHERE finished_at IS NOT NULL \
                 ORDER BY finished_at DESC LIMIT $1"
            }
        };

        let records = sqlx::query_as::<_, UrlRecord>(sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }
}
