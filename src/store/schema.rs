//! Frontier schema definition
//!
//! The whole frontier is one table. State is derived from which timestamps
//! are set, so claim, complete, and reclaim are each a single UPDATE and the
//! unique constraint is what makes discovery idempotent.

use sqlx::PgPool;

/// SQL schema for the frontier
///
/// Every statement is idempotent; applying the schema on every startup is
/// safe even with several workers racing to do it.
pub const SCHEMA_SQL: &str = r#"
-- The shared crawl frontier. One row per (project, url).
CREATE TABLE IF NOT EXISTS urls (
    id BIGSERIAL PRIMARY KEY,
    project TEXT NOT NULL,
    url TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    started_processing_at TIMESTAMPTZ,
    finished_at TIMESTAMPTZ,
    UNIQUE (project, url)
);

-- Claim scans filter on both timestamps and order by age.
CREATE INDEX IF NOT EXISTS idx_urls_queued
    ON urls (created_at)
    WHERE finished_at IS NULL AND started_processing_at IS NULL;

-- Reclaim scans and the in-flight fairness count.
CREATE INDEX IF NOT EXISTS idx_urls_in_flight
    ON urls (project, started_processing_at)
    WHERE finished_at IS NULL;
"#;

/// Applies the frontier schema to the given pool
///
/// # Arguments
///
/// * `pool` - Connection pool for the frontier database
///
/// # Returns
///
/// * `Ok(())` - Schema is in place (created now or previously)
/// * `Err(sqlx::Error)` - DDL failed
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}
