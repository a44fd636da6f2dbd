//! In-memory frontier store
//!
//! Implements the same claim semantics as the Postgres backend behind a
//! process-local mutex. Used heavily by the test suite; also usable for
//! single-process experiments where standing up Postgres is not worth it.
//! It cannot coordinate multiple worker processes.

use crate::store::traits::{FrontierStore, StoreResult};
use crate::store::{ClaimedUrl, FrontierOverview, UrlRecord, UrlState};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Mutex-guarded frontier kept in insertion order
///
/// Insertion order doubles as `created_at` order, so the oldest-first scan
/// is a plain front-to-back walk.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<UrlRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out every record, in insertion order
    ///
    /// Test support; the trait surface has no full-table read.
    pub fn snapshot(&self) -> Vec<UrlRecord> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Looks up a single record by its identity
    pub fn get(&self, project: &str, url: &str) -> Option<UrlRecord> {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|r| r.project == project && r.url == url)
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<UrlRecord>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FrontierStore for MemoryStore {
    async fn claim_next(&self, per_project_cap: u32) -> StoreResult<Option<ClaimedUrl>> {
        let mut rows = self.lock();

        // In-flight counts per project, unfinished rows only.
        let mut in_flight: HashMap<String, u32> = HashMap::new();
        for row in rows.iter() {
            if row.finished_at.is_none() && row.started_processing_at.is_some() {
                *in_flight.entry(row.project.clone()).or_insert(0) += 1;
            }
        }

        let eligible: HashSet<String> = rows
            .iter()
            .filter(|r| r.finished_at.is_none())
            .map(|r| r.project.clone())
            .filter(|p| in_flight.get(p).copied().unwrap_or(0) < per_project_cap)
            .collect();

        // Insertion order is created_at order, so the first hit is the oldest.
        for row in rows.iter_mut() {
            if row.finished_at.is_none()
                && row.started_processing_at.is_none()
                && eligible.contains(&row.project)
            {
                row.started_processing_at = Some(Utc::now());
                return Ok(Some(ClaimedUrl {
                    project: row.project.clone(),
                    url: row.url.clone(),
                }));
            }
        }

        Ok(None)
    }

    async fn insert_discovered(&self, project: &str, url: &str) -> StoreResult<bool> {
        let mut rows = self.lock();

        if rows.iter().any(|r| r.project == project && r.url == url) {
            return Ok(false);
        }

        rows.push(UrlRecord {
            project: project.to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
            started_processing_at: None,
            finished_at: None,
        });
        Ok(true)
    }

    async fn mark_completed(&self, project: &str, url: &str) -> StoreResult<bool> {
        let mut rows = self.lock();

        for row in rows.iter_mut() {
            if row.project == project && row.url == url {
                if row.finished_at.is_some() {
                    return Ok(false);
                }
                row.finished_at = Some(Utc::now());
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn reclaim_stale(&self, older_than: Duration) -> StoreResult<u64> {
        // A threshold too large for chrono means nothing can be that stale.
        let age = match chrono::Duration::from_std(older_than) {
            Ok(age) => age,
            Err(_) => return Ok(0),
        };
        let cutoff = Utc::now() - age;
        let mut rows = self.lock();

        let mut reclaimed = 0;
        for row in rows.iter_mut() {
            if row.finished_at.is_none() {
                if let Some(started) = row.started_processing_at {
                    if started < cutoff {
                        row.started_processing_at = None;
                        reclaimed += 1;
                    }
                }
            }
        }

        Ok(reclaimed)
    }

    async fn overview(&self) -> StoreResult<FrontierOverview> {
        let rows = self.lock();

        let mut overview = FrontierOverview::default();
        let mut in_progress: HashSet<&str> = HashSet::new();
        let mut completed: HashSet<&str> = HashSet::new();

        for row in rows.iter() {
            match row.state() {
                UrlState::Queued => overview.urls_queued += 1,
                UrlState::InFlight => {
                    overview.urls_in_flight += 1;
                    in_progress.insert(&row.project);
                }
                UrlState::Completed => {
                    overview.urls_completed += 1;
                    completed.insert(&row.project);
                }
            }
        }

        overview.projects_in_progress = in_progress.len() as i64;
        overview.projects_completed = completed.len() as i64;
        Ok(overview)
    }

    async fn recent_urls(&self, state: UrlState, limit: i64) -> StoreResult<Vec<UrlRecord>> {
        let rows = self.lock();

        let mut matching: Vec<UrlRecord> = rows
            .iter()
            .filter(|r| r.state() == state)
            .cloned()
            .collect();

        match state {
            UrlState::Queued => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            UrlState::InFlight => {
                matching.sort_by_key(|r| r.started_processing_at);
            }
            UrlState::Completed => {
                matching.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
            }
        }

        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn seeded_store(entries: &[(&str, &str)]) -> MemoryStore {
        let store = MemoryStore::new();
        for (project, url) in entries {
            assert!(store.insert_discovered(project, url).await.unwrap());
        }
        store
    }

    #[tokio::test]
    async fn test_claim_from_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(store.claim_next(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_claim_oldest_first() {
        let store = seeded_store(&[
            ("p1", "http://example.com/a"),
            ("p1", "http://example.com/b"),
        ])
        .await;

        let first = store.claim_next(10).await.unwrap().unwrap();
        assert_eq!(first.url, "http://example.com/a");
        let second = store.claim_next(10).await.unwrap().unwrap();
        assert_eq!(second.url, "http://example.com/b");
    }

    #[tokio::test]
    async fn test_claimed_record_not_claimable_again() {
        let store = seeded_store(&[("p1", "http://example.com/a")]).await;

        assert!(store.claim_next(2).await.unwrap().is_some());
        assert_eq!(store.claim_next(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_per_project_cap_enforced() {
        let store = seeded_store(&[
            ("p1", "http://example.com/a"),
            ("p1", "http://example.com/b"),
            ("p1", "http://example.com/c"),
        ])
        .await;

        assert!(store.claim_next(2).await.unwrap().is_some());
        assert!(store.claim_next(2).await.unwrap().is_some());
        // Two in flight, cap reached; the third queued URL must wait.
        assert_eq!(store.claim_next(2).await.unwrap(), None);

        // Completing one frees a slot.
        assert!(store
            .mark_completed("p1", "http://example.com/a")
            .await
            .unwrap());
        let third = store.claim_next(2).await.unwrap().unwrap();
        assert_eq!(third.url, "http://example.com/c");
    }

    #[tokio::test]
    async fn test_capped_project_does_not_starve_others() {
        let store = seeded_store(&[
            ("p1", "http://one.com/a"),
            ("p1", "http://one.com/b"),
            ("p1", "http://one.com/c"),
            ("p2", "http://two.com/a"),
        ])
        .await;

        assert!(store.claim_next(2).await.unwrap().is_some());
        assert!(store.claim_next(2).await.unwrap().is_some());

        // p1 is at its cap; p2's newer URL is claimed ahead of p1's older one.
        let next = store.claim_next(2).await.unwrap().unwrap();
        assert_eq!(next.project, "p2");
        assert_eq!(next.url, "http://two.com/a");
    }

    #[tokio::test]
    async fn test_completed_urls_do_not_count_toward_cap() {
        let store = seeded_store(&[
            ("p1", "http://example.com/a"),
            ("p1", "http://example.com/b"),
        ])
        .await;

        let first = store.claim_next(1).await.unwrap().unwrap();
        assert_eq!(store.claim_next(1).await.unwrap(), None);

        assert!(store.mark_completed("p1", &first.url).await.unwrap());
        assert!(store.claim_next(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_discovered_is_idempotent() {
        let store = MemoryStore::new();

        assert!(store
            .insert_discovered("p1", "http://example.com/a")
            .await
            .unwrap());
        assert!(!store
            .insert_discovered("p1", "http://example.com/a")
            .await
            .unwrap());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_same_url_under_two_projects_is_two_records() {
        let store = MemoryStore::new();

        assert!(store
            .insert_discovered("p1", "http://example.com/a")
            .await
            .unwrap());
        assert!(store
            .insert_discovered("p2", "http://example.com/a")
            .await
            .unwrap());
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_completed_keeps_first_timestamp() {
        let store = seeded_store(&[("p1", "http://example.com/a")]).await;

        assert!(store
            .mark_completed("p1", "http://example.com/a")
            .await
            .unwrap());
        let first = store.get("p1", "http://example.com/a").unwrap().finished_at;

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!store
            .mark_completed("p1", "http://example.com/a")
            .await
            .unwrap());
        let second = store.get("p1", "http://example.com/a").unwrap().finished_at;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mark_completed_unknown_url_is_noop() {
        let store = MemoryStore::new();
        assert!(!store
            .mark_completed("p1", "http://example.com/missing")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_reclaim_returns_stale_claim_to_queue() {
        let store = seeded_store(&[("p1", "http://example.com/a")]).await;

        assert!(store.claim_next(2).await.unwrap().is_some());
        assert_eq!(store.claim_next(2).await.unwrap(), None);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let reclaimed = store.reclaim_stale(Duration::from_millis(1)).await.unwrap();
        assert_eq!(reclaimed, 1);

        // Claimable again after reclaim.
        assert!(store.claim_next(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reclaim_leaves_fresh_claims_alone() {
        let store = seeded_store(&[("p1", "http://example.com/a")]).await;

        assert!(store.claim_next(2).await.unwrap().is_some());
        let reclaimed = store
            .reclaim_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(reclaimed, 0);
    }

    #[tokio::test]
    async fn test_reclaim_never_touches_completed_urls() {
        let store = seeded_store(&[("p1", "http://example.com/a")]).await;

        assert!(store.claim_next(2).await.unwrap().is_some());
        assert!(store
            .mark_completed("p1", "http://example.com/a")
            .await
            .unwrap());

        tokio::time::sleep(Duration::from_millis(10)).await;
        let reclaimed = store.reclaim_stale(Duration::from_millis(1)).await.unwrap();
        assert_eq!(reclaimed, 0);

        let record = store.get("p1", "http://example.com/a").unwrap();
        assert_eq!(record.state(), UrlState::Completed);
        assert!(record.started_processing_at.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claimants_never_share_a_record() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..20 {
            store
                .insert_discovered("p1", &format!("http://example.com/{i}"))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let mut claimed = Vec::new();
                while let Some(unit) = store.claim_next(100).await.unwrap() {
                    claimed.push(unit.url);
                }
                claimed
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }

        all.sort();
        let before_dedup = all.len();
        all.dedup();
        assert_eq!(before_dedup, all.len(), "a URL was claimed twice");
        assert_eq!(all.len(), 20, "every URL should be claimed exactly once");
    }

    #[tokio::test]
    async fn test_overview_counts() {
        let store = seeded_store(&[
            ("p1", "http://one.com/a"),
            ("p1", "http://one.com/b"),
            ("p2", "http://two.com/a"),
        ])
        .await;

        let first = store.claim_next(10).await.unwrap().unwrap();
        store.mark_completed(&first.project, &first.url).await.unwrap();
        store.claim_next(10).await.unwrap().unwrap();

        let overview = store.overview().await.unwrap();
        assert_eq!(overview.urls_queued, 1);
        assert_eq!(overview.urls_in_flight, 1);
        assert_eq!(overview.urls_completed, 1);
        assert_eq!(overview.total_urls(), 3);
        assert_eq!(overview.projects_in_progress, 1);
        assert_eq!(overview.projects_completed, 1);
    }

    #[tokio::test]
    async fn test_recent_urls_filters_and_orders() {
        let store = seeded_store(&[
            ("p1", "http://example.com/a"),
            ("p1", "http://example.com/b"),
            ("p1", "http://example.com/c"),
        ])
        .await;

        store.claim_next(10).await.unwrap().unwrap();

        let queued = store.recent_urls(UrlState::Queued, 10).await.unwrap();
        assert_eq!(queued.len(), 2);
        // Newest queued entry first.
        assert_eq!(queued[0].url, "http://example.com/c");

        let in_flight = store.recent_urls(UrlState::InFlight, 10).await.unwrap();
        assert_eq!(in_flight.len(), 1);
        assert_eq!(in_flight[0].url, "http://example.com/a");

        let completed = store.recent_urls(UrlState::Completed, 10).await.unwrap();
        assert!(completed.is_empty());

        let limited = store.recent_urls(UrlState::Queued, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
