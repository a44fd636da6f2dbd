//! Frontier status reporting
//!
//! This module pulls aggregate counts and recent records from the store and
//! renders them for the `status` subcommand. Loading and formatting are
//! separate so the rendering can be tested without a store.

use crate::store::{FrontierOverview, FrontierStore, UrlRecord, UrlState};
use chrono::{DateTime, Utc};

/// How many records each section of the report shows at most
const RECENT_LIMIT: i64 = 10;

/// A point-in-time view of the shared frontier
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Aggregate counts across all projects
    pub overview: FrontierOverview,

    /// Oldest open claims first; the top entry is the likeliest to be stale
    pub in_flight: Vec<UrlRecord>,

    /// Most recently discovered URLs still waiting for a claim
    pub queued: Vec<UrlRecord>,

    /// Most recently finished URLs
    pub completed: Vec<UrlRecord>,
}

/// Loads a status report from the store
///
/// # Arguments
///
/// * `store` - The frontier store to query
///
/// # Returns
///
/// * `Ok(StatusReport)` - Successfully loaded report
/// * `Err(CrawldError)` - A store query failed
pub async fn load_status(store: &dyn FrontierStore) -> crate::Result<StatusReport> {
    let overview = store.overview().await?;
    let in_flight = store.recent_urls(UrlState::InFlight, RECENT_LIMIT).await?;
    let queued = store.recent_urls(UrlState::Queued, RECENT_LIMIT).await?;
    let completed = store.recent_urls(UrlState::Completed, RECENT_LIMIT).await?;

    Ok(StatusReport {
        overview,
        in_flight,
        queued,
        completed,
    })
}

/// Formats a status report for terminal display
pub fn format_status(report: &StatusReport) -> String {
    let mut out = String::new();

    out.push_str("=== Frontier Status ===\n\n");

    let overview = &report.overview;
    out.push_str("Overview:\n");
    out.push_str(&format!("  Queued:    {}\n", overview.urls_queued));
    out.push_str(&format!("  In flight: {}\n", overview.urls_in_flight));
    out.push_str(&format!("  Completed: {}\n", overview.urls_completed));
    out.push_str(&format!("  Total:     {}\n", overview.total_urls()));
    out.push_str(&format!(
        "  Projects in progress: {}\n",
        overview.projects_in_progress
    ));
    out.push_str(&format!(
        "  Projects completed:   {}\n",
        overview.projects_completed
    ));
    out.push('\n');

    push_section(&mut out, "In Flight (oldest claim first)", &report.in_flight);
    push_section(&mut out, "Queued (newest first)", &report.queued);
    push_section(&mut out, "Recently Completed", &report.completed);

    out
}

/// Loads and prints the status report to stdout
pub async fn show_status(store: &dyn FrontierStore) -> crate::Result<()> {
    let report = load_status(store).await?;
    print!("{}", format_status(&report));
    Ok(())
}

fn push_section(out: &mut String, title: &str, records: &[UrlRecord]) {
    if records.is_empty() {
        return;
    }

    out.push_str(&format!("{}:\n", title));
    for record in records {
        let when = match record.state() {
            UrlState::Queued => format!("added {}", format_timestamp(record.created_at)),
            UrlState::InFlight => record
                .started_processing_at
                .map(|ts| format!("claimed {}", format_timestamp(ts)))
                .unwrap_or_default(),
            UrlState::Completed => record
                .finished_at
                .map(|ts| format!("finished {}", format_timestamp(ts)))
                .unwrap_or_default(),
        };
        out.push_str(&format!("  [{}] {}  {}\n", record.project, record.url, when));
    }
    out.push('\n');
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
