use chrono::{DateTime, Utc};
use model::{RawRepository, RepositoryRecord};
use tracing::{info, warn};

/// Derives every raw repository against the same `now`. Records that fail to
/// parse are logged and dropped; the rest of the run goes on.
pub fn derive_records(raw: &[RawRepository], now: DateTime<Utc>) -> Vec<RepositoryRecord> {
    let records: Vec<RepositoryRecord> = raw
        .iter()
        .filter_map(|repo| match RepositoryRecord::derive(repo, now) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {}: {}", repo.full_name(), e);
                None
            }
        })
        .collect();
    if records.len() < raw.len() {
        warn!(
            "{} of {} repositories skipped during derivation",
            raw.len() - records.len(),
            raw.len()
        );
    }
    records
}

/// Logs the first `count` records.
pub fn log_preview(records: &[RepositoryRecord], count: usize) {
    for record in records.iter().take(count) {
        info!(
            "{} | stars: {} | updated {} days ago | language: {} | issues closed: {:.2}%",
            record.full_name(),
            record.stars,
            record.days_since_update,
            record.primary_language,
            record.percent_closed
        );
    }
}
