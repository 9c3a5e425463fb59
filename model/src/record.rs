use chrono::{DateTime, Datelike, Utc};
use entity::repository;
use serde::{Deserialize, Serialize};

use crate::{ParseError, RawRepository};

const SECONDS_PER_DAY: i64 = 86_400;

/// Metrics derived from one [`RawRepository`].
///
/// All age-based fields are relative to the `now` handed to
/// [`RepositoryRecord::derive`]; a collection run uses one `now` for every
/// record so the ratios in a snapshot stay comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub owner: String,
    pub name: String,
    pub stars: i64,
    pub age_months: i64,
    pub prs_per_month: f64,
    pub releases_per_month: f64,
    pub days_since_update: i64,
    pub primary_language: String,
    pub total_issues: i64,
    pub closed_issues: i64,
    pub percent_closed: f64,
}

impl RepositoryRecord {
    pub fn derive(raw: &RawRepository, now: DateTime<Utc>) -> Result<Self, ParseError> {
        let created = parse_timestamp("createdAt", &raw.created_at)?;
        let updated = parse_timestamp("updatedAt", &raw.updated_at)?;
        let stars = non_negative("stargazerCount", raw.stars)?;
        let total_issues = non_negative("issues", raw.total_issues)?;
        let closed_issues = non_negative("closedIssues", raw.closed_issues)?;
        let merged = non_negative("pullRequests", raw.merged_pull_requests)?;
        let releases = non_negative("releases", raw.releases)?;
        if closed_issues > total_issues {
            return Err(ParseError::InconsistentIssues {
                closed: closed_issues,
                total: total_issues,
            });
        }

        let age_months = age_in_months(created, now);
        Ok(Self {
            owner: raw.owner.clone(),
            name: raw.name.clone(),
            stars,
            age_months,
            prs_per_month: per_month(merged, age_months),
            releases_per_month: per_month(releases, age_months),
            days_since_update: days_between(updated, now),
            primary_language: repository::normalize_language(raw.primary_language.as_deref()),
            total_issues,
            closed_issues,
            percent_closed: percent_closed(closed_issues, total_issues),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Calendar-field month difference, day of month ignored:
/// 2024-01-31 to 2024-02-01 counts as one month.
pub fn age_in_months(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now.year() as i64 - created.year() as i64) * 12
        + (now.month() as i64 - created.month() as i64)
}

/// Repositories created this calendar month (age 0) report the raw total.
pub fn per_month(total: i64, age_months: i64) -> f64 {
    if age_months > 0 {
        total as f64 / age_months as f64
    } else {
        total as f64
    }
}

/// Whole days from `updated` to `now`, rounded down.
pub fn days_between(updated: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - updated).num_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn percent_closed(closed: i64, total: i64) -> f64 {
    if total > 0 {
        closed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ParseError> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|source| ParseError::Timestamp {
            field,
            value: value.to_owned(),
            source,
        })
}

fn non_negative(field: &'static str, value: i64) -> Result<i64, ParseError> {
    if value < 0 {
        Err(ParseError::NegativeCount { field, value })
    } else {
        Ok(value)
    }
}

// 转换函数，将派生指标转换为快照文件的行
impl From<&RepositoryRecord> for repository::Model {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            owner: record.owner.clone(),
            name: record.name.clone(),
            stars: Some(record.stars as f64),
            age_months: Some(record.age_months as f64),
            prs_per_month: Some(record.prs_per_month),
            releases_per_month: Some(record.releases_per_month),
            days_since_update: Some(record.days_since_update as f64),
            primary_language: record.primary_language.clone(),
            total_issues: Some(record.total_issues as f64),
            closed_issues: Some(record.closed_issues as f64),
            percent_closed: Some(record.percent_closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap()
    }

    fn raw() -> RawRepository {
        RawRepository {
            owner: "tokio-rs".to_owned(),
            name: "tokio".to_owned(),
            stars: 28000,
            created_at: "2023-09-01T08:00:00Z".to_owned(),
            updated_at: "2025-09-05T18:30:00Z".to_owned(),
            primary_language: Some("Rust".to_owned()),
            total_issues: 200,
            closed_issues: 150,
            merged_pull_requests: 480,
            releases: 36,
        }
    }

    #[test]
    fn test_derive_full_record() {
        let record = RepositoryRecord::derive(&raw(), now()).unwrap();
        assert_eq!(record.full_name(), "tokio-rs/tokio");
        assert_eq!(record.age_months, 24);
        assert_eq!(record.prs_per_month, 20.0);
        assert_eq!(record.releases_per_month, 1.5);
        assert_eq!(record.days_since_update, 9);
        assert_eq!(record.primary_language, "Rust");
        assert_eq!(record.percent_closed, 75.0);
    }

    #[test]
    fn test_age_uses_calendar_fields() {
        let created = Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(age_in_months(created, now), 1);
        let created = Utc.with_ymd_and_hms(2020, 11, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(age_in_months(created, now), 15);
    }

    #[test]
    fn test_zero_age_reports_raw_totals() {
        let mut input = raw();
        input.created_at = "2025-09-02T00:00:00Z".to_owned();
        let record = RepositoryRecord::derive(&input, now()).unwrap();
        assert_eq!(record.age_months, 0);
        assert_eq!(record.prs_per_month, 480.0);
        assert_eq!(record.releases_per_month, 36.0);
    }

    #[test]
    fn test_future_creation_is_kept() {
        let mut input = raw();
        input.created_at = "2025-11-01T00:00:00Z".to_owned();
        let record = RepositoryRecord::derive(&input, now()).unwrap();
        assert_eq!(record.age_months, -2);
        assert_eq!(record.prs_per_month, 480.0);
    }

    #[test]
    fn test_percent_closed_bounds() {
        assert_eq!(percent_closed(0, 0), 0.0);
        assert_eq!(percent_closed(5, 0), 0.0);
        assert_eq!(percent_closed(0, 10), 0.0);
        assert_eq!(percent_closed(10, 10), 100.0);
        for total in 1..50 {
            for closed in 0..=total {
                let pct = percent_closed(closed, total);
                assert!((0.0..=100.0).contains(&pct), "{closed}/{total} -> {pct}");
            }
        }
    }

    #[test]
    fn test_days_between_rounds_down() {
        let now = now();
        assert_eq!(days_between(now - chrono::Duration::hours(23), now), 0);
        assert_eq!(days_between(now - chrono::Duration::hours(49), now), 2);
        assert_eq!(days_between(now + chrono::Duration::hours(1), now), -1);
    }

    #[test]
    fn test_null_language_becomes_not_available() {
        let mut input = raw();
        input.primary_language = None;
        let record = RepositoryRecord::derive(&input, now()).unwrap();
        assert_eq!(record.primary_language, entity::NOT_AVAILABLE);
    }

    #[test]
    fn test_malformed_fields_fail() {
        let mut input = raw();
        input.updated_at = "yesterday".to_owned();
        assert!(matches!(
            RepositoryRecord::derive(&input, now()),
            Err(ParseError::Timestamp { field: "updatedAt", .. })
        ));

        let mut input = raw();
        input.releases = -1;
        assert!(matches!(
            RepositoryRecord::derive(&input, now()),
            Err(ParseError::NegativeCount { field: "releases", value: -1 })
        ));

        let mut input = raw();
        input.closed_issues = 201;
        assert!(matches!(
            RepositoryRecord::derive(&input, now()),
            Err(ParseError::InconsistentIssues { .. })
        ));
    }

    #[test]
    fn test_into_row() {
        let record = RepositoryRecord::derive(&raw(), now()).unwrap();
        let row = repository::Model::from(&record);
        assert_eq!(row.stars, Some(28000.0));
        assert_eq!(row.days_since_update, Some(9.0));
        assert_eq!(row.prs_per_month, Some(20.0));
        assert_eq!(row.primary_language, "Rust");
    }
}
