use crate::NOT_AVAILABLE;
use serde::{Deserialize, Serialize};

/// One row of the persisted repository snapshot.
///
/// Numeric cells are optional: a snapshot written by an older run, or edited by
/// hand, may hold `N/A` or garbage in any of them, and readers must be able to
/// carry on with the remaining columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub owner: String,
    pub name: String,
    pub stars: Option<f64>,
    pub age_months: Option<f64>,
    pub prs_per_month: Option<f64>,
    pub releases_per_month: Option<f64>,
    pub days_since_update: Option<f64>,
    pub primary_language: String,
    pub total_issues: Option<f64>,
    pub closed_issues: Option<f64>,
    pub percent_closed: Option<f64>,
}

impl Model {
    /// `true` unless the primary language is the unknown placeholder.
    pub fn has_known_language(&self) -> bool {
        is_known_language(&self.primary_language)
    }

    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Stars => self.stars,
            Column::AgeMonths => self.age_months,
            Column::PrsPerMonth => self.prs_per_month,
            Column::ReleasesPerMonth => self.releases_per_month,
            Column::DaysSinceUpdate => self.days_since_update,
            Column::TotalIssues => self.total_issues,
            Column::ClosedIssues => self.closed_issues,
            Column::PercentClosed => self.percent_closed,
            Column::Owner | Column::Name | Column::PrimaryLanguage => None,
        }
    }

    pub fn set_value(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::Stars => self.stars = value,
            Column::AgeMonths => self.age_months = value,
            Column::PrsPerMonth => self.prs_per_month = value,
            Column::ReleasesPerMonth => self.releases_per_month = value,
            Column::DaysSinceUpdate => self.days_since_update = value,
            Column::TotalIssues => self.total_issues = value,
            Column::ClosedIssues => self.closed_issues = value,
            Column::PercentClosed => self.percent_closed = value,
            Column::Owner | Column::Name | Column::PrimaryLanguage => {}
        }
    }
}

/// Normalizes a language cell: missing or blank becomes `N/A`.
pub fn normalize_language(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(lang) if !lang.is_empty() => lang.to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

pub fn is_known_language(lang: &str) -> bool {
    let lang = lang.trim();
    !lang.is_empty() && lang != NOT_AVAILABLE
}

/// Fixed column schema of the snapshot file, in file order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Owner,
    Name,
    Stars,
    AgeMonths,
    PrsPerMonth,
    ReleasesPerMonth,
    DaysSinceUpdate,
    PrimaryLanguage,
    TotalIssues,
    ClosedIssues,
    PercentClosed,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Owner,
        Column::Name,
        Column::Stars,
        Column::AgeMonths,
        Column::PrsPerMonth,
        Column::ReleasesPerMonth,
        Column::DaysSinceUpdate,
        Column::PrimaryLanguage,
        Column::TotalIssues,
        Column::ClosedIssues,
        Column::PercentClosed,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Owner => "Owner",
            Column::Name => "Name",
            Column::Stars => "Stars",
            Column::AgeMonths => "IdadeMeses",
            Column::PrsPerMonth => "PRsMes",
            Column::ReleasesPerMonth => "ReleasesMes",
            Column::DaysSinceUpdate => "DiasDesdeAtualizacao",
            Column::PrimaryLanguage => "LinguagemPrincipal",
            Column::TotalIssues => "TotalIssues",
            Column::ClosedIssues => "ClosedIssues",
            Column::PercentClosed => "PercentualIssuesFechadas",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::Owner | Column::Name | Column::PrimaryLanguage)
    }

    /// Decimal places used when the column is written out.
    /// Counts and whole-unit ages are integral; rates and ratios keep two places.
    pub fn precision(self) -> usize {
        match self {
            Column::PrsPerMonth | Column::ReleasesPerMonth | Column::PercentClosed => 2,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language(Some("Rust")), "Rust");
        assert_eq!(normalize_language(Some("  Go ")), "Go");
        assert_eq!(normalize_language(Some("")), NOT_AVAILABLE);
        assert_eq!(normalize_language(Some("   ")), NOT_AVAILABLE);
        assert_eq!(normalize_language(None), NOT_AVAILABLE);
    }

    #[test]
    fn test_header_order_matches_schema() {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers.join(","),
            "Owner,Name,Stars,IdadeMeses,PRsMes,ReleasesMes,DiasDesdeAtualizacao,\
             LinguagemPrincipal,TotalIssues,ClosedIssues,PercentualIssuesFechadas"
        );
    }
}
