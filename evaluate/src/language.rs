use entity::language;
use entity::repository::{is_known_language, Model as RepositoryRow};
use std::collections::HashMap;

use crate::statistics::{mean, median};

/// Rows sharing a primary language.
#[derive(Debug)]
pub struct LanguageGroup<'a> {
    pub language: &'a str,
    pub rows: Vec<&'a RepositoryRow>,
}

/// Groups rows with a known language, groups ordered by first appearance.
/// Rows whose language is unknown (`N/A`) belong to no group.
pub fn group_by_language(rows: &[RepositoryRow]) -> Vec<LanguageGroup<'_>> {
    let mut groups: Vec<LanguageGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows.iter().filter(|r| r.has_known_language()) {
        let lang = row.primary_language.trim();
        let idx = *index.entry(lang).or_insert_with(|| {
            groups.push(LanguageGroup {
                language: lang,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].rows.push(row);
    }
    groups
}

/// Every known language with its repository count, most common first.
/// The sort is stable, so ties keep first-appearance order.
pub fn count_languages(rows: &[RepositoryRow]) -> Vec<language::Count> {
    let mut counts: Vec<language::Count> = group_by_language(rows)
        .into_iter()
        .map(|g| language::Count {
            language: g.language.to_owned(),
            repos: g.rows.len(),
        })
        .collect();
    counts.sort_by(|a, b| b.repos.cmp(&a.repos));
    counts
}

/// The `n` most common known languages.
pub fn rank_languages(rows: &[RepositoryRow], n: usize) -> Vec<language::Count> {
    let mut counts = count_languages(rows);
    counts.truncate(n);
    counts
}

fn rows_for<'a>(rows: &'a [RepositoryRow], lang: &'a str) -> impl Iterator<Item = &'a RepositoryRow> {
    rows.iter()
        .filter(move |r| is_known_language(&r.primary_language) && r.primary_language.trim() == lang)
}

/// Medians of the activity columns for each ranked language, in ranking order.
pub fn summarize_languages(
    rows: &[RepositoryRow],
    ranked: &[language::Count],
) -> Vec<language::Model> {
    ranked
        .iter()
        .map(|count| language::Model {
            language: count.language.clone(),
            repos: count.repos,
            prs_per_month_median: median(rows_for(rows, &count.language).map(|r| r.prs_per_month)),
            releases_per_month_median: median(
                rows_for(rows, &count.language).map(|r| r.releases_per_month),
            ),
            days_since_update_median: median(
                rows_for(rows, &count.language).map(|r| r.days_since_update),
            ),
        })
        .collect()
}

/// Mean activity of one language, as drawn in the language charts.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageMeans {
    pub language: String,
    pub prs_per_month: f64,
    pub releases_per_month: f64,
    pub days_since_update: f64,
}

/// Means per ranked language, sorted by mean PRs/month, highest first.
/// A language without any valid value for a column reports 0 for it.
pub fn language_means(rows: &[RepositoryRow], ranked: &[language::Count]) -> Vec<LanguageMeans> {
    let mut means: Vec<LanguageMeans> = ranked
        .iter()
        .map(|count| LanguageMeans {
            language: count.language.clone(),
            prs_per_month: mean(rows_for(rows, &count.language).map(|r| r.prs_per_month))
                .unwrap_or(0.0),
            releases_per_month: mean(
                rows_for(rows, &count.language).map(|r| r.releases_per_month),
            )
            .unwrap_or(0.0),
            days_since_update: mean(rows_for(rows, &count.language).map(|r| r.days_since_update))
                .unwrap_or(0.0),
        })
        .collect();
    means.sort_by(|a, b| b.prs_per_month.total_cmp(&a.prs_per_month));
    means
}
