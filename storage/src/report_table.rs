use entity::{language, summary};
use std::path::Path;
use tracing::debug;

use crate::cell::format_cell;
use crate::{write_csv, Result};

const PRECISION: usize = 2;

/// Global medians, one `label,median` row per statistic.
pub fn write_summary(path: &Path, rows: &[summary::Model]) -> Result<()> {
    write_csv(
        path,
        &summary::HEADERS,
        rows.iter()
            .map(|row| [row.label.clone(), format_cell(row.median, PRECISION)]),
    )?;
    debug!("Summary written to {}", path.display());
    Ok(())
}

/// Per-language medians for the ranked languages, in ranking order.
pub fn write_language_table(path: &Path, rows: &[language::Model]) -> Result<()> {
    write_csv(
        path,
        &language::HEADERS,
        rows.iter().map(|row| {
            [
                row.language.clone(),
                row.repos.to_string(),
                format_cell(row.prs_per_month_median, PRECISION),
                format_cell(row.releases_per_month_median, PRECISION),
                format_cell(row.days_since_update_median, PRECISION),
            ]
        }),
    )?;
    debug!("Language table written to {}", path.display());
    Ok(())
}

pub fn write_language_counts(path: &Path, rows: &[language::Count]) -> Result<()> {
    write_csv(
        path,
        &language::COUNT_HEADERS,
        rows.iter()
            .map(|row| [row.language.clone(), row.repos.to_string()]),
    )
}
