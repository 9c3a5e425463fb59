use entity::repository::{self, Column};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cell::{format_cell, parse_cell};
use crate::{write_csv, Result, StorageError};

/// The persisted repository snapshot: one header row followed by one row per
/// repository, columns in [`Column::ALL`] order.
#[derive(Clone, Debug)]
pub struct RepositoryTable {
    path: PathBuf,
}

impl RepositoryTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the snapshot with `rows`.
    pub fn persist(&self, rows: &[repository::Model]) -> Result<()> {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        write_csv(&self.path, &headers, rows.iter().map(render_row))?;
        debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    /// Reads the snapshot back by header name. Column order in the file does
    /// not matter and missing columns read as absent.
    pub fn load(&self) -> Result<Vec<repository::Model>> {
        if !self.path.exists() {
            return Err(StorageError::MissingInput(self.path.clone()));
        }
        let csv_err = |source| StorageError::Csv {
            path: self.path.clone(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(csv_err)?;

        let positions: HashMap<String, usize> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim_start_matches('\u{feff}').trim().to_owned(), idx))
            .collect();
        let index: HashMap<Column, usize> = Column::ALL
            .iter()
            .filter_map(|c| positions.get(c.header()).map(|idx| (*c, *idx)))
            .collect();
        for column in Column::ALL.iter().filter(|c| !index.contains_key(*c)) {
            warn!(
                "Column {} missing from {}, reading it as N/A",
                column.header(),
                self.path.display()
            );
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let line = record.position().map_or(0, |p| p.line());
            let text = |column: Column| index.get(&column).and_then(|idx| record.get(*idx));

            let mut row = repository::Model {
                owner: text(Column::Owner).unwrap_or_default().to_owned(),
                name: text(Column::Name).unwrap_or_default().to_owned(),
                stars: None,
                age_months: None,
                prs_per_month: None,
                releases_per_month: None,
                days_since_update: None,
                primary_language: repository::normalize_language(text(Column::PrimaryLanguage)),
                total_issues: None,
                closed_issues: None,
                percent_closed: None,
            };
            for column in Column::ALL.into_iter().filter(|c| c.is_numeric()) {
                let Some(cell) = text(column) else { continue };
                let value = match parse_cell(cell) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(
                            "{}:{} column {}: cannot parse {:?} ({}), treating as N/A",
                            self.path.display(),
                            line,
                            column.header(),
                            cell,
                            e
                        );
                        None
                    }
                };
                row.set_value(column, value);
            }
            rows.push(row);
        }
        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

fn render_row(row: &repository::Model) -> Vec<String> {
    Column::ALL
        .iter()
        .map(|column| match column {
            Column::Owner => row.owner.clone(),
            Column::Name => row.name.clone(),
            Column::PrimaryLanguage => row.primary_language.clone(),
            numeric => format_cell(row.value(*numeric), numeric.precision()),
        })
        .collect()
}
