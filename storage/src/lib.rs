pub mod cell;
pub mod report_table;
pub mod repository_table;

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub use repository_table::RepositoryTable;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Replaces `path` with `bytes` in one step: the content goes to a temporary
/// file next to the destination which is then renamed over it, so readers
/// never observe a half-written file.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Pretty-printed JSON dump, written atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomically(path, &bytes)
}

/// Renders CSV rows fully in memory and writes them out in one go.
pub(crate) fn write_csv<I, R>(path: &Path, headers: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let csv_err = |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers).map_err(csv_err)?;
    for row in rows {
        writer
            .write_record(row.into_iter().collect::<Vec<_>>())
            .map_err(csv_err)?;
    }
    let bytes = writer.into_inner().map_err(|e| StorageError::Io {
        path: path.to_path_buf(),
        source: e.into_error(),
    })?;
    write_atomically(path, &bytes)
}
