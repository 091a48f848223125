//! Flat CSV tables read and written by the pipeline

use crate::models::RepoRef;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },
}

impl TableError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        TableError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write serde rows; the header comes from the struct field names.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), TableError> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;
    for row in rows {
        wtr.serialize(row).map_err(|e| TableError::csv(path, e))?;
    }
    wtr.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write pre-rendered records under an explicit header.
pub fn write_records<H, I>(path: &Path, header: &[H], records: I) -> Result<(), TableError>
where
    H: AsRef<str>,
    I: IntoIterator<Item = Vec<String>>,
{
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path).map_err(|e| TableError::csv(path, e))?;
    wtr.write_record(header.iter().map(|h| h.as_ref()))
        .map_err(|e| TableError::csv(path, e))?;
    for record in records {
        wtr.write_record(&record).map_err(|e| TableError::csv(path, e))?;
    }
    wtr.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the repository list for extraction.
///
/// Requires `url`, `owner` and `name` columns; anything else is ignored, so
/// both `repositories.csv` and hand-written lists work.
pub fn read_repo_refs(path: &Path) -> Result<Vec<RepoRef>, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| TableError::csv(path, e))?;

    let headers = rdr.headers().map_err(|e| TableError::csv(path, e))?.clone();
    for column in ["url", "owner", "name"] {
        if !headers.iter().any(|h| h == column) {
            return Err(TableError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    rdr.deserialize::<RepoRef>()
        .map(|r| r.map_err(|e| TableError::csv(path, e)))
        .collect()
}

fn ensure_parent(path: &Path) -> Result<(), TableError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| TableError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
