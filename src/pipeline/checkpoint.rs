//! Periodic snapshots of the aggregated table

use crate::aggregate::RepoAggregateRow;
use crate::tables;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Writes `temp_<output name>` next to the output every `every` rows.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
    every: usize,
}

impl Checkpoint {
    pub fn for_output(output: &Path, every: usize) -> Self {
        Self {
            path: checkpoint_path(output),
            every,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot if `rows.len()` just reached a multiple of the interval.
    /// Returns whether a snapshot was written.
    pub fn maybe_save(&self, rows: &[RepoAggregateRow]) -> bool {
        if self.every == 0 || rows.is_empty() || rows.len() % self.every != 0 {
            return false;
        }
        let records = rows.iter().map(RepoAggregateRow::to_record);
        match tables::write_records(&self.path, &RepoAggregateRow::header(), records) {
            Ok(()) => {
                info!(
                    "Checkpoint saved with {} repositories to {}",
                    rows.len(),
                    self.path.display()
                );
                true
            }
            Err(e) => {
                warn!("Failed to write checkpoint: {}", e);
                false
            }
        }
    }

    /// Remove the snapshot once the final table is on disk
    pub fn clear(&self) {
        if !self.path.exists() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed checkpoint {}", self.path.display()),
            Err(e) => debug!("Could not remove checkpoint {}: {}", self.path.display(), e),
        }
    }
}

/// `dir/out.csv` -> `dir/temp_out.csv`
pub fn checkpoint_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.csv".to_string());
    output.with_file_name(format!("temp_{}", name))
}
