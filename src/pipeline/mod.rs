//! Extraction pipeline
//!
//! Runs every repository through the same steps, one at a time:
//! 1. Acquire the source tree under the scratch root
//! 2. Run CK (with fallback) and read `class.csv`
//! 3. Tag per-class rows or collapse them into one aggregate row
//! 4. Drop the tree and the CK output
//!
//! A failing repository is logged and skipped; only writing the final table
//! can fail the run.

mod checkpoint;

pub use checkpoint::{checkpoint_path, Checkpoint};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::acquire::Acquirer;
use crate::aggregate::RepoAggregateRow;
use crate::ck::{ClassTable, Extractor};
use crate::models::{RepoRef, TaggedClassRow};
use crate::tables;

/// What happened to one repository
#[derive(Debug, Clone, PartialEq)]
pub enum RepoOutcome {
    /// Contributed this many rows
    Collected(usize),
    /// Processed but contributed nothing (no classes or no metric columns)
    Empty,
    Failed(String),
}

/// Progress notification, sent after each repository
#[derive(Debug)]
pub struct RepoProgress<'a> {
    /// 1-based position in the input list
    pub index: usize,
    pub total: usize,
    pub repo: &'a RepoRef,
    pub outcome: &'a RepoOutcome,
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Repositories attempted
    pub processed: usize,
    /// Repositories with nothing to contribute
    pub skipped: usize,
    pub failures: usize,
    pub rows_written: usize,
    /// `None` when nothing was collected and no file was written
    pub output: Option<PathBuf>,
}

impl RunSummary {
    fn record(&mut self, outcome: &RepoOutcome) {
        self.processed += 1;
        match outcome {
            RepoOutcome::Collected(_) => {}
            RepoOutcome::Empty => self.skipped += 1,
            RepoOutcome::Failed(_) => self.failures += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} processed, {} skipped, {} failed, {} rows written",
            self.processed, self.skipped, self.failures, self.rows_written
        )
    }
}

/// Result of an aggregated run
#[derive(Debug, Clone, Default)]
pub struct AggregatedRun {
    pub summary: RunSummary,
    pub rows: Vec<RepoAggregateRow>,
}

/// Sequential acquire/extract/aggregate driver.
pub struct Pipeline<A: Acquirer, E: Extractor> {
    acquirer: A,
    extractor: E,
    scratch_root: PathBuf,
    checkpoint_every: usize,
}

impl<A: Acquirer, E: Extractor> Pipeline<A, E> {
    pub fn new(acquirer: A, extractor: E, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            acquirer,
            extractor,
            scratch_root: scratch_root.into(),
            checkpoint_every: 10,
        }
    }

    /// Snapshot interval for aggregated runs (0 disables)
    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Acquire, extract and read one repository's class table.
    ///
    /// The scratch tree and CK output are removed before this returns, on
    /// success and failure alike.
    pub fn class_table(&self, repo: &RepoRef) -> Result<ClassTable> {
        let tree = self
            .acquirer
            .acquire(repo, &self.scratch_root)
            .with_context(|| format!("Failed to acquire {}", repo.id()))?;
        let output = self
            .extractor
            .extract(tree.path(), &self.scratch_root)
            .with_context(|| format!("CK failed for {}", repo.id()))?;
        debug!("CK succeeded for {} ({})", repo.id(), output.mode());

        let table = ClassTable::load(&output.class_csv())
            .with_context(|| format!("Failed to read CK output for {}", repo.id()))?;
        info!("Loaded {} classes from {}", table.len(), repo.id());
        Ok(table)
    }

    /// Class table for a single repository, leaving no scratch behind
    pub fn run_single(&self, repo: &RepoRef) -> Result<ClassTable> {
        let table = self.class_table(repo);
        self.tidy_scratch_root();
        table
    }

    /// Concatenate every repository's class rows, tagged with `owner/name`,
    /// into one table at `output`.
    pub fn run_per_class(
        &self,
        repos: &[RepoRef],
        output: &Path,
        mut on_progress: impl FnMut(RepoProgress<'_>),
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut collected: Vec<TaggedClassRow> = Vec::new();

        for (i, repo) in repos.iter().enumerate() {
            info!("[{}/{}] Processing {}", i + 1, repos.len(), repo.url);
            let outcome = match self.class_table(repo) {
                Ok(table) if table.is_empty() => {
                    warn!("No Java classes found in {}", repo.id());
                    RepoOutcome::Empty
                }
                Ok(table) => {
                    let n = table.len();
                    collected.extend(table.into_tagged(&repo.id()));
                    info!("Extracted {} classes from {}", n, repo.id());
                    RepoOutcome::Collected(n)
                }
                Err(e) => failed(repo, e),
            };
            summary.record(&outcome);
            on_progress(RepoProgress {
                index: i + 1,
                total: repos.len(),
                repo,
                outcome: &outcome,
            });
        }
        self.tidy_scratch_root();

        if collected.is_empty() {
            warn!("No data was collected; {} not written", output.display());
            return Ok(summary);
        }

        tables::write_records(
            output,
            &TaggedClassRow::HEADER,
            collected.iter().map(TaggedClassRow::to_record),
        )
        .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Saved {} with {} rows", output.display(), collected.len());

        summary.rows_written = collected.len();
        summary.output = Some(output.to_path_buf());
        Ok(summary)
    }

    /// One aggregate row per repository, with periodic checkpoints next to
    /// `output`. The checkpoint is removed after the final table is written.
    pub fn run_aggregated(
        &self,
        repos: &[RepoRef],
        output: &Path,
        mut on_progress: impl FnMut(RepoProgress<'_>),
    ) -> Result<AggregatedRun> {
        let checkpoint = Checkpoint::for_output(output, self.checkpoint_every);
        let mut summary = RunSummary::default();
        let mut rows: Vec<RepoAggregateRow> = Vec::new();

        for (i, repo) in repos.iter().enumerate() {
            info!("[{}/{}] Processing {}", i + 1, repos.len(), repo.url);
            let outcome = match self.class_table(repo) {
                Ok(table) => match RepoAggregateRow::from_table(&repo.id(), &table) {
                    Some(row) => {
                        info!("Aggregated {} classes for {}", row.total_classes, repo.id());
                        rows.push(row);
                        checkpoint.maybe_save(&rows);
                        RepoOutcome::Collected(1)
                    }
                    None => {
                        warn!("Nothing to aggregate for {} ({} classes)", repo.id(), table.len());
                        RepoOutcome::Empty
                    }
                },
                Err(e) => failed(repo, e),
            };
            summary.record(&outcome);
            on_progress(RepoProgress {
                index: i + 1,
                total: repos.len(),
                repo,
                outcome: &outcome,
            });
        }
        self.tidy_scratch_root();

        if rows.is_empty() {
            warn!("No aggregated data was produced; {} not written", output.display());
            return Ok(AggregatedRun { summary, rows });
        }

        tables::write_records(
            output,
            &RepoAggregateRow::header(),
            rows.iter().map(RepoAggregateRow::to_record),
        )
        .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Saved {} with {} repositories", output.display(), rows.len());
        checkpoint.clear();

        summary.rows_written = rows.len();
        summary.output = Some(output.to_path_buf());
        Ok(AggregatedRun { summary, rows })
    }

    /// Drop the scratch root if the run left it empty
    fn tidy_scratch_root(&self) {
        if let Err(e) = std::fs::remove_dir(&self.scratch_root) {
            debug!("Keeping scratch root {}: {}", self.scratch_root.display(), e);
        }
    }
}

fn failed(repo: &RepoRef, e: anyhow::Error) -> RepoOutcome {
    warn!("Failed on {}: {:#}", repo.url, e);
    RepoOutcome::Failed(format!("{:#}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::{AcquireError, ScratchTree};
    use crate::ck::{CkOutput, ExtractError, ModeFailure, ScopeMode};
    use std::collections::HashMap;

    /// Creates an empty directory per repository; fails for listed names
    struct FakeAcquirer {
        fail: Vec<&'static str>,
    }

    impl Acquirer for FakeAcquirer {
        fn acquire(&self, repo: &RepoRef, scratch_root: &Path) -> Result<ScratchTree, AcquireError> {
            if self.fail.contains(&repo.name.as_str()) {
                return Err(AcquireError::CloneFailed {
                    repo: repo.id(),
                    attempts: 2,
                    reason: "not found".into(),
                });
            }
            let path = scratch_root.join(repo.dir_name());
            std::fs::create_dir_all(&path).unwrap();
            std::fs::write(path.join("name"), &repo.name).unwrap();
            Ok(ScratchTree::new(path))
        }
    }

    /// Writes a canned class.csv keyed by repository name; unknown names fail
    struct FakeExtractor {
        tables: HashMap<&'static str, &'static str>,
    }

    impl Extractor for FakeExtractor {
        fn extract(&self, source: &Path, scratch_root: &Path) -> Result<CkOutput, ExtractError> {
            let name = std::fs::read_to_string(source.join("name")).unwrap();
            let Some(csv) = self.tables.get(name.as_str()) else {
                return Err(ExtractError::AllModesFailed(vec![ModeFailure {
                    mode: ScopeMode::SourceOnly,
                    reason: "exit code 1".into(),
                }]));
            };
            let output = CkOutput::create(scratch_root, ScopeMode::IncludeJars)?;
            std::fs::write(output.class_csv(), csv).unwrap();
            Ok(output)
        }
    }

    const TWO_CLASSES: &str = "file,class,type,cbo,dit,lcom\nA.java,A,class,1,1,0\nB.java,B,class,3,2,4\n";
    const NO_CLASSES: &str = "file,class,type,cbo,dit,lcom\n";

    fn repos(names: &[&str]) -> Vec<RepoRef> {
        names
            .iter()
            .map(|n| RepoRef::new("org", *n, format!("https://github.com/org/{}", n)))
            .collect()
    }

    #[test]
    fn test_per_class_tags_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let pipeline = Pipeline::new(
            FakeAcquirer { fail: vec!["gone"] },
            FakeExtractor {
                tables: HashMap::from([("good", TWO_CLASSES), ("empty", NO_CLASSES)]),
            },
            &scratch,
        );
        let output = dir.path().join("all_class_metrics.csv");

        let mut outcomes = Vec::new();
        let summary = pipeline
            .run_per_class(&repos(&["good", "gone", "empty", "broken"]), &output, |p| {
                outcomes.push(p.outcome.clone())
            })
            .unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.failures, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rows_written, 2);
        assert_eq!(outcomes[0], RepoOutcome::Collected(2));
        assert!(matches!(outcomes[1], RepoOutcome::Failed(_)));
        assert_eq!(outcomes[2], RepoOutcome::Empty);

        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "file,class,type,cbo,dit,lcom,repo");
        assert_eq!(lines[1], "A.java,A,class,1,1,0,org/good");
        assert_eq!(lines.len(), 3);

        // Every tree and CK output was cleaned up
        assert!(!scratch.exists());
    }

    #[test]
    fn test_per_class_writes_nothing_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            FakeAcquirer { fail: vec![] },
            FakeExtractor {
                tables: HashMap::from([("empty", NO_CLASSES)]),
            },
            dir.path().join("scratch"),
        );
        let output = dir.path().join("out.csv");
        let summary = pipeline
            .run_per_class(&repos(&["empty", "broken"]), &output, |_| {})
            .unwrap();
        assert_eq!(summary.output, None);
        assert!(!output.exists());
    }

    #[test]
    fn test_aggregated_rows_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let pipeline = Pipeline::new(
            FakeAcquirer { fail: vec![] },
            FakeExtractor {
                tables: HashMap::from([("r", TWO_CLASSES)]),
            },
            &scratch,
        )
        .with_checkpoint_every(2);
        let output = dir.path().join("agg.csv");
        let checkpoint = checkpoint_path(&output);

        let mut seen = Vec::new();
        let list: Vec<RepoRef> = (0..5)
            .map(|i| RepoRef::new(format!("o{}", i), "r", format!("https://github.com/o{}/r", i)))
            .collect();
        let run = pipeline
            .run_aggregated(&list, &output, |p| seen.push((p.index, checkpoint.exists())))
            .unwrap();

        assert_eq!(
            seen,
            vec![(1, false), (2, true), (3, true), (4, true), (5, true)]
        );
        assert!(!checkpoint.exists());
        assert_eq!(run.summary.rows_written, 5);
        assert_eq!(run.rows[0].repo, "o0/r");
        assert_eq!(run.rows[0].total_classes, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 6);
        assert!(content.lines().next().unwrap().starts_with("repo,total_classes,cbo_mean"));
    }

    #[test]
    fn test_aggregated_skips_failures_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            FakeAcquirer { fail: vec!["gone"] },
            FakeExtractor {
                tables: HashMap::from([("good", TWO_CLASSES), ("empty", NO_CLASSES)]),
            },
            dir.path().join("scratch"),
        );
        let output = dir.path().join("agg.csv");
        let run = pipeline
            .run_aggregated(&repos(&["good", "gone", "empty", "broken"]), &output, |_| {})
            .unwrap();

        assert_eq!(run.rows.len(), 1);
        assert_eq!(run.summary.failures, 2);
        assert_eq!(run.summary.skipped, 1);
        assert_eq!(
            run.summary.summary(),
            "4 processed, 1 skipped, 2 failed, 1 rows written"
        );
    }
}
