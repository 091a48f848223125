//! Extract command - run CK over a repository list

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use super::{require_jar, ui, ExtractMode};
use crate::acquire::GitCloneAcquirer;
use crate::aggregate::RepoAggregateRow;
use crate::ck::CkRunner;
use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::pipeline::{Pipeline, RepoOutcome, RepoProgress, RunSummary};
use crate::tables;

const PREVIEW_ROWS: usize = 5;

pub fn run(config: &HarvestConfig, mode: ExtractMode, input: &Path, output: &Path) -> Result<()> {
    require_jar(config)?;
    if !input.is_file() {
        return Err(HarvestError::MissingPrerequisite {
            what: "Input CSV",
            path: input.to_path_buf(),
            hint: "Run `ck-harvest discover` to create repositories.csv",
        }
        .into());
    }

    let repos = tables::read_repo_refs(input)
        .with_context(|| format!("Failed to read repository list {}", input.display()))?;
    let pipeline = Pipeline::new(
        GitCloneAcquirer::from_config(&config.acquisition),
        CkRunner::from_config(&config.extraction),
        &config.acquisition.scratch_dir,
    )
    .with_checkpoint_every(config.aggregation.checkpoint_every);

    let label = match mode {
        ExtractMode::PerClass => "per-class metrics",
        ExtractMode::Aggregated => "aggregated metrics",
    };
    ui::print_header(&format!(
        "Processing {} repositories from {} ({})",
        repos.len(),
        input.display(),
        label
    ));

    let bar = ui::bar(repos.len());
    let on_progress = |p: RepoProgress<'_>| {
        if let RepoOutcome::Failed(reason) = p.outcome {
            bar.println(format!("{} {}: {}", style("✗").red(), p.repo.id(), reason));
        }
        bar.set_message(p.repo.id());
        bar.inc(1);
    };

    match mode {
        ExtractMode::PerClass => {
            let summary = pipeline.run_per_class(&repos, output, on_progress);
            bar.finish_and_clear();
            print_summary(&summary?);
        }
        ExtractMode::Aggregated => {
            let run = pipeline.run_aggregated(&repos, output, on_progress);
            bar.finish_and_clear();
            let run = run?;
            print_summary(&run.summary);
            if !run.rows.is_empty() {
                print_preview(&run.rows);
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    match &summary.output {
        Some(path) => println!(
            "{} Saved {} ({})",
            style("✓").green(),
            path.display(),
            summary.summary()
        ),
        None => println!(
            "{} No data was collected ({})",
            style("!").yellow(),
            summary.summary()
        ),
    }
}

fn print_preview(rows: &[RepoAggregateRow]) {
    ui::print_header("Preview");
    let preview: Vec<Vec<String>> = rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(RepoAggregateRow::preview_record)
        .collect();
    println!("{}", ui::render_table(&RepoAggregateRow::preview_header(), &preview));
}
