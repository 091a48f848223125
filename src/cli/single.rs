//! Single command - CK on one repository

use anyhow::{Context, Result};
use console::style;

use super::{require_jar, ui};
use crate::acquire::GitCloneAcquirer;
use crate::ck::{CkRunner, ClassTable};
use crate::config::HarvestConfig;
use crate::models::{format_value, ClassMetricRow, Metric, RepoRef};
use crate::pipeline::Pipeline;

const PREVIEW_ROWS: usize = 5;

pub fn run(config: &HarvestConfig, url: &str) -> Result<()> {
    require_jar(config)?;
    let repo = RepoRef::from_github_url(url)
        .with_context(|| format!("Not a GitHub repository URL: '{}'", url.trim()))?;

    let pipeline = Pipeline::new(
        GitCloneAcquirer::from_config(&config.acquisition),
        CkRunner::from_config(&config.extraction),
        &config.acquisition.scratch_dir,
    );

    let spinner = ui::spinner(format!("Cloning and analyzing {}...", repo.id()));
    let table = pipeline.run_single(&repo);
    spinner.finish_and_clear();
    let table = table?;

    print_class_preview(&repo, &table);
    Ok(())
}

fn print_class_preview(repo: &RepoRef, table: &ClassTable) {
    ui::print_header(&format!("Class metrics for {} (CBO, DIT, LCOM)", repo.id()));
    let columns = table.available_columns();
    println!("{} {}", style("Available columns:").dim(), columns.join(", "));
    println!("{} {}\n", style("Classes:").dim(), table.len());

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| columns.iter().map(|c| cell(row, c)).collect())
        .collect();
    println!("{}", ui::render_table(&header, &rows));
}

fn cell(row: &ClassMetricRow, column: &str) -> String {
    match column {
        "file" => row.file.clone(),
        "class" => row.class.clone(),
        "type" => row.kind.clone().unwrap_or_default(),
        other => Metric::all()
            .iter()
            .find(|m| m.column() == other)
            .map(|m| format_value(row.metric(*m)))
            .unwrap_or_default(),
    }
}
