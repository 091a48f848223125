//! Clean command - remove scratch directories and checkpoints

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::HarvestConfig;
use crate::pipeline::checkpoint_path;

/// Leftovers from interrupted runs: the scratch root, stray CK output
/// directories in `dir` and the checkpoints of the configured outputs.
fn find_leftovers(config: &HarvestConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    let scratch = resolve(dir, &config.acquisition.scratch_dir);
    if scratch.is_dir() {
        found.push(scratch);
    }

    for output in [&config.aggregation.class_output, &config.aggregation.aggregated_output] {
        let checkpoint = checkpoint_path(&resolve(dir, output));
        if checkpoint.is_file() && !found.contains(&checkpoint) {
            found.push(checkpoint);
        }
    }

    for entry in std::fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        let path = entry.path();
        let stray_output =
            path.is_dir() && entry.file_name().to_string_lossy().starts_with("ck_output_");
        if stray_output && !found.contains(&path) {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}

fn resolve(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

pub fn run(config: &HarvestConfig, dir: &Path, dry_run: bool) -> Result<()> {
    let found = find_leftovers(config, dir)?;

    if found.is_empty() {
        println!("Nothing to clean.");
        return Ok(());
    }

    println!(
        "Found {} leftover path{}:",
        found.len(),
        if found.len() == 1 { "" } else { "s" }
    );
    for path in &found {
        println!("  {}", path.display());
    }

    if dry_run {
        println!("\nDry run - nothing removed. Run without --dry-run to delete.");
        return Ok(());
    }

    println!();
    let mut removed = 0;
    for path in &found {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match result {
            Ok(()) => {
                removed += 1;
                println!("Removed: {}", path.display());
            }
            Err(e) => eprintln!("Failed to remove {}: {}", path.display(), e),
        }
    }

    println!("\nCleaned {} of {}.", removed, found.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_and_removes_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join(".ck-harvest-scratch").join("o__n")).unwrap();
        std::fs::create_dir_all(root.join("ck_output_1700000000")).unwrap();
        std::fs::write(root.join("temp_aggregated_repo_metrics.csv"), "repo\n").unwrap();
        std::fs::write(root.join("aggregated_repo_metrics.csv"), "repo\n").unwrap();
        std::fs::write(root.join("repositories.csv"), "url\n").unwrap();
        std::fs::write(root.join("temp_notes.csv"), "mine\n").unwrap();

        let config = HarvestConfig::default();
        let found = find_leftovers(&config, root).unwrap();
        assert_eq!(found.len(), 3);

        run(&config, root, true).unwrap();
        assert!(root.join("ck_output_1700000000").exists());

        run(&config, root, false).unwrap();
        assert!(!root.join(".ck-harvest-scratch").exists());
        assert!(!root.join("ck_output_1700000000").exists());
        assert!(!root.join("temp_aggregated_repo_metrics.csv").exists());
        assert!(root.join("aggregated_repo_metrics.csv").exists());
        assert!(root.join("repositories.csv").exists());
        assert!(root.join("temp_notes.csv").exists());
    }

    #[test]
    fn test_checkpoints_follow_configured_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("out")).unwrap();
        std::fs::write(root.join("out").join("temp_summary.csv"), "repo\n").unwrap();
        std::fs::write(root.join("temp_aggregated_repo_metrics.csv"), "repo\n").unwrap();

        let mut config = HarvestConfig::default();
        config.aggregation.aggregated_output = PathBuf::from("out/summary.csv");
        let found = find_leftovers(&config, root).unwrap();
        assert_eq!(found, vec![root.join("out").join("temp_summary.csv")]);
    }
}
