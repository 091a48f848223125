//! CLI command definitions and handlers

mod clean;
mod discover;
mod doctor;
mod extract;
mod menu;
mod single;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::{load_harvest_config, HarvestConfig};
use crate::error::HarvestError;

/// ck-harvest - CK metrics for GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "ck-harvest")]
#[command(
    version,
    about = "Discover GitHub repositories, run the CK metrics tool on each and aggregate CBO, DIT and LCOM",
    long_about = "ck-harvest searches GitHub for repositories, shallow-clones each one, runs the \
CK static analysis jar on it and keeps the CBO, DIT and LCOM class metrics, either per class \
or summarized per repository.\n\n\
Run without a subcommand for the interactive menu.",
    after_help = "\
Examples:
  ck-harvest discover --max-repos 100                  Collect repositories.csv
  ck-harvest extract --mode aggregated -i repositories.csv
  ck-harvest extract --mode per-class -i repos.csv -o classes.csv
  ck-harvest single https://github.com/google/guava    Print the first classes of one repository
  ck-harvest doctor                                    Check java, git, the CK jar and the token"
)]
pub struct Cli {
    /// Path to the CK jar (default: from ck-harvest.toml)
    #[arg(long, global = true)]
    pub jar: Option<PathBuf>,

    /// Directory for clones and CK output (default: .ck-harvest-scratch)
    #[arg(long, global = true)]
    pub scratch_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search GitHub and write the matching repositories to a CSV file
    #[command(after_help = "\
Examples:
  ck-harvest discover                                   Top Java repositories by stars
  ck-harvest discover --query 'language:java stars:>1000' --max-repos 50
  ck-harvest discover --query-file my-query.graphql -o repos.csv

Requires GITHUB_TOKEN in the environment or a .env file.")]
    Discover {
        /// GitHub search string (default: from ck-harvest.toml)
        #[arg(long)]
        query: Option<String>,

        /// GraphQL document to use instead of the built-in search
        #[arg(long)]
        query_file: Option<PathBuf>,

        /// Maximum repositories to collect
        #[arg(long)]
        max_repos: Option<usize>,

        /// Results per request
        #[arg(long)]
        page_size: Option<u32>,

        /// Output CSV path (default: repositories.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Run CK over every repository in a CSV file
    Extract {
        /// Per-class rows or one summary row per repository
        #[arg(long, value_enum)]
        mode: ExtractMode,

        /// CSV with url, owner and name columns
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output CSV path (default depends on mode)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Run CK on one repository and print the first classes
    Single {
        /// GitHub repository URL
        url: String,
    },

    /// Check that java, git, the CK jar and the GitHub token are available
    Doctor,

    /// Remove leftover scratch directories and checkpoint files
    Clean {
        /// Show what would be removed without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write example config files
    Init,
    /// Show the effective config and paths
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractMode {
    /// Every class of every repository, tagged with owner/name
    PerClass,
    /// Descriptive statistics per repository
    Aggregated,
}

impl ExtractMode {
    pub fn default_output(&self, config: &HarvestConfig) -> PathBuf {
        match self {
            ExtractMode::PerClass => config.aggregation.class_output.clone(),
            ExtractMode::Aggregated => config.aggregation.aggregated_output.clone(),
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = settings(&cli, Path::new("."));

    match cli.command {
        None => menu::run(&config),

        Some(Commands::Discover {
            query,
            query_file,
            max_repos,
            page_size,
            output,
        }) => {
            let mut discovery = config.discovery.clone();
            if let Some(q) = query {
                discovery.search = q;
            }
            if query_file.is_some() {
                discovery.query_file = query_file;
            }
            if let Some(n) = max_repos {
                discovery.max_repos = n;
            }
            if let Some(n) = page_size {
                discovery.page_size = n;
            }
            if let Some(o) = output {
                discovery.output = o;
            }
            discover::run(&discovery)
        }

        Some(Commands::Extract {
            mode,
            input,
            output,
        }) => {
            let output = output.unwrap_or_else(|| mode.default_output(&config));
            extract::run(&config, mode, &input, &output)
        }

        Some(Commands::Single { url }) => single::run(&config, &url),

        Some(Commands::Doctor) => doctor::run(&config),

        Some(Commands::Clean { dry_run }) => clean::run(&config, Path::new("."), dry_run),

        Some(Commands::Config { action }) => run_config_action(action, &config),
    }
}

/// Project config with the global flag overrides applied
fn settings(cli: &Cli, dir: &Path) -> HarvestConfig {
    let mut config = load_harvest_config(dir);
    if let Some(jar) = &cli.jar {
        config.extraction.jar = jar.clone();
    }
    if let Some(scratch) = &cli.scratch_dir {
        config.acquisition.scratch_dir = scratch.clone();
    }
    config
}

/// Fail with exit code 1 unless the CK jar is on disk
pub(crate) fn require_jar(config: &HarvestConfig) -> Result<()> {
    if config.extraction.jar.is_file() {
        return Ok(());
    }
    Err(HarvestError::MissingPrerequisite {
        what: "CK jar",
        path: config.extraction.jar.clone(),
        hint: "Build it first: git clone https://github.com/mauricioaniche/ck.git && cd ck && mvn clean package",
    }
    .into())
}

fn run_config_action(action: ConfigAction, config: &HarvestConfig) -> Result<()> {
    use crate::config::{example_config, UserConfig, CONFIG_FILE_NAME, TOKEN_ENV};
    use console::style;

    match action {
        ConfigAction::Init => {
            let project = Path::new(CONFIG_FILE_NAME);
            if project.exists() {
                println!("{} {} already exists", style("○").dim(), project.display());
            } else {
                std::fs::write(project, example_config())?;
                println!("{} Wrote {}", style("✓").green(), project.display());
            }
            let user = UserConfig::init_user_config()?;
            println!("{} User config at {}", style("✓").green(), user.display());
            println!("\nSet your token via environment or a .env file:");
            println!("  export {}=\"ghp_...\"", TOKEN_ENV);
            Ok(())
        }
        ConfigAction::Show => {
            let user = UserConfig::load()?;
            println!("{}", style("Config paths:").bold());
            if let Some(user_path) = UserConfig::user_config_path() {
                let status = if user_path.exists() { "✓" } else { "(not found)" };
                println!("  User:    {} {}", user_path.display(), status);
            }
            let proj_status = if Path::new(CONFIG_FILE_NAME).exists() {
                "✓"
            } else {
                "(not found)"
            };
            println!("  Project: ./{} {}", CONFIG_FILE_NAME, proj_status);
            println!();
            println!("{}", style("Effective settings:").bold());
            println!("{}", toml::to_string_pretty(config)?);
            let token_status = if user.has_token() {
                "✓ configured"
            } else {
                "✗ not set"
            };
            println!("{}: {}", TOKEN_ENV, token_status);
            Ok(())
        }
    }
}
