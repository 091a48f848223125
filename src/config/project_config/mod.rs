//! Run configuration support
//!
//! Loads run settings from `ck-harvest.toml` in the working directory.
//! Every field has a default, so the file (and any section) is optional.
//!
//! # Configuration Format
//!
//! ```toml
//! # ck-harvest.toml
//!
//! [discovery]
//! search = "language:java sort:stars-desc"
//! page_size = 25
//! max_repos = 1000
//! max_retries = 4
//! retry_base = 1.5
//! # query_file = "query.graphql"
//!
//! [acquisition]
//! scratch_dir = ".ck-harvest-scratch"
//! clone_timeout_secs = 600
//! max_attempts = 2
//! retry_delay_secs = 5
//!
//! [extraction]
//! java = "java"
//! jar = "ck/target/ck-0.7.1-SNAPSHOT-jar-with-dependencies.jar"
//! timeout_secs = 1800
//!
//! [aggregation]
//! checkpoint_every = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "ck-harvest.toml";

/// Default location of the CK fat jar after `mvn clean package`
pub const DEFAULT_CK_JAR: &str = "ck/target/ck-0.7.1-SNAPSHOT-jar-with-dependencies.jar";

/// Full run configuration, one section per pipeline stage
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HarvestConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// GitHub search settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// GraphQL endpoint
    pub endpoint: String,
    /// GitHub search string passed as `$searchQuery`
    pub search: String,
    /// Custom GraphQL document (default: built-in repository search)
    pub query_file: Option<PathBuf>,
    /// Results requested per page (`$pageSize`, GitHub caps at 100)
    pub page_size: u32,
    /// Stop after this many repositories
    pub max_repos: usize,
    /// Retries per page before discovery is aborted
    pub max_retries: u32,
    /// Backoff base; the n-th retry waits `retry_base^n` seconds
    pub retry_base: f64,
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
    /// Where `discover` writes its table
    pub output: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.github.com/graphql".to_string(),
            search: "language:java sort:stars-desc".to_string(),
            query_file: None,
            page_size: 25,
            max_repos: 1000,
            max_retries: 4,
            retry_base: 1.5,
            timeout_secs: 60,
            output: PathBuf::from("repositories.csv"),
        }
    }
}

/// Clone settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Directory holding clones and CK output directories
    pub scratch_dir: PathBuf,
    pub clone_timeout_secs: u64,
    /// Total clone attempts per repository
    pub max_attempts: u32,
    /// Linear backoff unit: retry n waits `n * retry_delay_secs`
    pub retry_delay_secs: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(".ck-harvest-scratch"),
            clone_timeout_secs: 600,
            max_attempts: 2,
            retry_delay_secs: 5,
        }
    }
}

impl AcquisitionConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// CK invocation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Java launcher
    pub java: String,
    /// CK jar with dependencies
    pub jar: PathBuf,
    /// Wall-clock limit per CK invocation
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar: PathBuf::from(DEFAULT_CK_JAR),
            timeout_secs: 1800,
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output settings for the two aggregation modes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Write a checkpoint every N aggregated repositories
    pub checkpoint_every: usize,
    pub class_output: PathBuf,
    pub aggregated_output: PathBuf,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: 10,
            class_output: PathBuf::from("all_class_metrics.csv"),
            aggregated_output: PathBuf::from("aggregated_repo_metrics.csv"),
        }
    }
}

/// Load run configuration from `dir/ck-harvest.toml`, falling back to defaults
pub fn load_harvest_config(dir: &Path) -> HarvestConfig {
    let toml_path = dir.join(CONFIG_FILE_NAME);
    if !toml_path.exists() {
        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        return HarvestConfig::default();
    }

    match load_toml_config(&toml_path) {
        Ok(config) => {
            debug!("Loaded run config from {}", toml_path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", toml_path.display(), e);
            HarvestConfig::default()
        }
    }
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<HarvestConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: HarvestConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Example file written by `ck-harvest config init`
pub fn example_config() -> &'static str {
    r#"# ck-harvest run configuration

[discovery]
# GitHub search syntax: https://docs.github.com/en/search-github
search = "language:java sort:stars-desc"
page_size = 25
max_repos = 1000
max_retries = 4
retry_base = 1.5
# query_file = "query.graphql"

[acquisition]
scratch_dir = ".ck-harvest-scratch"
clone_timeout_secs = 600
max_attempts = 2
retry_delay_secs = 5

[extraction]
java = "java"
jar = "ck/target/ck-0.7.1-SNAPSHOT-jar-with-dependencies.jar"
timeout_secs = 1800

[aggregation]
checkpoint_every = 10
class_output = "all_class_metrics.csv"
aggregated_output = "aggregated_repo_metrics.csv"
"#
}
