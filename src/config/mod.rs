//! Configuration module for ck-harvest
//!
//! This module handles:
//! - Run configuration (ck-harvest.toml)
//! - User configuration and the GitHub token (env, .env, ~/.config)

mod project_config;
mod user_config;

pub use project_config::{
    example_config, load_harvest_config, AcquisitionConfig, AggregationConfig, DiscoveryConfig,
    ExtractionConfig, HarvestConfig, CONFIG_FILE_NAME, DEFAULT_CK_JAR,
};
pub use user_config::{GithubConfig, UserConfig, TOKEN_ENV};
