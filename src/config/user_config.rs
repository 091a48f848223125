//! User-level configuration for ck-harvest
//!
//! Supports loading the GitHub token from:
//! - Environment variables (`GITHUB_TOKEN`), including a `.env` file
//! - ~/.config/ck-harvest/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the GitHub token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub github: GithubConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GithubConfig {
    /// Personal access token used for the GraphQL API
    pub token: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest), after loading `.env`
    /// 2. User config (~/.config/ck-harvest/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.github.token = Some(token.trim().to_string());
            }
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ck-harvest").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.github.token.is_some()
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# ck-harvest user configuration

[github]
# Token for the GraphQL search API (GITHUB_TOKEN takes priority)
# Create one at https://github.com/settings/tokens (no scopes needed for public repos)
# token = "ghp_..."
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.has_token());
        assert!(config.github_token().is_none());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[github]
token = "ghp_test"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github_token(), Some("ghp_test"));
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert!(!config.has_token());
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let mut base = UserConfig {
            github: GithubConfig {
                token: Some("old".into()),
            },
        };
        base.merge(UserConfig {
            github: GithubConfig {
                token: Some("new".into()),
            },
        });
        assert_eq!(base.github_token(), Some("new"));

        base.merge(UserConfig::default());
        assert_eq!(base.github_token(), Some("new"));
    }

    #[test]
    fn test_user_config_path_returns_some() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("ck-harvest/config.toml"));
        }
    }
}
