//! Shallow `git clone` acquisition

use super::{remove_dir_quietly, AcquireError, Acquirer, ScratchTree};
use crate::config::AcquisitionConfig;
use crate::external::run_external_tool;
use crate::models::RepoRef;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Clones the latest commit only, without blobs until checkout needs them.
#[derive(Debug, Clone)]
pub struct GitCloneAcquirer {
    /// git executable
    pub git: String,
    pub timeout: Duration,
    /// Total clone attempts per repository
    pub max_attempts: u32,
    /// Sleep before retry n is `n * retry_delay`
    pub retry_delay: Duration,
}

impl Default for GitCloneAcquirer {
    fn default() -> Self {
        Self::from_config(&AcquisitionConfig::default())
    }
}

impl GitCloneAcquirer {
    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self {
            git: "git".to_string(),
            timeout: config.clone_timeout(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    fn clone_command(&self, url: &str, target: &Path) -> Vec<String> {
        vec![
            self.git.clone(),
            "clone".to_string(),
            "--depth".to_string(),
            "1".to_string(),
            "--filter=blob:none".to_string(),
            "--single-branch".to_string(),
            url.to_string(),
            target.to_string_lossy().to_string(),
        ]
    }
}

impl Acquirer for GitCloneAcquirer {
    fn acquire(&self, repo: &RepoRef, scratch_root: &Path) -> Result<ScratchTree, AcquireError> {
        std::fs::create_dir_all(scratch_root).map_err(|source| AcquireError::Io {
            path: scratch_root.to_path_buf(),
            source,
        })?;

        let target = scratch_root.join(repo.dir_name());
        let cmd = self.clone_command(&repo.url, &target);
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            // Stale copies and partial clones from a previous attempt
            remove_dir_quietly(&target);

            if attempt > 1 {
                let delay = self.retry_delay * (attempt - 1);
                warn!(
                    "Retrying clone of {} in {}s (attempt {}/{})",
                    repo.id(),
                    delay.as_secs(),
                    attempt,
                    self.max_attempts
                );
                std::thread::sleep(delay);
            }

            debug!("Cloning {} into {}", repo.url, target.display());
            let result = run_external_tool(&cmd, "git", Some(self.timeout), None);
            if result.not_found {
                return Err(AcquireError::GitNotFound);
            }
            if result.exited_ok() && target.is_dir() {
                info!("Cloned {}", repo.id());
                return Ok(ScratchTree::new(target));
            }

            last_reason = result.describe_failure();
            warn!("Clone of {} failed: {}", repo.id(), last_reason);
        }

        remove_dir_quietly(&target);
        Err(AcquireError::CloneFailed {
            repo: repo.id(),
            attempts: self.max_attempts,
            reason: last_reason,
        })
    }
}
