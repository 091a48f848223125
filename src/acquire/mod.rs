//! Repository acquisition
//!
//! Materializes one repository's source tree under the scratch root. The tree
//! is owned by a [`ScratchTree`] guard and removed when the guard drops.

mod clone;

pub use clone::GitCloneAcquirer;

use crate::models::RepoRef;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Failed to clone {repo} after {attempts} attempt(s): {reason}")]
    CloneFailed {
        repo: String,
        attempts: u32,
        reason: String,
    },

    #[error("git not found on PATH")]
    GitNotFound,

    #[error("Failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches a repository into a local directory.
pub trait Acquirer {
    fn acquire(&self, repo: &RepoRef, scratch_root: &Path) -> Result<ScratchTree, AcquireError>;
}

impl<T: Acquirer + ?Sized> Acquirer for &T {
    fn acquire(&self, repo: &RepoRef, scratch_root: &Path) -> Result<ScratchTree, AcquireError> {
        (**self).acquire(repo, scratch_root)
    }
}

/// A repository's local source tree. Deleted on drop.
#[derive(Debug)]
pub struct ScratchTree {
    path: PathBuf,
    armed: bool,
}

impl ScratchTree {
    /// Take ownership of an existing directory
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarm cleanup and hand back the path
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchTree {
    fn drop(&mut self) {
        if self.armed {
            remove_dir_quietly(&self.path);
        }
    }
}

/// Best-effort recursive delete; failures are logged and swallowed.
pub fn remove_dir_quietly(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_dir_all(path) {
        debug!("Could not remove {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_tree_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("o__n");
        std::fs::create_dir_all(path.join("src")).unwrap();
        std::fs::write(path.join("src").join("A.java"), "class A {}").unwrap();

        {
            let tree = ScratchTree::new(path.clone());
            assert_eq!(tree.path(), path.as_path());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_keep_disarms_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("kept");
        std::fs::create_dir_all(&path).unwrap();

        let kept = ScratchTree::new(path.clone()).keep();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn test_remove_missing_dir_is_noop() {
        let root = tempfile::tempdir().unwrap();
        remove_dir_quietly(&root.path().join("never-created"));
        drop(ScratchTree::new(root.path().join("also-missing")));
    }
}
