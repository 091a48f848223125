//! CK metrics extraction
//!
//! Drives the prebuilt CK jar against a source tree. A run first tries with
//! dependency jars on the classpath and, if that fails, once more on sources
//! only. The resulting `class.csv` is read through [`ClassTable`].

mod runner;
mod schema;

pub use runner::{CkOutput, CkRunner};
pub use schema::ClassTable;

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Whether CK resolves types through the jars found in the source tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    IncludeJars,
    SourceOnly,
}

impl ScopeMode {
    /// Value of CK's use-jars positional argument
    pub fn as_arg(&self) -> &'static str {
        match self {
            ScopeMode::IncludeJars => "true",
            ScopeMode::SourceOnly => "false",
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeMode::IncludeJars => write!(f, "with jars"),
            ScopeMode::SourceOnly => write!(f, "source only"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackState {
    Primary,
    Fallback,
    Exhausted,
}

/// Primary mode, then one fallback, then nothing.
///
/// ```
/// use ck_harvest::ck::{FallbackPolicy, ScopeMode};
///
/// let modes: Vec<_> = FallbackPolicy::new().collect();
/// assert_eq!(modes, vec![ScopeMode::IncludeJars, ScopeMode::SourceOnly]);
/// ```
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    state: FallbackState,
}

impl FallbackPolicy {
    pub fn new() -> Self {
        Self {
            state: FallbackState::Primary,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == FallbackState::Exhausted
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FallbackPolicy {
    type Item = ScopeMode;

    fn next(&mut self) -> Option<ScopeMode> {
        match self.state {
            FallbackState::Primary => {
                self.state = FallbackState::Fallback;
                Some(ScopeMode::IncludeJars)
            }
            FallbackState::Fallback => {
                self.state = FallbackState::Exhausted;
                Some(ScopeMode::SourceOnly)
            }
            FallbackState::Exhausted => None,
        }
    }
}

/// One failed CK invocation
#[derive(Debug, Clone)]
pub struct ModeFailure {
    pub mode: ScopeMode,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("CK failed in every mode: {}", describe(.0))]
    AllModesFailed(Vec<ModeFailure>),

    #[error("Failed to create CK output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe(failures: &[ModeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("[{}] {}", f.mode, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Produces CK output for a source tree.
pub trait Extractor {
    fn extract(&self, source: &Path, scratch_root: &Path) -> Result<CkOutput, ExtractError>;
}

impl<T: Extractor + ?Sized> Extractor for &T {
    fn extract(&self, source: &Path, scratch_root: &Path) -> Result<CkOutput, ExtractError> {
        (**self).extract(source, scratch_root)
    }
}
