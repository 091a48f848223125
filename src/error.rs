//! Run-level errors that decide the process exit code

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end the whole run with a specific exit code.
///
/// Everything else bubbles up as a plain `anyhow::Error` and exits with 1.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("{what} not found: {}\n{hint}", path.display())]
    MissingPrerequisite {
        what: &'static str,
        path: PathBuf,
        hint: &'static str,
    },

    #[error("Missing credential: {env_var} is not set (environment or .env file)")]
    MissingToken { env_var: &'static str },

    #[error("Invalid choice '{0}'. Expected 1, 2 or 3.")]
    InvalidChoice(String),
}

impl HarvestError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HarvestError::MissingPrerequisite { .. } | HarvestError::MissingToken { .. } => 1,
            HarvestError::InvalidChoice(_) => 2,
        }
    }
}

/// Exit code for an arbitrary error returned by a command
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<HarvestError>()
        .map(HarvestError::exit_code)
        .unwrap_or(1)
}
