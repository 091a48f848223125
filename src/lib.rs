//! ck-harvest - CK metrics for GitHub repositories
//!
//! Discovers repositories through the GitHub GraphQL search API, shallow-clones
//! each one, runs the CK jar on it and keeps the CBO, DIT and LCOM class
//! metrics, either per class or summarized per repository.

pub mod acquire;
pub mod aggregate;
pub mod ck;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod github;
pub mod models;
pub mod pipeline;
pub mod tables;
