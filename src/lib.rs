//! ghx - a companion to the GitHub CLI
//!
//! This library provides the pieces behind the `ghx` binary: a blocking REST
//! transport, repository scope resolution, and a bulk issue-edit engine that
//! validates a whole batch before touching any issue.

use thiserror::Error;

pub mod api;
pub mod bulk;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod scope;
pub mod session;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum GhxError {
    /// Bulk edit aborted before any issue was touched
    #[error(transparent)]
    Bulk(#[from] bulk::BulkError),
    /// Invalid range or plan, rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(#[from] bulk::ValidationError),
    /// Remote API error outside a bulk edit
    #[error("API error: {0}")]
    Api(#[from] api::ApiError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// No usable repository
    #[error("Configuration error: {0}")]
    Scope(#[from] scope::ScopeError),
    /// No usable API token
    #[error("Configuration error: {0}")]
    Credentials(String),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// CSV output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
