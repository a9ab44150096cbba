//! CLI error types

use edge_sdk::SdkError;
use edge_suite::SuiteError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Node could not be reached or the harness could not start
    #[error("Cannot reach network {network}: {reason}")]
    Unreachable {
        /// Profile name
        network: String,
        /// Underlying error
        reason: String,
    },

    /// Cases failed; the report has already been printed
    #[error("{failed} of {total} cases failed")]
    CasesFailed {
        /// Failed cases
        failed: usize,
        /// All cases in the report
        total: usize,
    },

    /// Suite error
    #[error(transparent)]
    Suite(#[from] SuiteError),

    /// SDK error
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}
