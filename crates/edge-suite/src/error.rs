//! Suite errors

use edge_sdk::SdkError;

/// Result type for harness operations and case bodies
pub type SuiteResult<T> = Result<T, SuiteError>;

/// Suite errors
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// Harness or suite setup failed
    #[error("setup failed: {0}")]
    Setup(String),

    /// A transaction could not be built or submitted
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// An expectation did not hold
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Suite or case id not known
    #[error("unknown {kind}: {id}")]
    Unknown {
        /// `suite` or `case`
        kind: &'static str,
        /// The id asked for
        id: String,
    },

    /// Client error
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl SuiteError {
    /// Shorthand for an assertion failure
    pub fn assertion(msg: impl Into<String>) -> Self {
        SuiteError::Assertion(msg.into())
    }

    pub(crate) fn unknown_case(id: &str) -> Self {
        SuiteError::Unknown {
            kind: "case",
            id: id.to_string(),
        }
    }
}

/// Fail with an assertion error unless `cond` holds
pub fn ensure(cond: bool, msg: impl FnOnce() -> String) -> SuiteResult<()> {
    if cond {
        Ok(())
    } else {
        Err(SuiteError::Assertion(msg()))
    }
}

/// Fail with an assertion error unless `left == right`
pub fn ensure_eq<T: PartialEq + std::fmt::Debug>(left: T, right: T, what: &str) -> SuiteResult<()> {
    ensure(left == right, || {
        format!("{}: expected {:?}, got {:?}", what, right, left)
    })
}
