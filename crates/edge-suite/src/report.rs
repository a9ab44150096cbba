//! Run report

use edge_primitives::H256;
use serde::{Deserialize, Serialize};

/// How a case ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    /// Every expectation held
    Passed,
    /// An expectation failed or the case errored
    Failed {
        /// Error message
        message: String,
    },
    /// Not run
    Skipped {
        /// Why
        reason: String,
    },
}

impl CaseStatus {
    /// Short label for text output
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "PASS",
            CaseStatus::Failed { .. } => "FAIL",
            CaseStatus::Skipped { .. } => "SKIP",
        }
    }
}

/// Result of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Suite id
    pub suite: String,
    /// Case id
    pub case: String,
    /// Case title
    pub title: String,
    /// Outcome
    #[serde(flatten)]
    pub status: CaseStatus,
    /// Wall time spent in the case
    pub duration_ms: u64,
    /// Transactions the case submitted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tx_hashes: Vec<H256>,
}

/// Case counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Passed cases
    pub passed: usize,
    /// Failed cases
    pub failed: usize,
    /// Skipped cases
    pub skipped: usize,
}

impl Summary {
    /// All cases
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// Results of a run against one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Profile name
    pub network: String,
    /// Chain id of the node
    pub chain_id: u64,
    /// Per-case results in run order
    pub cases: Vec<CaseReport>,
}

impl Report {
    /// Empty report
    pub fn new(network: impl Into<String>, chain_id: u64) -> Self {
        Self {
            network: network.into(),
            chain_id,
            cases: Vec::new(),
        }
    }

    /// Count cases by status
    pub fn summary(&self) -> Summary {
        self.cases
            .iter()
            .fold(Summary::default(), |mut summary, case| {
                match case.status {
                    CaseStatus::Passed => summary.passed += 1,
                    CaseStatus::Failed { .. } => summary.failed += 1,
                    CaseStatus::Skipped { .. } => summary.skipped += 1,
                }
                summary
            })
    }

    /// No case failed
    pub fn is_success(&self) -> bool {
        self.summary().failed == 0
    }

    /// Cases that failed
    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases
            .iter()
            .filter(|c| matches!(c.status, CaseStatus::Failed { .. }))
    }

    /// Pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
