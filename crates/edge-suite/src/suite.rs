//! Suite trait

use async_trait::async_trait;

use crate::{Harness, SuiteResult};

/// One conformance check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Case {
    /// Id, unique within the suite
    pub id: &'static str,
    /// What the case checks
    pub title: &'static str,
    /// Known not to pass on every node; skipped unless asked for
    pub pending: bool,
}

impl Case {
    /// A case that runs by default
    pub const fn new(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            pending: false,
        }
    }

    /// A case that is skipped by default
    pub const fn pending(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            pending: true,
        }
    }
}

/// A group of cases sharing on-chain setup.
///
/// `setup` runs once before the cases; cases run in the order `cases`
/// lists them and may depend on state left by earlier ones.
#[async_trait]
pub trait Suite: Send + Sync {
    /// Id used on the command line
    fn id(&self) -> &'static str;

    /// Human-readable title
    fn title(&self) -> &'static str;

    /// Cases in run order
    fn cases(&self) -> Vec<Case>;

    /// Deploy what the cases share
    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()>;

    /// Run one case by id
    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()>;
}
