//! # edge-suite
//!
//! EVM edge-case conformance suites, run against a live JSON-RPC node.
//!
//! A [`Harness`] connects to the node a [`NetworkProfile`] names, checks its
//! chain id and loads the profile's signers. Each [`Suite`] deploys the
//! contracts it needs and runs its [`Case`]s through the harness, turning
//! every transaction and call into a [`TxOutcome`] or [`CallOutcome`] that
//! the case then holds to an expectation. The [`runner`] drives the suites
//! and collects a [`Report`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use edge_suite::{runner, Harness, NetworkProfile, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let profile = NetworkProfile::resolve("besu_local", None)?;
//!     let harness = Harness::connect(profile, "artifacts").await?;
//!
//!     let options = RunOptions {
//!         suites: vec!["errors".to_string()],
//!         ..Default::default()
//!     };
//!     let report = runner::run(&harness, &options).await?;
//!     println!("{}", report.to_json()?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod harness;
pub mod network;
pub mod outcome;
pub mod report;
pub mod runner;
mod suite;
pub mod suites;

pub use error::{ensure, ensure_eq, SuiteError, SuiteResult};
pub use harness::{Deployment, Harness, Overrides};
pub use network::{NetworkProfile, ProfileOverrides, TxKind};
pub use outcome::{CallOutcome, TxOutcome};
pub use report::{CaseReport, CaseStatus, Report, Summary};
pub use runner::RunOptions;
pub use suite::{Case, Suite};
