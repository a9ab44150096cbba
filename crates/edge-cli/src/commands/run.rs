//! `run`: execute suites against the selected network

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use edge_suite::runner::{self, RunOptions};
use edge_suite::{CaseStatus, Harness, Report};

use crate::{config::Config, output, CliError};

/// Arguments of `run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Suite to run; repeat for several, omit for all
    #[arg(long = "suite", value_name = "ID")]
    suites: Vec<String>,
    /// Run only this case: SUITE/CASE, or a bare case id in every selected suite
    #[arg(long, value_name = "ID")]
    case: Option<String>,
    /// Run cases marked pending
    #[arg(long)]
    include_pending: bool,
    /// Stop at the first failing case
    #[arg(long)]
    fail_fast: bool,
    /// Compiled artifacts directory
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,
    /// Override the profile's settle delay
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,
}

impl RunArgs {
    pub async fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let options = RunOptions {
            suites: self.suites,
            case: self.case,
            include_pending: self.include_pending,
            fail_fast: self.fail_fast,
        };
        // Unknown suite ids fail before anything is sent.
        runner::select(&options)?;

        let mut profile = config.profile(&config.network)?;
        if let Some(ms) = self.settle_ms {
            profile.settle_delay = Duration::from_millis(ms);
        }
        let artifacts = self
            .artifacts
            .unwrap_or_else(|| config.artifacts_dir.clone());

        let network = profile.name.clone();
        let harness = Harness::connect(profile, artifacts)
            .await
            .map_err(|e| CliError::Unreachable {
                network,
                reason: e.to_string(),
            })?;

        let report = runner::run(&harness, &options).await?;
        if json {
            output::print_json(&serde_json::to_value(&report)?);
        } else {
            for line in render(&report) {
                println!("{}", line);
            }
        }

        let summary = report.summary();
        if summary.failed > 0 {
            return Err(CliError::CasesFailed {
                failed: summary.failed,
                total: summary.total(),
            });
        }
        Ok(())
    }
}

/// Text rendering of a report
fn render(report: &Report) -> Vec<String> {
    let mut lines = vec![format!(
        "Network {} (chain {})",
        report.network, report.chain_id
    )];

    let mut suite = "";
    for case in &report.cases {
        if case.suite != suite {
            suite = case.suite.as_str();
            lines.push(String::new());
            lines.push(suite.to_string());
        }
        let detail = match &case.status {
            CaseStatus::Passed => format!("({} ms)", case.duration_ms),
            CaseStatus::Failed { message } => format!("({} ms) {}", case.duration_ms, message),
            CaseStatus::Skipped { reason } => format!("[{}]", reason),
        };
        lines.push(format!(
            "  {} {:<32} {}",
            case.status.label(),
            case.case,
            detail
        ));
        for hash in &case.tx_hashes {
            lines.push(format!("         tx {}", hash));
        }
    }

    let summary = report.summary();
    lines.push(String::new());
    lines.push(format!(
        "{} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    ));
    lines
}
