//! Sequential suite runner
//!
//! Suites run one after another against the same harness. Within a suite,
//! `setup` runs once and the cases follow in declaration order, so a case
//! may build on what an earlier one left on chain.

use std::time::Instant;

use crate::report::{CaseReport, CaseStatus, Report};
use crate::{suites, Case, Harness, Suite, SuiteError, SuiteResult};

/// What to run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Suite ids; empty runs every suite
    pub suites: Vec<String>,
    /// Only this case: `suite/case`, or a bare case id matched in every
    /// selected suite
    pub case: Option<String>,
    /// Run pending cases too
    pub include_pending: bool,
    /// Stop at the first failure
    pub fail_fast: bool,
}

impl RunOptions {
    fn selects(&self, suite: &str, case: &Case) -> bool {
        match self.case.as_deref() {
            None => true,
            Some(filter) => match filter.split_once('/') {
                Some((suite_id, case_id)) => suite_id == suite && case_id == case.id,
                None => filter == case.id,
            },
        }
    }
}

/// Resolve `options.suites` against the built-in suites
pub fn select(options: &RunOptions) -> SuiteResult<Vec<Box<dyn Suite>>> {
    if options.suites.is_empty() {
        return Ok(suites::all());
    }
    options.suites.iter().map(|id| suites::find(id)).collect()
}

/// Run the built-in suites `options` selects
pub async fn run(harness: &Harness, options: &RunOptions) -> SuiteResult<Report> {
    let selected = select(options)?;
    run_suites(harness, selected, options).await
}

/// Run `suites` in order and collect a report
pub async fn run_suites(
    harness: &Harness,
    suites: Vec<Box<dyn Suite>>,
    options: &RunOptions,
) -> SuiteResult<Report> {
    if let Some(id) = &options.case {
        let known = suites
            .iter()
            .any(|s| s.cases().iter().any(|c| options.selects(s.id(), c)));
        if !known {
            return Err(SuiteError::unknown_case(id));
        }
    }

    let mut report = Report::new(harness.profile().name.clone(), harness.chain_id());
    for mut suite in suites {
        let stop = run_suite(harness, suite.as_mut(), options, &mut report).await;
        if stop {
            tracing::warn!("stopping after first failure");
            break;
        }
    }

    let summary = report.summary();
    tracing::info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        "run finished"
    );
    Ok(report)
}

/// Returns true when the run should stop
async fn run_suite(
    harness: &Harness,
    suite: &mut dyn Suite,
    options: &RunOptions,
    report: &mut Report,
) -> bool {
    let suite_id = suite.id();
    let cases: Vec<Case> = suite
        .cases()
        .into_iter()
        .filter(|c| options.selects(suite_id, c))
        .collect();
    if cases.is_empty() {
        return false;
    }

    let mut runnable = 0;
    for case in &cases {
        if options.include_pending || !case.pending {
            runnable += 1;
        } else {
            tracing::warn!(suite = suite_id, case = case.id, "skipping pending case");
        }
    }

    let setup_error = if runnable == 0 {
        None
    } else {
        tracing::info!(suite = suite_id, title = suite.title(), "setting up suite");
        let result = suite.setup(harness).await;
        // Setup transactions are not attributed to any case.
        harness.take_tx_hashes();
        result.err()
    };

    for case in cases {
        let entry = |status, duration_ms, tx_hashes| CaseReport {
            suite: suite_id.to_string(),
            case: case.id.to_string(),
            title: case.title.to_string(),
            status,
            duration_ms,
            tx_hashes,
        };

        if case.pending && !options.include_pending {
            report.cases.push(entry(
                CaseStatus::Skipped {
                    reason: "pending".to_string(),
                },
                0,
                Vec::new(),
            ));
            continue;
        }

        if let Some(err) = &setup_error {
            tracing::error!(suite = suite_id, case = case.id, error = %err, "suite setup failed");
            report.cases.push(entry(
                CaseStatus::Failed {
                    message: err.to_string(),
                },
                0,
                Vec::new(),
            ));
            if options.fail_fast {
                return true;
            }
            continue;
        }

        let started = Instant::now();
        let result = suite.run_case(harness, case.id).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let tx_hashes = harness.take_tx_hashes();

        let status = match result {
            Ok(()) => {
                tracing::info!(suite = suite_id, case = case.id, duration_ms, "passed");
                CaseStatus::Passed
            }
            Err(err) => {
                tracing::error!(suite = suite_id, case = case.id, error = %err, "failed");
                CaseStatus::Failed {
                    message: err.to_string(),
                }
            }
        };
        let failed = matches!(status, CaseStatus::Failed { .. });
        report.cases.push(entry(status, duration_ms, tx_hashes));
        if failed && options.fail_fast {
            return true;
        }
    }
    false
}
