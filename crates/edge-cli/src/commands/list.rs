//! `list`: suites and their cases

use edge_suite::suites;
use serde_json::{json, Value};

use crate::{output::Output, CliError};

pub fn execute(json: bool) -> Result<(), CliError> {
    let all = suites::all();

    let entries: Vec<Value> = all
        .iter()
        .map(|suite| {
            let cases: Vec<Value> = suite
                .cases()
                .iter()
                .map(|c| json!({ "id": c.id, "title": c.title, "pending": c.pending }))
                .collect();
            json!({ "id": suite.id(), "title": suite.title(), "cases": cases })
        })
        .collect();

    let mut lines = Vec::new();
    for suite in &all {
        lines.push(format!("{}  {}", suite.id(), suite.title()));
        for case in suite.cases() {
            let flag = if case.pending { " (pending)" } else { "" };
            lines.push(format!("  {:<32} {}{}", case.id, case.title, flag));
        }
    }

    Output::new(json)
        .field("suites", entries)
        .lines(lines)
        .print();
    Ok(())
}
