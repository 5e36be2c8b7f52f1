//! Result aggregation
//!
//! Turns the outcomes of a run into one report. A successful run reports
//! every step; a failed run reports only the failing step, on one line.

use crate::runner::InvocationResult;

/// Format the outcome of a run
pub fn aggregate(result: &InvocationResult) -> String {
    if result.success {
        result
            .outcomes
            .iter()
            .map(|outcome| outcome.text())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        result
            .outcomes
            .iter()
            .filter(|outcome| !outcome.success())
            .map(|outcome| single_line(&outcome.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" - ")
}
