//! Sequential step execution
//!
//! Steps run one at a time, in order. The first failing step stops the run;
//! steps that already succeeded are not undone.

use crate::runner::{Executor, InvocationResult, StepDescriptor};
use tracing::debug;

/// Run steps in order, stopping at the first failure
pub fn run_steps(steps: &[StepDescriptor], executor: &dyn Executor) -> InvocationResult {
    let mut outcomes = Vec::with_capacity(steps.len());

    for (index, step) in steps.iter().enumerate() {
        let outcome = executor.execute(step);
        let success = outcome.success();
        outcomes.push(outcome);

        if !success {
            debug!(
                step = index + 1,
                total = steps.len(),
                command = %step.command_line(),
                "step failed, skipping the rest"
            );
            return InvocationResult {
                success: false,
                outcomes,
            };
        }
    }

    InvocationResult {
        success: true,
        outcomes,
    }
}
