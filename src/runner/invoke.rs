//! Phase invocation
//!
//! Ties the pieces together for one phase run: look up the phase, resolve its
//! options, expand it into steps, run them, and aggregate the outcome.

use crate::config::{resolve, OptionMap, OverrideLookup};
use crate::error::{ExecutionError, Result};
use crate::runner::{aggregate, run_steps, Context, Executor, Phase, StepDescriptor, StepOutcome};
use tracing::debug;

/// Run one phase and return its success report.
///
/// A failing step ends the invocation with [`ExecutionError::StepFailed`]
/// carrying the failure report. Nothing is spawned when the phase is unknown
/// or required options are missing.
pub fn invoke(
    phase: &str,
    options: &OptionMap,
    overrides: &dyn OverrideLookup,
    ctx: &Context,
    executor: &dyn Executor,
) -> Result<String> {
    let phase: Phase = phase.parse()?;
    let config = resolve(&phase.keys(), options, overrides, &ctx.scope)?;
    ctx.print_flags(&config);

    let steps = phase.steps(&config);
    debug!(phase = %phase, target = %ctx.scope.target, steps = steps.len(), "dispatching phase");

    let echo = Echo {
        ctx,
        inner: executor,
    };
    let result = run_steps(&steps, &echo);
    let report = aggregate(&result);

    if result.success {
        Ok(report)
    } else {
        Err(ExecutionError::StepFailed(report).into())
    }
}

/// Prints each step before handing it to the real executor
struct Echo<'a> {
    ctx: &'a Context,
    inner: &'a dyn Executor,
}

impl Executor for Echo<'_> {
    fn execute(&self, step: &StepDescriptor) -> StepOutcome {
        self.ctx.print_run(&step.to_string());
        self.inner.execute(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigKey, Overrides, Value};
    use crate::error::{ConfigError, GitDistError};
    use crate::runner::Verbosity;
    use std::cell::RefCell;

    /// Succeeds (or fails) every step and records the command lines
    struct RecordingExecutor {
        fail_on: Option<&'static str>,
        calls: RefCell<Vec<StepDescriptor>>,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            RecordingExecutor {
                fail_on: None,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing_on(subcommand: &'static str) -> Self {
            RecordingExecutor {
                fail_on: Some(subcommand),
                ..RecordingExecutor::new()
            }
        }
    }

    impl Executor for RecordingExecutor {
        fn execute(&self, step: &StepDescriptor) -> StepOutcome {
            self.calls.borrow_mut().push(step.clone());
            if self.fail_on == step.args.first().map(String::as_str) {
                StepOutcome::new(step, Some(1))
                    .with_stdout("On branch dist\nnothing to commit, working tree clean\n")
            } else {
                StepOutcome::new(step, Some(0)).with_stdout(format!("{} ok", step.args[0]))
            }
        }
    }

    fn ctx() -> Context {
        Context::new("release").with_verbosity(Verbosity::Silent)
    }

    fn options(pairs: &[(ConfigKey, &str)]) -> OptionMap {
        pairs
            .iter()
            .map(|(k, v)| (*k, Value::Text(v.to_string())))
            .collect()
    }

    #[test]
    fn test_commit_with_message_reports_both_steps() {
        let executor = RecordingExecutor::new();
        let options = options(&[(ConfigKey::Dir, "/repo"), (ConfigKey::Message, "release 1.2.0")]);

        let report = invoke("commit", &options, &Overrides::new(), &ctx(), &executor).unwrap();

        assert_eq!(report, "add ok\ncommit ok");
        let calls = executor.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command_line(), "git add --all");
        assert_eq!(
            calls[1].command_line(),
            "git commit --no-edit --message \"release 1.2.0\""
        );
    }

    #[test]
    fn test_tag_without_message_spawns_nothing() {
        let executor = RecordingExecutor::new();
        let options = options(&[(ConfigKey::Tag, "v1.0")]);

        let err = invoke("tag", &options, &Overrides::new(), &ctx(), &executor).unwrap_err();

        let missing = err.missing_options().unwrap();
        assert!(missing.contains(&"message".to_string()));
        assert!(missing.contains(&"dir".to_string()));
        assert!(executor.calls.borrow().is_empty());
    }

    #[test]
    fn test_unknown_phase_spawns_nothing() {
        let executor = RecordingExecutor::new();

        let err = invoke("bogus", &OptionMap::new(), &Overrides::new(), &ctx(), &executor)
            .unwrap_err();

        assert!(matches!(
            err,
            GitDistError::Execution(ExecutionError::UnknownPhase(_))
        ));
        assert!(executor.calls.borrow().is_empty());
    }

    #[test]
    fn test_failed_step_becomes_single_line_error() {
        let executor = RecordingExecutor::failing_on("commit");
        let options = options(&[(ConfigKey::Dir, "/repo")]);

        let err = invoke("commit", &options, &Overrides::new(), &ctx(), &executor).unwrap_err();

        match err {
            GitDistError::Execution(ExecutionError::StepFailed(report)) => {
                assert_eq!(report, "On branch dist - nothing to commit, working tree clean");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(executor.calls.borrow().len(), 2);
    }

    #[test]
    fn test_overrides_feed_the_phase() {
        let executor = RecordingExecutor::new();
        let options = options(&[(ConfigKey::Url, "origin"), (ConfigKey::Dir, "dist")]);
        let mut overrides = Overrides::new();
        overrides.set("git-dist.release.branch", "gh-pages");

        invoke("push", &options, &overrides, &ctx(), &executor).unwrap();

        assert_eq!(
            executor.calls.borrow()[0].command_line(),
            "git push --quiet --tags origin gh-pages"
        );
    }

    #[test]
    fn test_missing_config_entry_blocks_clone() {
        let executor = RecordingExecutor::new();
        let mut options = options(&[
            (ConfigKey::Url, "origin"),
            (ConfigKey::Branch, "dist"),
            (ConfigKey::Dir, "out"),
        ]);
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("user.email".to_string(), None);
        options.insert(ConfigKey::Config, Value::Entries(entries));

        let err = invoke("clone", &options, &Overrides::new(), &ctx(), &executor).unwrap_err();

        assert!(matches!(
            &err,
            GitDistError::Config(ConfigError::MissingOptions(keys)) if keys == &["config.user.email".to_string()]
        ));
        assert!(executor.calls.borrow().is_empty());
    }
}
