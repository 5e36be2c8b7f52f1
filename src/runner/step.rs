//! Step descriptors and their outcomes

use std::fmt;
use std::path::PathBuf;

/// One subprocess invocation, fully determined by the resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    pub command: String,
    pub args: Vec<String>,
    /// Relative paths are taken from the executor's base directory; `None` means the base directory itself
    pub working_dir: Option<PathBuf>,
}

impl StepDescriptor {
    /// A `git` step
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StepDescriptor {
            command: "git".to_string(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Shell-like rendering for logs and fallback messages
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())?;
        if let Some(dir) = &self.working_dir {
            write!(f, " (in {})", dir.display())?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"') {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}

/// What happened when a step ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub command_line: String,
    /// `None` when the process could not be spawned, was killed, or timed out
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl StepOutcome {
    pub fn new(step: &StepDescriptor, exit_code: Option<i32>) -> Self {
        StepOutcome {
            command_line: step.command_line(),
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
        }
    }

    /// The collaborator could not run the step at all
    pub fn collaborator_error(step: &StepDescriptor, error: impl Into<String>) -> Self {
        StepOutcome {
            stderr: error.into(),
            ..StepOutcome::new(step, None)
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable text: stdout, else stderr, else a description of the exit
    pub fn text(&self) -> String {
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }

        if self.timed_out {
            return format!("`{}` timed out", self.command_line);
        }
        match self.exit_code {
            Some(0) => format!("`{}` completed", self.command_line),
            Some(code) => format!("`{}` exited with code {}", self.command_line, code),
            None => format!("`{}` was terminated", self.command_line),
        }
    }
}

/// Overall result of running a phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub success: bool,
    /// Outcomes of the steps that actually ran, in order
    pub outcomes: Vec<StepOutcome>,
}
