//! Command execution
//!
//! This module spawns step processes and captures their output.

use crate::runner::{StepDescriptor, StepOutcome};
use anyhow::{anyhow, Context as _};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command as StdCommand, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Runs one step and reports what happened.
///
/// Implementations never fail: a step that cannot be spawned is reported as a
/// failed [`StepOutcome`].
pub trait Executor {
    fn execute(&self, step: &StepDescriptor) -> StepOutcome;
}

/// Spawns real processes
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    /// Directory that step working directories are relative to
    pub base_dir: PathBuf,
    /// Kill a step that runs longer than this; `None` waits forever
    pub timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new(base_dir: PathBuf) -> Self {
        ProcessExecutor {
            base_dir,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn working_dir(&self, step: &StepDescriptor) -> PathBuf {
        match &step.working_dir {
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.clone(),
        }
    }

    fn run(&self, step: &StepDescriptor) -> anyhow::Result<StepOutcome> {
        let working_dir = self.working_dir(step);

        let mut command = StdCommand::new(&step.command);
        command
            .args(&step.args)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Timed steps lead their own process group; see `kill_step`
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.timeout.is_some() {
                command.process_group(0);
            }
        }

        debug!(command = %step.command_line(), dir = %working_dir.display(), "spawning step");
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn `{}` in {}", step.command, working_dir.display()))?;

        let stdout = child.stdout.take().ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child.stderr.take().ok_or_else(|| anyhow!("stderr was not piped"))?;
        let stdout_handle = thread::spawn(move || read_stream(stdout));
        let stderr_handle = thread::spawn(move || read_stream(stderr));

        let mut timed_out = false;
        let status: ExitStatus = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout).context("wait for step")? {
                Some(status) => status,
                None => {
                    warn!(command = %step.command_line(), timeout_secs = timeout.as_secs(), "step timed out, killing");
                    timed_out = true;
                    kill_step(&mut child).context("kill step")?;
                    child.wait().context("wait for step after kill")?
                }
            },
            None => child.wait().context("wait for step")?,
        };

        let stdout = join_output(stdout_handle).context("read stdout")?;
        let stderr = join_output(stderr_handle).context("read stderr")?;

        let exit_code = if timed_out { None } else { status.code() };
        debug!(exit_code = ?exit_code, timed_out, "step finished");

        Ok(StepOutcome {
            timed_out,
            ..StepOutcome::new(step, exit_code)
                .with_stdout(stdout)
                .with_stderr(stderr)
        })
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, step: &StepDescriptor) -> StepOutcome {
        self.run(step).unwrap_or_else(|err| {
            warn!(command = %step.command_line(), error = %err, "step could not be run");
            StepOutcome::collaborator_error(step, format!("{:#}", err))
        })
    }
}

/// Kill the step's whole process group, including helpers git started
#[cfg(unix)]
fn kill_step(child: &mut Child) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    let result = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if result == -1 {
        let err = io::Error::last_os_error();
        // ESRCH: the group is already gone
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn kill_step(child: &mut Child) -> io::Result<()> {
    child.kill()
}

fn read_stream<R: Read>(mut reader: R) -> io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn join_output(handle: thread::JoinHandle<io::Result<String>>) -> anyhow::Result<String> {
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}
