//! Process execution on tokio.
//!
//! Children get a null stdin. Output is captured or streamed per
//! `CommandSpec`; an optional timeout kills the child.

use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::process::Child;

use crate::application::ports::{CommandRunner, CommandSpec};

/// Production `CommandRunner`.
///
/// Package installs and builds can take arbitrarily long, so there is no
/// timeout unless one is configured. When it fires, `tokio::select!` kills
/// the child explicitly instead of just dropping the wait future.
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
    quiet: bool,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            quiet: false,
        }
    }

    /// Capture output even for streamed commands.
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, cmd: &CommandSpec) -> Result<Output> {
        let shown = cmd.display();
        tracing::debug!(command = %shown, cwd = ?cmd.cwd, "spawning");

        let mut command = tokio::process::Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .envs(cmd.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }
        if cmd.inherit_stdio && !self.quiet {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {}", cmd.program))?;
        let started = Instant::now();

        let output = match self.timeout {
            Some(limit) => {
                tokio::select! {
                    result = collect(&mut child, &cmd.program) => result?,
                    () = tokio::time::sleep(limit) => {
                        if let Err(e) = child.kill().await {
                            tracing::warn!(command = %shown, error = %e, "failed to kill timed-out child");
                        }
                        anyhow::bail!("{shown} timed out after {}s", limit.as_secs())
                    }
                }
            }
            None => collect(&mut child, &cmd.program).await?,
        };

        tracing::debug!(
            command = %shown,
            status = ?output.status.code(),
            elapsed_ms = started.elapsed().as_millis(),
            "finished"
        );
        Ok(output)
    }
}

/// Wait for `child` while draining its piped stdout and stderr concurrently.
async fn collect(child: &mut Child, program: &str) -> Result<Output> {
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();
    let (status, stdout, stderr) = tokio::join!(
        child.wait(),
        async {
            let mut buf = Vec::new();
            if let Some(ref mut h) = stdout_handle {
                let _ = h.read_to_end(&mut buf).await;
            }
            buf
        },
        async {
            let mut buf = Vec::new();
            if let Some(ref mut h) = stderr_handle {
                let _ = h.read_to_end(&mut buf).await;
            }
            buf
        },
    );
    Ok(Output {
        status: status.with_context(|| format!("waiting for {program}"))?,
        stdout,
        stderr,
    })
}
