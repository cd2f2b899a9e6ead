//! Fluent builder for running external commands
//!
//! Everything gantry spawns goes through [`ProcessCommand`]: graph exports
//! from other build tools and the platform opener for generated workspaces.
//! The builder captures output, enforces a timeout, and maps spawn failures
//! onto the subprocess variants of [`GantryError`].

use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::DEFAULT_PROCESS_TIMEOUT;
use crate::core::GantryError;

/// Builder for constructing and executing external commands with consistent
/// error handling.
///
/// # Features
///
/// - **Fluent API**: Chainable methods for building commands
/// - **Timeout Management**: Configurable timeouts with a sensible default
/// - **Output Capture**: Stdout and stderr are always captured
/// - **Environment Variables**: Per-command environment overrides
///
/// # Examples
///
/// ```rust,ignore
/// use gantry_cli::runner::ProcessCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let stdout = ProcessCommand::new("swift")
///     .args(["package", "describe", "--type", "json"])
///     .with_timeout(Some(std::time::Duration::from_secs(60)))
///     .with_context("describing package")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ProcessCommand {
    /// The executable to run
    program: String,

    /// Arguments to pass to the executable
    args: Vec<String>,

    /// Environment variables to set for the child process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for command completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string for log messages
    context: Option<String>,
}

impl ProcessCommand {
    /// Creates a new command builder for the given executable.
    ///
    /// The new builder starts with an empty argument list, no extra
    /// environment variables, and [`DEFAULT_PROCESS_TIMEOUT`] as the timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env_vars: Vec::new(),
            timeout_duration: Some(DEFAULT_PROCESS_TIMEOUT),
            context: None,
        }
    }

    /// Adds a single argument to the command.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to the command.
    ///
    /// This is the preferred method for adding a static argument list at
    /// once. Arguments can be provided as any iterable of string-like types.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for the child process.
    ///
    /// The child inherits the parent environment; variables set here are
    /// layered on top of it.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context for logging (e.g., the operation being performed)
    ///
    /// The context is included in debug log messages to help distinguish
    /// between concurrent subprocesses.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Execute the command and return the captured output.
    ///
    /// A non-zero exit status is *not* an error here; the status travels in
    /// the returned [`ProcessOutput`] so callers can decide how to react.
    /// Errors are reserved for the process not running at all: a missing
    /// executable maps to [`GantryError::CommandNotFound`] and an elapsed
    /// timeout to [`GantryError::CommandTimedOut`].
    pub async fn execute(self) -> Result<ProcessOutput, GantryError> {
        let start = std::time::Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref ctx) = self.context {
            tracing::debug!(
                target: "process",
                "({}) Executing command: {} {}",
                ctx,
                self.program,
                self.args.join(" ")
            );
        } else {
            tracing::debug!(
                target: "process",
                "Executing command: {} {}",
                self.program,
                self.args.join(" ")
            );
        }

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "process", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the output future on timeout must also reap the child.
        cmd.kill_on_drop(true);

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "process",
                        "Command timed out after {} seconds: {} {}",
                        duration.as_secs(),
                        self.program,
                        self.args.join(" ")
                    );
                    return Err(GantryError::CommandTimedOut {
                        command: self.program,
                        seconds: duration.as_secs(),
                    });
                }
            }
        } else {
            tracing::trace!(target: "process", "Executing command without timeout");
            output_future.await
        };

        let output = output.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                GantryError::CommandNotFound {
                    command: self.program.clone(),
                }
            } else {
                GantryError::IoError(err)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "process",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "process", "Error: {}", stderr.trim());
            }
        } else if !stdout.is_empty() {
            if let Some(ref ctx) = self.context {
                tracing::debug!(target: "process", "({}) {}", ctx, stdout.trim());
            } else {
                tracing::debug!(target: "process", "{}", stdout.trim());
            }
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "process::perf",
                "{} took {:.2}s",
                self.program,
                elapsed.as_secs_f64()
            );
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "process::perf",
                "{} took {}ms",
                self.program,
                elapsed.as_millis()
            );
        }

        Ok(ProcessOutput {
            status: output.status,
            stdout,
            stderr,
        })
    }

    /// Execute the command and fail unless it exits successfully.
    pub async fn execute_success(self) -> Result<ProcessOutput, GantryError> {
        let command = self.program.clone();
        let output = self.execute().await?;
        output.ensure_success(&command)
    }

    /// Execute the command and return only stdout as a trimmed string
    pub async fn execute_stdout(self) -> Result<String, GantryError> {
        let output = self.execute_success().await?;
        Ok(output.stdout.trim().to_string())
    }
}

/// Captured output from an external command
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit status of the command
    pub status: ExitStatus,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the command exited with a zero status code.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Converts a failed exit status into the matching subprocess error.
    ///
    /// Termination by a signal and a non-zero exit code are reported as
    /// distinct errors; both carry the captured stderr so the user sees what
    /// the tool printed before dying.
    pub fn ensure_success(self, command: &str) -> Result<Self, GantryError> {
        if self.status.success() {
            return Ok(self);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = self.status.signal() {
                return Err(GantryError::CommandSignalled {
                    command: command.to_string(),
                    signal,
                    stderr: self.stderr,
                });
            }
        }

        Err(GantryError::CommandExited {
            command: command.to_string(),
            code: self.status.code().unwrap_or(-1),
            stderr: self.stderr,
        })
    }
}
