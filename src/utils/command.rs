//! Utilities for running commands with proper error handling and timeouts

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::debug;

/// A fully composed subprocess invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables. May carry secrets, never print it.
    pub env: HashMap<String, String>,
    /// Redirect stdout into this file instead of capturing it
    pub stdout_file: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_file = Some(path.into());
        self
    }

    /// Program and arguments joined by spaces. The environment is left out on
    /// purpose since it carries secrets.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a process that was started and ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Captured stdout followed by stderr
    pub log: String,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            log,
        }
    }
}

/// Run an invocation with optional timeout
///
/// A non-zero exit is reported through [`CommandOutput::success`]; only a
/// failure to start the process (or a timeout) is an error.
pub fn run_invocation(invocation: &Invocation, timeout: Option<Duration>) -> Result<CommandOutput> {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    cmd.envs(&invocation.env);
    cmd.stdin(Stdio::null());
    cmd.stderr(Stdio::piped());

    match invocation.stdout_file {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            cmd.stdout(Stdio::from(file));
        }
        None => {
            cmd.stdout(Stdio::piped());
        }
    }

    debug!("Running command: {}", invocation.command_line());

    let output = match timeout {
        Some(timeout_duration) => wait_with_timeout(cmd, &invocation.program, timeout_duration)?,
        None => cmd
            .spawn()
            .with_context(|| format!("Failed to execute {}", invocation.program))?
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {}", invocation.program))?,
    };

    let output = CommandOutput::from(output);
    if !output.success {
        debug!(
            "Command exited with code {:?}: {}",
            output.exit_code,
            invocation.command_line()
        );
    }

    Ok(output)
}

/// Wait for the command on a private runtime, killing it when the timeout expires
fn wait_with_timeout(cmd: Command, program: &str, timeout_duration: Duration) -> Result<Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime for subprocess timeout")?;

    runtime.block_on(async {
        let mut cmd = tokio::process::Command::from(cmd);
        cmd.kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to execute {}", program))?;

        match tokio::time::timeout(timeout_duration, child.wait_with_output()).await {
            Ok(output) => output.with_context(|| format!("Failed to wait for {}", program)),
            Err(_) => Err(anyhow::anyhow!(
                "{} timed out after {:?}",
                program,
                timeout_duration
            )),
        }
    })
}
