//! External process invocation.
//!
//! Toolchains and user scripts are spawned through [`ProcessRunner`] so the
//! dispatch logic can be exercised without real compilers.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Where a child's standard error goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StderrMode {
    /// Echoed line by line to our stderr and captured for error reporting.
    #[default]
    Tee,
    /// Handed straight to the child; nothing is captured.
    Inherit,
}

/// A program, its argument vector and an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub stderr: StderrMode,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
            stderr: StderrMode::Tee,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Give the child our stderr directly, e.g. for interactive scripts.
    #[must_use]
    pub fn inherit_stderr(mut self) -> Self {
        self.stderr = StderrMode::Inherit;
        self
    }

    /// Program name as a lossy string, for messages.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and captured standard error of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Empty for [`StderrMode::Inherit`].
    pub stderr: String,
}

impl ProcessOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    #[must_use]
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }

    /// Exit status followed by the captured stderr, if any.
    #[must_use]
    pub fn describe_failure(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.status_text()
        } else {
            format!("{}: {stderr}", self.status_text())
        }
    }
}

/// Capability to run an external command to completion.
pub trait ProcessRunner {
    /// Run the invocation, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the program could not be started.
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutcome>;
}

/// Copy `reader` to `sink` line by line, returning everything read.
///
/// Lines are forwarded as raw bytes; the returned copy is lossy UTF-8 since
/// compiler diagnostics are not guaranteed to be UTF-8.
fn tee_lines<R: BufRead, W: Write>(mut reader: R, sink: &mut W) -> io::Result<String> {
    let mut captured = String::new();
    let mut buf = Vec::new();
    while reader.read_until(b'\n', &mut buf)? > 0 {
        sink.write_all(&buf)?;
        captured.push_str(&String::from_utf8_lossy(&buf));
        buf.clear();
    }
    Ok(captured)
}

/// Runs commands on the host, streaming output through to the terminal.
///
/// Standard input and output are always inherited. Standard error follows the
/// invocation's [`StderrMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
        log::debug!("Running: {invocation}");

        let stderr = match invocation.stderr {
            StderrMode::Tee => Stdio::piped(),
            StderrMode::Inherit => Stdio::inherit(),
        };
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(stderr);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;

        // The pipe is closed when `tee_lines` returns, so the child cannot
        // block on a full pipe while we wait for it.
        let teed = match child.stderr.take() {
            Some(pipe) => tee_lines(BufReader::new(pipe), &mut io::stderr()),
            None => Ok(String::new()),
        };

        let status = child.wait()?;
        log::debug!("{} exited with {status}", invocation.program_name());

        Ok(ProcessOutcome {
            code: status.code(),
            stderr: teed?,
        })
    }
}
