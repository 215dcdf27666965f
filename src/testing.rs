//! Test doubles for unit tests.

use crate::process::{Invocation, ProcessOutcome, ProcessRunner};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Records invocations instead of spawning anything.
///
/// A succeeding fake can write files to simulate a toolchain producing its
/// binary.
#[derive(Debug, Default)]
pub struct FakeProcessRunner {
    calls: RefCell<Vec<Invocation>>,
    outcome: ProcessOutcome,
    spawn_fails: bool,
    creates: Vec<PathBuf>,
}

impl FakeProcessRunner {
    pub fn succeeding() -> Self {
        Self {
            outcome: ProcessOutcome {
                code: Some(0),
                stderr: String::new(),
            },
            ..Self::default()
        }
    }

    pub fn failing(code: i32, stderr: &str) -> Self {
        Self {
            outcome: ProcessOutcome {
                code: Some(code),
                stderr: stderr.to_string(),
            },
            ..Self::default()
        }
    }

    pub fn missing_program() -> Self {
        Self {
            spawn_fails: true,
            ..Self::default()
        }
    }

    /// Write a placeholder file at `path` whenever a command runs.
    pub fn creating(mut self, path: PathBuf) -> Self {
        self.creates.push(path);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for FakeProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
        self.calls.borrow_mut().push(invocation.clone());
        if self.spawn_fails {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory (os error 2)",
            ));
        }
        for path in &self.creates {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, b"\x7fELF fake binary")?;
        }
        Ok(self.outcome.clone())
    }
}
