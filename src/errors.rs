// src/errors.rs

//! Crate-wide error types.
//!
//! [`ExecError`] is contained per task: it travels through the results
//! channel as a value and never aborts sibling tasks. [`SamplegenError`] is
//! everything that ends a whole run, including the batch-level
//! [`SamplegenError::BatchFailed`] raised once every task has drained.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::CapturedOutput;

/// Why a single external command did not succeed.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The process could not be started at all (missing binary, permission
    /// denied, unwritable stdout redirect). No exit status exists.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited non-zero (or was killed, reported as -1).
    #[error("command exited with status {exit_status}")]
    CommandFailed {
        exit_status: i32,
        output: CapturedOutput,
    },

    /// The process started but waiting on it failed.
    #[error("lost track of `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command succeeded but its log block could not be written.
    #[error("writing log to {destination}: {reason}")]
    LogWrite { destination: String, reason: String },
}

impl ExecError {
    /// Non-zero exit, keeping whatever the process printed.
    pub fn failed(output: CapturedOutput) -> Self {
        ExecError::CommandFailed {
            exit_status: output.exit_status,
            output,
        }
    }

    /// Child exit status, when the child ran to an exit.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            ExecError::CommandFailed { exit_status, .. } => Some(*exit_status),
            _ => None,
        }
    }

    /// Output captured before the failure, if any was collected.
    pub fn output(&self) -> Option<&CapturedOutput> {
        match self {
            ExecError::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// The failure surfaced for a batch: which task, and what went wrong.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: String,
    pub command: String,
    pub error: ExecError,
}

impl std::fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task '{}': {}", self.task, self.error)
    }
}

#[derive(Error, Debug)]
pub enum SamplegenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Setup command `{command}` failed")]
    SetupFailed {
        command: String,
        #[source]
        source: ExecError,
    },

    #[error("{failures} of {total} task(s) failed; first failure in {first}")]
    BatchFailed {
        failures: usize,
        total: usize,
        first: Box<TaskFailure>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Samples file parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SamplegenError {
    /// Process exit code for this error.
    ///
    /// A failed batch propagates the first failure's child exit status when
    /// it fits in a process exit code; everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SamplegenError::BatchFailed { first, .. } => first
                .error
                .exit_status()
                .filter(|code| (1..=255).contains(code))
                .unwrap_or(1),
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SamplegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_failed(error: ExecError) -> SamplegenError {
        SamplegenError::BatchFailed {
            failures: 1,
            total: 3,
            first: Box::new(TaskFailure {
                task: "pod".to_string(),
                command: "genpolicy pod.yaml".to_string(),
                error,
            }),
        }
    }

    #[test]
    fn batch_failure_propagates_child_exit_status() {
        let err = batch_failed(ExecError::failed(CapturedOutput {
            lines: vec![],
            exit_status: 3,
        }));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("1 of 3 task(s) failed"));
    }

    #[test]
    fn out_of_range_or_missing_status_exits_with_one() {
        let killed = batch_failed(ExecError::failed(CapturedOutput {
            lines: vec![],
            exit_status: -1,
        }));
        assert_eq!(killed.exit_code(), 1);

        let spawn = batch_failed(ExecError::Spawn {
            command: "nope".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(spawn.exit_code(), 1);
        assert_eq!(spawn_status(&spawn), None);
    }

    fn spawn_status(err: &SamplegenError) -> Option<i32> {
        match err {
            SamplegenError::BatchFailed { first, .. } => first.error.exit_status(),
            _ => None,
        }
    }
}
