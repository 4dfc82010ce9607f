// src/exec/log_block.rs

//! Rendering and writing of the per-task log block.
//!
//! A block is assembled in a buffer owned by the task that produced it and
//! handed to the destination in one write, so blocks of concurrent tasks
//! never interleave.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::errors::ExecError;
use crate::fs::FileSystem;
use crate::types::{CapturedOutput, CommandLine, LogDestination};

pub const HEADER_PREFIX: &str = "========== COMMAND: ";
pub const FAILURE_PREFIX: &str = "+++++ ";

/// Writer behind [`LogDestination::Stdout`], shared by every task that logs
/// there. Each block is written while holding its lock.
#[derive(Clone)]
pub struct SharedStdout(Arc<Mutex<Box<dyn Write + Send>>>);

impl SharedStdout {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    /// The process's own stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    fn write_block(&self, text: &str) -> Result<()> {
        let mut out = self
            .0
            .lock()
            .map_err(|_| anyhow!("stdout writer lock poisoned"))?;
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .context("writing log block to stdout")
    }
}

impl Default for SharedStdout {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for SharedStdout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedStdout")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBlock {
    pub header: String,
    pub body: Vec<String>,
    pub failure: Option<String>,
    pub footer: String,
}

impl LogBlock {
    pub fn new(
        command: &CommandLine,
        result: &Result<CapturedOutput, ExecError>,
        elapsed: Duration,
    ) -> Self {
        let (body, failure) = match result {
            Ok(output) => (output.lines.clone(), None),
            Err(err) => (
                err.output().map(|o| o.lines.clone()).unwrap_or_default(),
                Some(failure_line(err)),
            ),
        };

        Self {
            header: header_line(command),
            body,
            failure,
            footer: time_taken_line(elapsed),
        }
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.body.len() + 3);
        lines.push(self.header.as_str());
        lines.extend(self.body.iter().map(String::as_str));
        if let Some(failure) = &self.failure {
            lines.push(failure);
        }
        lines.push(&self.footer);

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Write the rendered block to `dest` with a single write.
    pub fn write_to(
        &self,
        dest: &LogDestination,
        fs: &dyn FileSystem,
        stdout: &SharedStdout,
    ) -> Result<()> {
        let text = self.render();
        match dest {
            LogDestination::File(path) => fs.write(path, text.as_bytes()),
            LogDestination::Stdout => stdout.write_block(&text),
        }
    }
}

pub fn header_line(command: &CommandLine) -> String {
    format!("{HEADER_PREFIX}{command}")
}

pub fn time_taken_line(elapsed: Duration) -> String {
    format!("Time taken: {:.2} seconds", elapsed.as_secs_f64())
}

fn failure_line(err: &ExecError) -> String {
    match err {
        ExecError::CommandFailed { exit_status, .. } => {
            format!("{FAILURE_PREFIX}Failed with exit code {exit_status}")
        }
        ExecError::Spawn { source, .. } => format!("{FAILURE_PREFIX}Failed to start: {source}"),
        other => format!("{FAILURE_PREFIX}Failed: {other}"),
    }
}
