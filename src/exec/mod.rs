// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] runs one external command to completion and captures its
//!   merged stdout/stderr.
//! - [`log_block`] renders the per-task log text.
//! - [`task_runner`] times a command, writes its log block in one write and
//!   reports the outcome.
//! - [`backend`] provides the `TaskRunner` trait the worker pool dispatches
//!   through, so tests can substitute a fake runner.

pub mod backend;
pub mod command;
pub mod log_block;
pub mod task_runner;

pub use backend::TaskRunner;
pub use command::run_command;
pub use log_block::{LogBlock, SharedStdout};
pub use task_runner::{TaskReport, TimedTaskRunner};
