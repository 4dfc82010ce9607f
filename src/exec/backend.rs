// src/exec/backend.rs

//! Pluggable runner abstraction.
//!
//! The worker pool talks to a `TaskRunner` instead of spawning processes
//! itself. Production code uses [`TimedTaskRunner`]; tests can provide a
//! runner that, for example, records concurrency and fabricates reports
//! without starting any process.

use std::future::Future;
use std::pin::Pin;

use crate::exec::task_runner::{TaskReport, TimedTaskRunner};
use crate::types::Task;

/// Trait abstracting how a single task is executed.
///
/// Implementations must always produce a report: failures are values in
/// [`TaskReport::result`], never panics.
pub trait TaskRunner: Send + Sync + 'static {
    fn run(&self, task: Task) -> Pin<Box<dyn Future<Output = TaskReport> + Send + '_>>;
}

impl TaskRunner for TimedTaskRunner {
    fn run(&self, task: Task) -> Pin<Box<dyn Future<Output = TaskReport> + Send + '_>> {
        Box::pin(self.run_task(task))
    }
}
