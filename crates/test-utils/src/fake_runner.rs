use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use samplegen::errors::ExecError;
use samplegen::exec::{TaskReport, TaskRunner};
use samplegen::types::{CapturedOutput, Task, TimingRecord};

/// A fake runner that:
/// - sleeps for a fixed delay instead of spawning a process
/// - tracks how many tasks are in flight at once
/// - fails (exit 1) every task whose name is in `failing`.
pub struct FakeRunner {
    delay: Duration,
    failing: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing: HashSet::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn failing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(names.into_iter().map(Into::into));
        self
    }

    /// Highest number of tasks observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Names of every task started, in start order.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

impl TaskRunner for FakeRunner {
    fn run(&self, task: Task) -> Pin<Box<dyn Future<Output = TaskReport> + Send + '_>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.started.lock().unwrap().push(task.name.clone());

            let started = Instant::now();
            tokio::time::sleep(self.delay).await;
            let timing = TimingRecord::new(started, Instant::now());

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let output = CapturedOutput {
                lines: vec![format!("ran {}", task.name)],
                exit_status: if self.failing.contains(&task.name) { 1 } else { 0 },
            };
            let result = if output.exit_status == 0 {
                Ok(output)
            } else {
                Err(ExecError::failed(output))
            };

            TaskReport {
                task: task.name,
                command: task.command.to_string(),
                timing,
                result,
            }
        })
    }
}
