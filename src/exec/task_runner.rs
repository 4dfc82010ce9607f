// src/exec/task_runner.rs

//! Timed task runner: runs one task's command, writes its log block, then
//! reports the outcome.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::errors::ExecError;
use crate::exec::command::run_command;
use crate::exec::log_block::{LogBlock, SharedStdout};
use crate::fs::FileSystem;
use crate::types::{CapturedOutput, Task, TimingRecord};

/// Outcome of one task, as sent from a worker to the aggregator.
#[derive(Debug)]
pub struct TaskReport {
    pub task: String,
    pub command: String,
    pub timing: TimingRecord,
    pub result: Result<CapturedOutput, ExecError>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Production runner: spawns the real process and writes the log block
/// through a [`FileSystem`], or to the shared stdout writer.
#[derive(Debug, Clone)]
pub struct TimedTaskRunner {
    fs: Arc<dyn FileSystem>,
    stdout: SharedStdout,
}

impl TimedTaskRunner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            stdout: SharedStdout::stdout(),
        }
    }

    /// Send [`LogDestination::Stdout`](crate::types::LogDestination::Stdout)
    /// blocks to `stdout` instead of the process's stdout.
    pub fn with_stdout(mut self, stdout: SharedStdout) -> Self {
        self.stdout = stdout;
        self
    }

    /// Run `task` to completion.
    ///
    /// The log block is always written before this returns, on the failure
    /// path too. If the command succeeded but the log could not be written,
    /// the report carries [`ExecError::LogWrite`]; if the command itself
    /// failed, that failure wins and the write error is only logged.
    pub async fn run_task(&self, task: Task) -> TaskReport {
        info!(task = %task.name, cmd = %task.command, "starting task");

        let started = Instant::now();
        let mut result = run_command(&task.command).await;
        let timing = TimingRecord::new(started, Instant::now());

        let block = LogBlock::new(&task.command, &result, timing.elapsed());
        if let Err(e) = block.write_to(&task.log, self.fs.as_ref(), &self.stdout) {
            let reason = format!("{e:#}");
            error!(
                task = %task.name,
                destination = %task.log,
                error = %reason,
                "failed to write log block"
            );
            if result.is_ok() {
                result = Err(ExecError::LogWrite {
                    destination: task.log.to_string(),
                    reason,
                });
            }
        }

        match &result {
            Ok(_) => info!(
                task = %task.name,
                elapsed_secs = timing.elapsed_secs(),
                "task finished"
            ),
            Err(err) => warn!(
                task = %task.name,
                elapsed_secs = timing.elapsed_secs(),
                error = %err,
                log = %task.log,
                "task failed"
            ),
        }

        TaskReport {
            task: task.name,
            command: task.command.to_string(),
            timing,
            result,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::types::{CommandLine, LogDestination};

    fn runner(fs: &MockFileSystem) -> TimedTaskRunner {
        TimedTaskRunner::new(Arc::new(fs.clone()))
    }

    /// Accepts a few bytes per call and yields in between, so unguarded
    /// writers would interleave.
    #[derive(Clone, Default)]
    struct TrickleWriter(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for TrickleWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(7);
            self.0.lock().unwrap().extend_from_slice(&buf[..n]);
            std::thread::yield_now();
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn successful_task_writes_block_and_reports_success() {
        let fs = MockFileSystem::new();
        let task = Task::new(
            "ok",
            CommandLine::shell("echo hello"),
            LogDestination::file("/logs/ok.txt"),
        );

        let report = runner(&fs).run_task(task).await;

        assert!(report.is_success());
        let log = fs.contents("/logs/ok.txt").unwrap();
        assert!(log.starts_with("========== COMMAND: echo hello\nhello\n"));
        assert!(log.trim_end().ends_with("seconds"));
        assert!(!log.contains("+++++"));
    }

    #[tokio::test]
    async fn failing_task_is_logged_before_being_reported() {
        let fs = MockFileSystem::new();
        let task = Task::new(
            "bad",
            CommandLine::shell("echo oops >&2; exit 7"),
            LogDestination::file("/logs/bad.txt"),
        );

        let report = runner(&fs).run_task(task).await;

        assert_eq!(report.result.as_ref().unwrap_err().exit_status(), Some(7));
        assert_eq!(fs.write_count("/logs/bad.txt"), 1);
        let log = fs.contents("/logs/bad.txt").unwrap();
        assert!(log.contains("oops\n+++++ Failed with exit code 7\nTime taken: "));
    }

    #[tokio::test]
    async fn unwritable_log_turns_success_into_failure() {
        let fs = MockFileSystem::new();
        fs.deny_writes("/logs/locked.txt");
        let task = Task::new(
            "locked",
            CommandLine::shell("true"),
            LogDestination::file("/logs/locked.txt"),
        );

        let report = runner(&fs).run_task(task).await;

        assert!(matches!(
            report.result,
            Err(ExecError::LogWrite { .. })
        ));
    }

    #[tokio::test]
    async fn command_failure_wins_over_log_write_failure() {
        let fs = MockFileSystem::new();
        fs.deny_writes("/logs/both.txt");
        let task = Task::new(
            "both",
            CommandLine::shell("exit 3"),
            LogDestination::file("/logs/both.txt"),
        );

        let report = runner(&fs).run_task(task).await;

        assert_eq!(report.result.unwrap_err().exit_status(), Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stdout_blocks_stay_contiguous() {
        let sink = TrickleWriter::default();
        let runner = runner(&MockFileSystem::new()).with_stdout(SharedStdout::new(sink.clone()));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let runner = runner.clone();
                let cmd = format!(
                    "i=1; while [ $i -le 20 ]; do echo task-{n}-$i; i=$((i+1)); done"
                );
                tokio::spawn(async move {
                    runner
                        .run_task(Task::new(
                            format!("t{n}"),
                            CommandLine::shell(cmd),
                            LogDestination::Stdout,
                        ))
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_success());
        }

        let bytes = sink.0.lock().unwrap().clone();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8 * 22);

        for block in lines.chunks(22) {
            assert!(block[0].starts_with("========== COMMAND: "), "{block:?}");
            assert!(block[21].starts_with("Time taken: "), "{block:?}");
            let prefix = block[1].rsplit_once('-').unwrap().0;
            for (i, line) in block[1..21].iter().enumerate() {
                assert_eq!(*line, format!("{prefix}-{}", i + 1));
            }
        }
    }
}
