// src/engine/aggregator.rs

use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::errors::{Result, SamplegenError, TaskFailure};
use crate::exec::TaskReport;

/// Final state of a batch, created once every report has drained.
#[derive(Debug)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failures: usize,
    /// Tasks that never produced a report (their worker died).
    pub lost: usize,
    /// First failure in collection order, not catalog order.
    pub first_failure: Option<TaskFailure>,
    pub total_elapsed: Duration,
    pub longest_task: Duration,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.lost == 0
    }

    /// Turn the outcome into the run's result.
    ///
    /// Only the first failure is surfaced; the others are in their own logs.
    pub fn into_result(self) -> Result<Duration> {
        match self.first_failure {
            Some(first) => Err(SamplegenError::BatchFailed {
                failures: self.failures + self.lost,
                total: self.total,
                first: Box::new(first),
            }),
            None if self.lost > 0 => Err(SamplegenError::Other(anyhow!(
                "{} of {} task(s) ended without reporting an outcome",
                self.lost,
                self.total
            ))),
            None => Ok(self.total_elapsed),
        }
    }
}

/// Collects exactly one report per dispatched task.
#[derive(Debug)]
pub struct ResultAggregator {
    expected: usize,
    started: Instant,
    received: usize,
    succeeded: usize,
    failures: usize,
    first_failure: Option<TaskFailure>,
    longest_task: Duration,
}

impl ResultAggregator {
    pub fn new(expected: usize, started: Instant) -> Self {
        Self {
            expected,
            started,
            received: 0,
            succeeded: 0,
            failures: 0,
            first_failure: None,
            longest_task: Duration::ZERO,
        }
    }

    /// Drain `reports` until every sender is gone, then finish.
    ///
    /// A failure never short-circuits the drain.
    pub async fn drain(mut self, mut reports: mpsc::UnboundedReceiver<TaskReport>) -> BatchOutcome {
        while let Some(report) = reports.recv().await {
            self.record(report);
        }
        self.finish()
    }

    pub fn record(&mut self, report: TaskReport) {
        self.received += 1;
        self.longest_task = self.longest_task.max(report.timing.elapsed());

        match report.result {
            Ok(_) => self.succeeded += 1,
            Err(error) => {
                self.failures += 1;
                if self.first_failure.is_none() {
                    self.first_failure = Some(TaskFailure {
                        task: report.task,
                        command: report.command,
                        error,
                    });
                } else {
                    warn!(
                        task = %report.task,
                        error = %error,
                        "additional task failure; details are in its log"
                    );
                }
            }
        }
    }

    pub fn finish(self) -> BatchOutcome {
        let lost = self.expected.saturating_sub(self.received);
        let total_elapsed = self.started.elapsed();

        if lost > 0 {
            warn!(lost, expected = self.expected, "some tasks never reported an outcome");
        }
        info!(
            total = self.expected,
            succeeded = self.succeeded,
            failed = self.failures,
            elapsed_secs = total_elapsed.as_secs_f64(),
            "batch drained"
        );

        BatchOutcome {
            total: self.expected,
            succeeded: self.succeeded,
            failures: self.failures,
            lost,
            first_failure: self.first_failure,
            total_elapsed,
            longest_task: self.longest_task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecError;
    use crate::types::{CapturedOutput, TimingRecord};

    fn report(task: &str, secs: u64, exit_status: i32) -> TaskReport {
        let started = Instant::now();
        let output = CapturedOutput {
            lines: vec![format!("{task} output")],
            exit_status,
        };
        TaskReport {
            task: task.to_string(),
            command: format!("run {task}"),
            timing: TimingRecord::new(started, started + Duration::from_secs(secs)),
            result: if exit_status == 0 {
                Ok(output)
            } else {
                Err(ExecError::failed(output))
            },
        }
    }

    #[test]
    fn all_success_reports_elapsed_time() {
        let mut agg = ResultAggregator::new(2, Instant::now());
        agg.record(report("a", 1, 0));
        agg.record(report("b", 3, 0));
        let outcome = agg.finish();

        assert!(outcome.is_success());
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.longest_task, Duration::from_secs(3));
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn first_observed_failure_is_surfaced_and_all_are_counted() {
        let mut agg = ResultAggregator::new(4, Instant::now());
        agg.record(report("a", 1, 0));
        agg.record(report("c", 1, 5));
        agg.record(report("d", 1, 6));
        agg.record(report("b", 1, 0));
        let outcome = agg.finish();

        assert!(!outcome.is_success());
        assert_eq!(outcome.failures, 2);
        assert_eq!(outcome.first_failure.as_ref().unwrap().task, "c");

        match outcome.into_result() {
            Err(SamplegenError::BatchFailed {
                failures,
                total,
                first,
            }) => {
                assert_eq!((failures, total), (2, 4));
                assert_eq!(first.error.exit_status(), Some(5));
                assert_eq!(
                    first.error.output().unwrap().lines,
                    vec!["c output".to_string()]
                );
            }
            other => panic!("expected BatchFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_reports_fail_the_batch() {
        let mut agg = ResultAggregator::new(2, Instant::now());
        agg.record(report("a", 0, 0));
        let outcome = agg.finish();

        assert_eq!(outcome.lost, 1);
        assert!(!outcome.is_success());
        assert!(matches!(
            outcome.into_result(),
            Err(SamplegenError::Other(_))
        ));
    }

    #[tokio::test]
    async fn drain_waits_for_every_sender() {
        let (tx, rx) = mpsc::unbounded_channel();
        let agg = ResultAggregator::new(3, Instant::now());

        let producer = tokio::spawn(async move {
            for (name, code) in [("x", 1), ("y", 0), ("z", 0)] {
                tokio::time::sleep(Duration::from_millis(20)).await;
                tx.send(report(name, 0, code)).unwrap();
            }
        });

        let outcome = agg.drain(rx).await;
        producer.await.unwrap();

        assert_eq!(outcome.succeeded + outcome.failures, 3);
        assert_eq!(outcome.first_failure.unwrap().task, "x");
    }
}
