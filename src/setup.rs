// src/setup.rs

//! Sequential setup commands run before the batch (build step, socket
//! permissions, ...).
//!
//! Each step goes through the same runner as batch tasks and logs its block
//! to stdout. The first failing step aborts the run; no batch task is
//! dispatched after that.

use tracing::info;

use crate::config::SetupStep;
use crate::errors::{Result, SamplegenError};
use crate::exec::TaskRunner;
use crate::types::{CommandLine, LogDestination, Task};

pub async fn run_setup_steps<R: TaskRunner>(runner: &R, steps: &[SetupStep]) -> Result<()> {
    for (idx, step) in steps.iter().enumerate() {
        info!(step = idx + 1, cmd = %step.cmd, "running setup command");

        let task = Task::new(
            format!("setup-{}", idx + 1),
            CommandLine::shell(step.cmd.as_str()),
            LogDestination::Stdout,
        );
        let report = runner.run(task).await;

        if let Err(source) = report.result {
            return Err(SamplegenError::SetupFailed {
                command: step.cmd.clone(),
                source,
            });
        }
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exec::TimedTaskRunner;
    use crate::fs::mock::MockFileSystem;
    use std::sync::Arc;

    fn step(cmd: &str) -> SetupStep {
        SetupStep {
            cmd: cmd.to_string(),
        }
    }

    #[tokio::test]
    async fn steps_run_in_order_and_stop_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let runner = TimedTaskRunner::new(Arc::new(MockFileSystem::new()));

        let steps = vec![
            step("true"),
            step("exit 9"),
            step(&format!("touch {}", marker.display())),
        ];

        let err = run_setup_steps(&runner, &steps).await.unwrap_err();

        match err {
            SamplegenError::SetupFailed { command, source } => {
                assert_eq!(command, "exit 9");
                assert_eq!(source.exit_status(), Some(9));
            }
            other => panic!("expected SetupFailed, got {other:?}"),
        }
        assert!(!marker.exists(), "steps after a failure must not run");
    }
}
