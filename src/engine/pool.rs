// src/engine/pool.rs

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::exec::{TaskReport, TaskRunner};
use crate::types::Task;

/// Worker count used when none is configured: the host's available
/// parallelism, or 1 if that cannot be determined.
pub fn default_width() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Fixed-width pool of long-lived workers.
///
/// Tasks are fed through a bounded channel shared by all workers; each
/// worker runs one task at a time, so at most `width` tasks are ever in
/// flight. Every task is taken off the channel exactly once.
#[derive(Debug)]
pub struct WorkerPool<R: TaskRunner> {
    runner: Arc<R>,
    width: NonZeroUsize,
}

impl<R: TaskRunner> WorkerPool<R> {
    pub fn new(runner: Arc<R>, width: NonZeroUsize) -> Self {
        Self { runner, width }
    }

    /// Start running `tasks` and return the channel their reports arrive on.
    ///
    /// The returned receiver yields one report per task in completion order
    /// and closes once every worker has exited.
    pub fn dispatch(&self, tasks: Vec<Task>) -> mpsc::UnboundedReceiver<TaskReport> {
        let (report_tx, report_rx) = mpsc::unbounded_channel::<TaskReport>();
        if tasks.is_empty() {
            return report_rx;
        }

        let workers = self.width.get().min(tasks.len());
        let (task_tx, task_rx) = mpsc::channel::<Task>(workers);
        let queue = Arc::new(Mutex::new(task_rx));

        for id in 0..workers {
            tokio::spawn(worker_loop(
                id,
                Arc::clone(&self.runner),
                Arc::clone(&queue),
                report_tx.clone(),
            ));
        }
        drop(report_tx);

        tokio::spawn(async move {
            for task in tasks {
                if task_tx.send(task).await.is_err() {
                    warn!("all workers exited before every task was queued");
                    return;
                }
            }
            debug!("every task queued; closing task channel");
        });

        report_rx
    }
}

async fn worker_loop<R: TaskRunner>(
    id: usize,
    runner: Arc<R>,
    queue: Arc<Mutex<mpsc::Receiver<Task>>>,
    reports: mpsc::UnboundedSender<TaskReport>,
) {
    debug!(worker = id, "worker started");

    loop {
        // Only the receive is done under the lock; the task itself runs
        // without holding it.
        let next = queue.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        debug!(worker = id, task = %task.name, "worker picked up task");
        let report = runner.run(task).await;

        if reports.send(report).is_err() {
            warn!(worker = id, "report channel closed; worker stopping");
            break;
        }
    }

    debug!(worker = id, "worker finished");
}
