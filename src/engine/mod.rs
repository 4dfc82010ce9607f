// src/engine/mod.rs

//! Batch engine.
//!
//! - [`pool`] is the fixed-width worker pool that pulls tasks from a bounded
//!   channel and pushes one report per task into an unbounded results
//!   channel.
//! - [`aggregator`] drains every report, keeps the first failure and times
//!   the whole batch.
//!
//! There is no cancellation anywhere in here: once dispatched, every task
//! runs to completion regardless of what its siblings do.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::exec::TaskRunner;
use crate::types::Task;

pub mod aggregator;
pub mod pool;

pub use aggregator::{BatchOutcome, ResultAggregator};
pub use pool::{default_width, WorkerPool};

/// Run every task with at most `width` in flight and wait for all of them.
///
/// The elapsed time covers everything from just before dispatch until the
/// last report has been drained.
pub async fn run_batch<R: TaskRunner>(
    runner: Arc<R>,
    tasks: Vec<Task>,
    width: NonZeroUsize,
) -> BatchOutcome {
    let started = Instant::now();
    let total = tasks.len();
    info!(tasks = total, width = width.get(), "dispatching batch");

    let pool = WorkerPool::new(runner, width);
    let reports = pool.dispatch(tasks);

    ResultAggregator::new(total, started).drain(reports).await
}
