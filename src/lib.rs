// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod setup;
pub mod types;

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{verify_inputs, TaskCatalog};
use crate::cli::CliArgs;
use crate::config::{load_and_validate, load_samples, ConfigFile};
use crate::errors::Result;
use crate::exec::TimedTaskRunner;
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config + samples loading and input verification
/// - setup commands (sequential)
/// - the worker pool and result aggregation for the batch
pub async fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let cfg = load_and_validate(&args.config)?;
    let samples = load_samples(fs.as_ref(), &cfg)?;
    verify_inputs(fs.as_ref(), &cfg, &samples)?;

    let log_to_stdout = args.log_to_stdout || cfg.config.log_to_stdout;
    let catalog = TaskCatalog::build(&cfg, &samples, log_to_stdout)?;
    let width = resolve_width(args.jobs, &cfg);

    if args.dry_run {
        print_dry_run(&cfg, &catalog, width);
        return Ok(());
    }

    let runner = Arc::new(TimedTaskRunner::new(Arc::clone(&fs)));

    if args.skip_setup {
        info!("skipping setup commands");
    } else {
        setup::run_setup_steps(runner.as_ref(), &cfg.setup).await?;
    }

    fs.create_dir_all(&cfg.output_dir())?;

    let outcome = engine::run_batch(runner, catalog.into_tasks(), width).await;
    println!(
        "Total time taken: {} seconds",
        outcome.total_elapsed.as_secs_f64()
    );

    outcome.into_result().map(|_| ())
}

/// Worker count: `--jobs`, then `[config].jobs`, then available CPUs.
pub fn resolve_width(cli_jobs: Option<NonZeroUsize>, cfg: &ConfigFile) -> NonZeroUsize {
    cli_jobs
        .or_else(|| cfg.jobs())
        .unwrap_or_else(engine::default_width)
}

/// Simple dry-run output: print setup steps and every task.
fn print_dry_run(cfg: &ConfigFile, catalog: &TaskCatalog, width: NonZeroUsize) {
    println!("samplegen dry-run");
    println!("  jobs = {width}");
    println!("  samples = {}", cfg.samples_path().display());
    println!("  output_dir = {}", cfg.output_dir().display());
    println!();

    if !cfg.setup.is_empty() {
        println!("setup ({}):", cfg.setup.len());
        for step in &cfg.setup {
            println!("  - {}", step.cmd);
        }
        println!();
    }

    println!("tasks ({}):", catalog.len());
    for task in catalog.iter() {
        println!("  - {}", task.name);
        println!("      cmd: {}", task.command);
        println!("      log: {}", task.log);
    }

    debug!("dry-run complete (no execution)");
}
