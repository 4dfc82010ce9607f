// src/catalog/mod.rs

//! Task catalog: the immutable, ordered list of tasks a batch runs.
//!
//! Built once from the validated config plus the samples file. Categories
//! are visited in name order and samples in file order; each sample becomes
//! one generator invocation whose stdout is redirected into the artifact
//! file and whose log block goes to its own log file (or stdout).

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::config::{ConfigFile, SampleSet};
use crate::errors::{Result, SamplegenError};
use crate::fs::FileSystem;
use crate::types::{CommandLine, LogDestination, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
}

impl TaskCatalog {
    /// Build one task per sample.
    ///
    /// Two samples whose file stems collide would write the same artifact and
    /// log, so that is rejected as a configuration error.
    pub fn build(cfg: &ConfigFile, samples: &SampleSet, log_to_stdout: bool) -> Result<Self> {
        let generator = cfg.generator_path();
        let input_dir = cfg.input_dir();
        let output_dir = cfg.output_dir();

        let mut seen: HashMap<String, String> = HashMap::new();
        let mut tasks = Vec::with_capacity(samples.len());

        for (category_name, category) in &cfg.category {
            for sample in samples.samples(category_name) {
                let stem = sample_stem(sample)?;
                if let Some(previous) = seen.insert(stem.clone(), sample.clone()) {
                    return Err(SamplegenError::ConfigError(format!(
                        "samples '{previous}' and '{sample}' share the file stem '{stem}'"
                    )));
                }

                let mut args = cfg.generator.args.clone();
                args.extend(category.extra_args.iter().cloned());
                if let Some(flag) = &cfg.generator.input_flag {
                    args.push(flag.clone());
                }
                args.push(input_dir.join(sample).to_string_lossy().into_owned());

                let artifact = output_dir.join(format!("{stem}{}", cfg.generator.output_suffix));
                let command = CommandLine::exec(&generator, args).with_stdout_to(artifact);

                let log = if log_to_stdout {
                    LogDestination::Stdout
                } else {
                    LogDestination::file(
                        output_dir.join(format!("{stem}{}", cfg.generator.log_suffix)),
                    )
                };

                debug!(category = %category_name, sample = %sample, cmd = %command, "catalogued task");
                tasks.push(Task::new(format!("{category_name}/{stem}"), command, log));
            }
        }

        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}

/// Check every sample of every category with `verify_inputs = true`.
///
/// Stops at the first missing file, before anything has been run.
pub fn verify_inputs(fs: &dyn FileSystem, cfg: &ConfigFile, samples: &SampleSet) -> Result<()> {
    let input_dir = cfg.input_dir();

    for (category_name, category) in &cfg.category {
        if !category.verify_inputs {
            debug!(category = %category_name, "input verification disabled");
            continue;
        }
        for sample in samples.samples(category_name) {
            let path = input_dir.join(sample);
            if !fs.exists(&path) {
                return Err(SamplegenError::MissingInput(path));
            }
        }
    }

    Ok(())
}

fn sample_stem(sample: &str) -> Result<String> {
    Path::new(sample)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SamplegenError::ConfigError(format!("sample '{sample}' has no file name"))
        })
}
