#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use samplegen::config::{
    CategoryConfig, ConfigFile, ConfigSection, GeneratorSection, RawConfigFile, SetupStep,
};
use samplegen::types::{CommandLine, LogDestination, Task};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    base_dir: PathBuf,
}

impl ConfigFileBuilder {
    pub fn new(generator: impl Into<PathBuf>) -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                generator: GeneratorSection::new(generator),
                setup: Vec::new(),
                category: BTreeMap::new(),
            },
            base_dir: PathBuf::from("."),
        }
    }

    pub fn generator_arg(mut self, arg: &str) -> Self {
        self.config.generator.args.push(arg.to_string());
        self
    }

    pub fn input_flag(mut self, flag: &str) -> Self {
        self.config.generator.input_flag = Some(flag.to_string());
        self
    }

    pub fn category(mut self, name: &str, extra_args: &[&str]) -> Self {
        self.config.category.insert(
            name.to_string(),
            CategoryConfig {
                extra_args: extra_args.iter().map(|s| s.to_string()).collect(),
                verify_inputs: true,
            },
        );
        self
    }

    pub fn unverified_category(mut self, name: &str) -> Self {
        self.config.category.insert(
            name.to_string(),
            CategoryConfig {
                extra_args: Vec::new(),
                verify_inputs: false,
            },
        );
        self
    }

    pub fn setup(mut self, cmd: &str) -> Self {
        self.config.setup.push(SetupStep {
            cmd: cmd.to_string(),
        });
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.config.jobs = Some(jobs);
        self
    }

    pub fn samples(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.samples = path.into();
        self
    }

    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.input_dir = path.into();
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.output_dir = path.into();
        self
    }

    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = path.into();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config)
            .expect("Failed to build valid config from builder")
            .with_base_dir(self.base_dir)
    }
}

/// A shell task logging to `<log_dir>/<name>.log`.
pub fn shell_task(name: &str, cmd: &str, log_dir: &Path) -> Task {
    Task::new(
        name,
        CommandLine::shell(cmd),
        LogDestination::file(log_dir.join(format!("{name}.log"))),
    )
}
