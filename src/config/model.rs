// src/config/model.rs

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// jobs = 8
/// samples = "policy_samples.json"
/// input_dir = "../../agent/samples/policy/yaml"
/// output_dir = "/tmp"
///
/// [generator]
/// path = "./target/x86_64-unknown-linux-gnu/debug/genpolicy"
/// args = ["-r", "-d", "-u"]
/// input_flag = "-y"
///
/// [[setup]]
/// cmd = "LIBC=gnu BUILD_TYPE= make"
///
/// [category.default]
///
/// [category.silently_ignored]
/// extra_args = ["-s"]
/// ```
///
/// Everything except `[generator].path` and at least one category has a
/// default.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    pub generator: GeneratorSection,

    /// Commands run one after another before the batch (build step,
    /// permission fixes, ...).
    #[serde(default)]
    pub setup: Vec<SetupStep>,

    /// Sample categories from `[category.<name>]`, keyed by name.
    #[serde(default)]
    pub category: BTreeMap<String, CategoryConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see
/// [`crate::config::validate`]).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub generator: GeneratorSection,
    pub setup: Vec<SetupStep>,
    pub category: BTreeMap<String, CategoryConfig>,
    /// Directory relative paths are resolved against.
    pub base_dir: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            generator: raw.generator,
            setup: raw.setup,
            category: raw.category,
            base_dir: PathBuf::from("."),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn samples_path(&self) -> PathBuf {
        self.resolve(&self.config.samples)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.resolve(&self.config.input_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.config.output_dir)
    }

    /// Generator binary to spawn.
    ///
    /// A bare name like `genpolicy` is left alone so it is looked up on
    /// `PATH`; anything with a directory component is config-relative.
    pub fn generator_path(&self) -> PathBuf {
        let path = &self.generator.path;
        if path.components().count() > 1 {
            self.resolve(path)
        } else {
            path.clone()
        }
    }

    /// Worker count from `[config].jobs`, if set.
    pub fn jobs(&self) -> Option<NonZeroUsize> {
        self.config.jobs.and_then(NonZeroUsize::new)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Worker pool width. Defaults to the host's available parallelism.
    #[serde(default)]
    pub jobs: Option<usize>,

    /// JSON file mapping category name → sample paths.
    #[serde(default = "default_samples")]
    pub samples: PathBuf,

    /// Directory the sample paths are relative to.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Where generated artifacts and per-task logs are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write every log block to stdout instead of one file per task.
    #[serde(default)]
    pub log_to_stdout: bool,
}

fn default_samples() -> PathBuf {
    PathBuf::from("policy_samples.json")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            jobs: None,
            samples: default_samples(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            log_to_stdout: false,
        }
    }
}

/// `[generator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorSection {
    pub path: PathBuf,

    /// Arguments passed to every invocation, before the category's own.
    #[serde(default)]
    pub args: Vec<String>,

    /// Flag placed in front of the input path (e.g. `-y`). When absent the
    /// input path is passed positionally.
    #[serde(default)]
    pub input_flag: Option<String>,

    /// Appended to the sample's file stem to name the generated artifact.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Appended to the sample's file stem to name the per-task log.
    #[serde(default = "default_log_suffix")]
    pub log_suffix: String,
}

fn default_output_suffix() -> String {
    "-rego.txt".to_string()
}

fn default_log_suffix() -> String {
    "-log.txt".to_string()
}

impl GeneratorSection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            input_flag: None,
            output_suffix: default_output_suffix(),
            log_suffix: default_log_suffix(),
        }
    }
}

/// One `[[setup]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SetupStep {
    pub cmd: String,
}

/// `[category.<name>]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Extra generator arguments for this category only.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Check that every sample exists before anything runs.
    #[serde(default = "default_verify_inputs")]
    pub verify_inputs: bool,
}

fn default_verify_inputs() -> bool {
    true
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            extra_args: Vec::new(),
            verify_inputs: default_verify_inputs(),
        }
    }
}

/// Contents of the samples file: category name → sample paths relative to
/// `[config].input_dir`.
///
/// ```json
/// { "default": ["pod-one.yaml"], "silently_ignored": ["pod-ignored.yaml"] }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SampleSet(pub BTreeMap<String, Vec<String>>);

impl SampleSet {
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn samples(&self, category: &str) -> &[String] {
        self.0.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
