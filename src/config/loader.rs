// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile, SampleSet};
use crate::errors::{Result, SamplegenError};
use crate::fs::FileSystem;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it, and anchor relative
/// paths at the directory holding it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config.with_base_dir(config_root_dir(path.as_ref())))
}

/// Read the samples file and check it against the configured categories.
///
/// Every category named in the samples file must have a
/// `[category.<name>]` section; configured categories with no samples are
/// fine and simply contribute no tasks.
pub fn load_samples(fs: &dyn FileSystem, cfg: &ConfigFile) -> Result<SampleSet> {
    let path = cfg.samples_path();
    let contents = fs.read_to_string(&path)?;
    let samples: SampleSet = serde_json::from_str(&contents)?;

    for category in samples.categories() {
        if !cfg.category.contains_key(category) {
            return Err(SamplegenError::ConfigError(format!(
                "samples file {} lists unknown category '{}' (add a [category.{}] section)",
                path.display(),
                category,
                category
            )));
        }
    }

    Ok(samples)
}

/// Directory relative config paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "configs/Samplegen.toml"),
///   we use that directory.
/// - If it's just a bare filename, we use "." so paths stay relative to the
///   working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
