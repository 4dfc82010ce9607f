// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] holds the serde types for `Samplegen.toml` and the samples
//!   file.
//! - [`loader`] reads them from disk.
//! - [`validate`] turns a [`RawConfigFile`] into a checked [`ConfigFile`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_samples};
pub use model::{
    CategoryConfig, ConfigFile, ConfigSection, GeneratorSection, RawConfigFile, SampleSet,
    SetupStep,
};
