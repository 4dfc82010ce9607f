#![allow(dead_code)]

pub use samplegen_test_utils::builders;
pub use samplegen_test_utils::fake_runner;
pub use samplegen_test_utils::{init_tracing, with_timeout};

use std::path::Path;

/// Read a log file, panicking with its path when it is missing.
pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}
