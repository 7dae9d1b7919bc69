//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use pipeline_codegen::PipelineDescription;
use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a pipeline description fixture
pub fn load_fixture(name: &str) -> PipelineDescription {
    let content = std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e));
    PipelineDescription::from_json(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

/// Line number (0-based) of the first line equal to `needle` after trimming
pub fn line_index(text: &str, needle: &str) -> usize {
    text.lines()
        .position(|l| l.trim() == needle)
        .unwrap_or_else(|| panic!("Line {:?} not found in script:\n{}", needle, text))
}

/// Assert that `text` contains `needle` exactly once
pub fn assert_contains_once(text: &str, needle: &str) {
    let count = text.matches(needle).count();
    assert_eq!(
        count, 1,
        "Expected {:?} exactly once, found {} times in:\n{}",
        needle, count, text
    );
}
