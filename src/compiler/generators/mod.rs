//! # Per-type Code Generators
//!
//! Each supported node type has one generator: a pure function from the
//! node's configuration and its resolved upstream identifiers to the lines of
//! script it contributes and the imports those lines need.
//!
//! ## Generator contract
//!
//! - Lines are written relative to the entry routine body; the assembler adds
//!   the outer indentation. Nested blocks use the configured indent unit
//!   through `CodeWriter`.
//! - The last statement of a block binds `input.identifier`, which is how
//!   dependents reach the node's output.
//! - Missing or mistyped options fall back to documented defaults.
//! - Generators hold no state between calls.
//!
//! ```text
//! GeneratorInput { identifier: "imageaugmentation_n2", inputs: ["dataloader_n1"], .. }
//!        │
//!        ▼
//! GeneratedCode { lines: ["# Node: ImageAugmentation ...", ...], imports: [transforms, DataLoader] }
//! ```

pub mod data_loader;
pub mod image_augmentation;
pub mod model_training;
pub mod unhandled;

pub use data_loader::DataLoaderGenerator;
pub use image_augmentation::ImageAugmentationGenerator;
pub use model_training::ModelTrainingGenerator;
pub use unhandled::UnhandledGenerator;

use super::error::CompileResult;
use super::imports::ImportDirective;
use crate::pipeline::id::NodeId;
use crate::pipeline::node::NodeConfig;
use crate::pipeline::node_type::NodeType;

/// Placeholder used when a node that expects an upstream input has none.
pub const MISSING_INPUT: &str = "None";

/// Settings shared by every generator in one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Indentation unit for nested blocks.
    pub indent: String,
    /// Reject unknown model/optimizer names instead of deferring the failure
    /// to the generated script.
    pub strict_models: bool,
    /// The entry routine binds `device` before the first node runs.
    pub device_setup: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            strict_models: false,
            device_setup: true,
        }
    }
}

/// Everything a generator may look at for one node.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorInput<'a> {
    pub node_id: &'a NodeId,
    pub node_type: &'a NodeType,
    /// Synthetic identifier the block must assign.
    pub identifier: &'a str,
    pub config: &'a NodeConfig,
    /// Upstream identifiers, in connection declaration order.
    pub inputs: &'a [String],
    pub options: &'a GeneratorOptions,
}

impl GeneratorInput<'_> {
    /// First upstream identifier, or the `None` placeholder.
    pub fn primary_input(&self) -> &str {
        self.inputs.first().map(String::as_str).unwrap_or(MISSING_INPUT)
    }

    pub fn writer(&self) -> CodeWriter {
        CodeWriter::new(&self.options.indent)
    }
}

/// Output of one generator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    pub lines: Vec<String>,
    pub imports: Vec<ImportDirective>,
}

impl GeneratedCode {
    pub fn new(lines: Vec<String>, imports: Vec<ImportDirective>) -> Self {
        Self { lines, imports }
    }
}

/// A code generator for one node type.
pub trait NodeGenerator: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    fn generate(&self, input: &GeneratorInput<'_>) -> CompileResult<GeneratedCode>;
}

/// Line buffer with block indentation.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    unit: String,
    level: usize,
    lines: Vec<String>,
}

impl CodeWriter {
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            level: 0,
            lines: Vec::new(),
        }
    }

    /// Append a line at the current indentation level.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.unit.repeat(self.level), text));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Write `header`, then the lines produced by `body` one level deeper.
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(header);
        self.level += 1;
        body(self);
        self.level -= 1;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn finish(self) -> Vec<String> {
        self.lines
    }
}
