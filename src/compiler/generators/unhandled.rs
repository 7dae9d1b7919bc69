//! Fallback for node types without a registered generator.
//!
//! Emits a comment and binds the node's identifier to `None`, so dependents
//! still reference a defined name and the rest of the pipeline compiles.

use super::{GeneratedCode, GeneratorInput, NodeGenerator};
use crate::compiler::error::CompileResult;
use crate::compiler::literal;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnhandledGenerator;

impl NodeGenerator for UnhandledGenerator {
    fn name(&self) -> &str {
        "Unhandled"
    }

    fn generate(&self, input: &GeneratorInput<'_>) -> CompileResult<GeneratedCode> {
        tracing::warn!(
            "No generator for node type '{}' (node {}), emitting placeholder",
            input.node_type,
            input.node_id
        );

        let mut w = input.writer();
        w.line(format!(
            "# Node: {} (unhandled)",
            literal::comment(input.node_type.tag())
        ));
        w.line("# No code generator is registered for this node type.");
        w.line(format!("{} = None", input.identifier));
        w.blank();

        Ok(GeneratedCode::new(w.finish(), Vec::new()))
    }
}
