//! # Pipeline Compiler
//!
//! Turns a `PipelineDescription` into the text of a Python training script.
//!
//! ## Stages
//!
//! ```text
//! PipelineDescription
//!   │  PipelineGraph::build        dangling references → Validation
//!   ▼
//! PipelineGraph
//!   │  TopologicalSorter::sort     cycles → CyclicGraph
//!   ▼
//! execution order
//!   │  GeneratorRegistry (per node, inputs threaded through IdentifierMap)
//!   ▼
//! lines + ImportAggregator         conflicting imports → ImportConflict
//!   │  ScriptAssembler::render
//!   ▼
//! GeneratedScript
//! ```
//!
//! ## Concurrency
//!
//! A compile owns its graph, aggregator and identifier map. `PipelineCompiler`
//! holds only the read-only config and registry, so a shared compiler can
//! serve any number of compiles in parallel.
//!
//! ## Determinism
//!
//! Identical input yields byte-identical text: nodes and connections iterate
//! in declaration order, the sorter breaks ties by that order, and imports
//! render in first-request order.

pub mod assembler;
pub mod compiled_script;
pub mod error;
pub mod generators;
pub mod identifiers;
pub mod imports;
pub mod literal;
pub mod registry;
pub mod topo;

pub use assembler::{AssemblyState, ScriptAssembler};
pub use compiled_script::{CompileStats, GeneratedScript};
pub use error::{CompileError, CompileFailure, CompileResult, ErrorKind};
pub use generators::{GeneratedCode, GeneratorInput, GeneratorOptions, NodeGenerator};
pub use identifiers::{synthetic_identifier, IdentifierMap};
pub use imports::{ImportAggregator, ImportDirective};
pub use registry::GeneratorRegistry;
pub use topo::TopologicalSorter;

use crate::config::CompilerConfig;
use crate::pipeline::{NodeId, PipelineDescription, PipelineGraph};

/// Compiles pipeline descriptions into scripts
#[derive(Debug, Default)]
pub struct PipelineCompiler {
    config: CompilerConfig,
    registry: GeneratorRegistry,
}

impl PipelineCompiler {
    /// Compiler with the built-in generators
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_registry(config, GeneratorRegistry::with_builtins())
    }

    pub fn with_registry(config: CompilerConfig, registry: GeneratorRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Registry access for adding generators before compiling
    pub fn registry_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.registry
    }

    /// Compile a description into a script.
    pub fn compile(&self, description: &PipelineDescription) -> CompileResult<GeneratedScript> {
        let mut assembler = ScriptAssembler::new(&self.config, &self.registry);
        let script = assembler.assemble(description)?;

        tracing::info!(
            "Compiled pipeline{}: {} nodes, {} imports in {}us",
            description
                .pipeline_id
                .as_deref()
                .map(|id| format!(" {}", id))
                .unwrap_or_default(),
            script.stats.total_nodes,
            script.stats.import_count,
            script.stats.compile_time_us
        );

        Ok(script)
    }

    /// Check structure only: resolve connections and sort.
    ///
    /// Returns the execution order the script would use.
    pub fn validate(&self, description: &PipelineDescription) -> CompileResult<Vec<NodeId>> {
        let graph = PipelineGraph::build(description)?;
        let order = TopologicalSorter::sort(&graph)?;
        Ok(order.into_iter().map(|idx| graph.node(idx).id.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NodeConfig;

    fn chain() -> PipelineDescription {
        PipelineDescription::new()
            .node("n3", "ModelTraining", NodeConfig::new())
            .node("n1", "DataLoader", NodeConfig::new())
            .node("n2", "ImageAugmentation", NodeConfig::new())
            .connect("n1", "n2")
            .connect("n2", "n3")
    }

    #[test]
    fn test_validate_returns_order() {
        let compiler = PipelineCompiler::default();
        let order = compiler.validate(&chain()).unwrap();
        assert_eq!(order, vec![NodeId::new("n1"), NodeId::new("n2"), NodeId::new("n3")]);
    }

    #[test]
    fn test_compile_is_repeatable() {
        let compiler = PipelineCompiler::default();
        let first = compiler.compile(&chain()).unwrap();
        let second = compiler.compile(&chain()).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.order, second.order);
        assert_eq!(first.stats.total_nodes, 3);
        assert_eq!(first.stats.source_nodes, 1);
        assert_eq!(first.stats.sink_nodes, 1);
        assert_eq!(first.stats.unhandled_nodes, 0);
    }

    #[test]
    fn test_compiler_is_shareable_across_threads() {
        let compiler = PipelineCompiler::default();
        let expected = compiler.compile(&chain()).unwrap().text;
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| compiler.compile(&chain()).unwrap().text))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
