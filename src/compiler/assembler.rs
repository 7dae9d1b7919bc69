//! Script assembly.
//!
//! One `ScriptAssembler` drives one compile: graph → order → per-node code →
//! merged imports → script text. It is a single pass. A node's code is
//! generated once, its identifier is recorded before any dependent runs, and
//! nothing is renamed afterwards.
//!
//! ```text
//! Initialized ──build──▶ GraphBuilt ──sort──▶ Sorted ──▶ Generating ──render──▶ Assembled
//!      │                     │                  │            │
//!      └─────────────────────┴──────────────────┴────────────┴──────▶ Failed
//! ```
//!
//! The config is checked before the graph is built, so a config that would
//! produce an unparsable script fails as `Validation`. On failure no text is
//! produced.

use super::compiled_script::{CompileStats, GeneratedScript};
use super::error::{CompileError, CompileResult};
use super::generators::GeneratorInput;
use super::identifiers::{synthetic_identifier, IdentifierMap};
use super::imports::ImportAggregator;
use super::literal;
use super::registry::GeneratorRegistry;
use super::topo::TopologicalSorter;
use crate::config::CompilerConfig;
use crate::pipeline::description::PipelineDescription;
use crate::pipeline::graph::PipelineGraph;
use crate::pipeline::id::NodeIndex;
use std::fmt;
use std::time::Instant;

/// Python line that selects the accelerator at the top of the entry routine.
pub const DEVICE_SETUP: &str = "device = torch.device('cuda' if torch.cuda.is_available() else 'cpu')";

/// Last statement of the entry routine.
pub const COMPLETION_MESSAGE: &str = "print('Pipeline execution complete.')";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyState {
    Initialized,
    GraphBuilt,
    Sorted,
    Generating,
    Assembled,
    Failed,
}

impl AssemblyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssemblyState::Assembled | AssemblyState::Failed)
    }
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyState::Initialized => "Initialized",
            AssemblyState::GraphBuilt => "GraphBuilt",
            AssemblyState::Sorted => "Sorted",
            AssemblyState::Generating => "Generating",
            AssemblyState::Assembled => "Assembled",
            AssemblyState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Body lines and imports gathered while walking the execution order.
struct Generated {
    body: Vec<String>,
    imports: ImportAggregator,
    identifiers: IdentifierMap,
    unhandled: usize,
}

pub struct ScriptAssembler<'a> {
    config: &'a CompilerConfig,
    registry: &'a GeneratorRegistry,
    state: AssemblyState,
}

impl<'a> ScriptAssembler<'a> {
    pub fn new(config: &'a CompilerConfig, registry: &'a GeneratorRegistry) -> Self {
        Self {
            config,
            registry,
            state: AssemblyState::Initialized,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    fn transition(&mut self, next: AssemblyState) {
        tracing::debug!("Assembler: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Compile `description` into a script.
    ///
    /// An assembler runs once; a second call is a `Validation` error.
    pub fn assemble(&mut self, description: &PipelineDescription) -> CompileResult<GeneratedScript> {
        if self.state != AssemblyState::Initialized {
            return Err(CompileError::Validation(format!(
                "Assembler already ran (state {})",
                self.state
            )));
        }

        let result = self.run(description);
        if let Err(ref e) = result {
            tracing::debug!("Assembly failed: {}", e);
            self.transition(AssemblyState::Failed);
        }
        result
    }

    fn run(&mut self, description: &PipelineDescription) -> CompileResult<GeneratedScript> {
        let start_time = Instant::now();

        self.config
            .validate()
            .map_err(|e| CompileError::Validation(e.to_string()))?;

        let graph = PipelineGraph::build(description)?;
        self.transition(AssemblyState::GraphBuilt);

        let order = TopologicalSorter::sort(&graph)?;
        self.transition(AssemblyState::Sorted);

        self.transition(AssemblyState::Generating);
        let generated = self.generate(&graph, &order)?;

        let text = self.render(description, &generated);
        self.transition(AssemblyState::Assembled);

        let stats = CompileStats {
            total_nodes: graph.len(),
            source_nodes: graph.source_count(),
            sink_nodes: graph.sink_count(),
            unhandled_nodes: generated.unhandled,
            import_count: generated.imports.len(),
            compile_time_us: start_time.elapsed().as_micros() as u64,
        };

        let identifiers = order
            .iter()
            .filter_map(|&idx| {
                generated
                    .identifiers
                    .get(idx)
                    .map(|ident| (graph.node(idx).id.clone(), ident.to_string()))
            })
            .collect();

        Ok(GeneratedScript {
            pipeline_id: description.pipeline_id.clone(),
            text,
            imports: generated.imports,
            order: order.iter().map(|&idx| graph.node(idx).id.clone()).collect(),
            identifiers,
            stats,
        })
    }

    fn generate(&self, graph: &PipelineGraph, order: &[NodeIndex]) -> CompileResult<Generated> {
        let options = self.config.generator_options();
        let requirements = &self.config.imports;

        let mut generated = Generated {
            body: Vec::new(),
            imports: ImportAggregator::with_directives(&requirements.defaults)?,
            identifiers: IdentifierMap::new(),
            unhandled: 0,
        };

        for &idx in order {
            let node = graph.node(idx);
            let identifier = synthetic_identifier(&node.node_type, &node.id);
            generated
                .identifiers
                .assign(idx, &node.id, identifier.clone())?;

            let inputs = graph
                .upstream(idx)
                .iter()
                .map(|&up| {
                    generated
                        .identifiers
                        .get(up)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            CompileError::Validation(format!(
                                "Node '{}' was visited before its input '{}'",
                                node.id,
                                graph.node(up).id
                            ))
                        })
                })
                .collect::<CompileResult<Vec<_>>>()?;

            let tag = node.node_type.tag();
            if !self.registry.is_registered(tag) {
                generated.unhandled += 1;
            }

            let code = self.registry.generate(&GeneratorInput {
                node_id: &node.id,
                node_type: &node.node_type,
                identifier: &identifier,
                config: &node.config,
                inputs: &inputs,
                options: &options,
            })?;

            let mut node_imports = ImportAggregator::with_directives(&code.imports)?;
            node_imports.extend(requirements.for_node_type(tag))?;
            generated.imports = generated.imports.merge(&node_imports)?;

            generated.body.extend(code.lines);
        }

        Ok(generated)
    }

    fn render(&self, description: &PipelineDescription, generated: &Generated) -> String {
        let indent = &self.config.indent;
        let mut out = String::new();

        if !description.descriptions.is_empty() {
            for entry in &description.descriptions {
                // A lone `\r` ends a line in the script too
                let entry = entry.replace("\r\n", "\n").replace('\r', "\n");
                for line in entry.lines() {
                    if line.trim().is_empty() {
                        out.push_str("#\n");
                    } else {
                        out.push_str("# ");
                        out.push_str(&literal::comment(line));
                        out.push('\n');
                    }
                }
            }
            out.push('\n');
        }

        if !generated.imports.is_empty() {
            out.push_str(&generated.imports.render());
            out.push('\n');
        }

        out.push_str(&format!("def {}():\n", self.config.entrypoint));
        if self.config.device_setup {
            out.push_str(&format!("{}{}\n\n", indent, DEVICE_SETUP));
        }
        for line in &generated.body {
            if !line.is_empty() {
                out.push_str(indent);
                out.push_str(line);
            }
            out.push('\n');
        }
        out.push_str(&format!("{}{}\n", indent, COMPLETION_MESSAGE));
        out.push_str("\n\n");
        out.push_str("if __name__ == '__main__':\n");
        out.push_str(&format!("{}{}()\n", indent, self.config.entrypoint));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::error::ErrorKind;
    use crate::compiler::imports::ImportDirective;
    use crate::config::ImportRequirements;
    use crate::pipeline::NodeConfig;

    fn assemble(config: &CompilerConfig, desc: &PipelineDescription) -> (AssemblyState, CompileResult<GeneratedScript>) {
        let registry = GeneratorRegistry::with_builtins();
        let mut assembler = ScriptAssembler::new(config, &registry);
        assert_eq!(assembler.state(), AssemblyState::Initialized);
        let result = assembler.assemble(desc);
        (assembler.state(), result)
    }

    #[test]
    fn test_empty_pipeline_renders_wrapper_only() {
        let config = CompilerConfig::default();
        let (state, result) = assemble(&config, &PipelineDescription::new());
        assert_eq!(state, AssemblyState::Assembled);
        let script = result.unwrap();
        assert_eq!(
            script.text,
            "import torch\n\
             \n\
             def main():\n    \
             device = torch.device('cuda' if torch.cuda.is_available() else 'cpu')\n\
             \n    \
             print('Pipeline execution complete.')\n\
             \n\
             \n\
             if __name__ == '__main__':\n    \
             main()\n"
        );
        assert!(script.is_empty());
    }

    #[test]
    fn test_body_is_indented_and_blank_lines_stay_empty() {
        let config = CompilerConfig {
            device_setup: false,
            ..Default::default()
        };
        let desc = PipelineDescription::new().node("x", "Foo", NodeConfig::new());
        let (_, result) = assemble(&config, &desc);
        let text = result.unwrap().text;
        assert!(text.contains("def main():\n    # Node: Foo (unhandled)\n"));
        assert!(text.contains("    foo_x = None\n\n    print('Pipeline execution complete.')"));
        assert!(!text.contains("device ="));
        assert!(!text.lines().any(|l| !l.is_empty() && l.trim().is_empty()));
    }

    #[test]
    fn test_descriptions_render_as_comment_header() {
        let config = CompilerConfig::default();
        let desc = PipelineDescription::new()
            .describe("Image classifier")
            .describe("two lines\nof notes");
        let (_, result) = assemble(&config, &desc);
        assert!(result
            .unwrap()
            .text
            .starts_with("# Image classifier\n# two lines\n# of notes\n\nimport torch\n"));
    }

    #[test]
    fn test_description_line_breaks_stay_in_comments() {
        let config = CompilerConfig::default();
        let desc = PipelineDescription::new()
            .describe("a\rb")
            .describe("c\r\nd\x0be");
        let (_, result) = assemble(&config, &desc);
        assert!(result
            .unwrap()
            .text
            .starts_with("# a\n# b\n# c\n# d\\x0be\n\nimport torch\n"));
    }

    #[test]
    fn test_invalid_config_fails_before_graph() {
        for config in [
            CompilerConfig {
                indent: String::new(),
                ..Default::default()
            },
            CompilerConfig {
                entrypoint: "2run".to_string(),
                ..Default::default()
            },
        ] {
            let (state, result) = assemble(&config, &PipelineDescription::new());
            assert_eq!(state, AssemblyState::Failed);
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
            assert!(err.to_string().starts_with("Validation error: Configuration error: "), "{}", err);
        }
    }

    #[test]
    fn test_custom_entrypoint_and_indent() {
        let config = CompilerConfig {
            indent: "\t".to_string(),
            entrypoint: "run".to_string(),
            ..Default::default()
        };
        let (_, result) = assemble(&config, &PipelineDescription::new());
        let text = result.unwrap().text;
        assert!(text.contains("def run():\n\tdevice = "));
        assert!(text.ends_with("if __name__ == '__main__':\n\trun()\n"));
    }

    #[test]
    fn test_cycle_fails_without_text() {
        let config = CompilerConfig::default();
        let desc = PipelineDescription::new()
            .node("a", "DataLoader", NodeConfig::new())
            .node("b", "ImageAugmentation", NodeConfig::new())
            .connect("a", "b")
            .connect("b", "a");
        let (state, result) = assemble(&config, &desc);
        assert_eq!(state, AssemblyState::Failed);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::CyclicGraphError);
    }

    #[test]
    fn test_dangling_connection_fails_in_graph_stage() {
        let config = CompilerConfig::default();
        let desc = PipelineDescription::new()
            .node("a", "DataLoader", NodeConfig::new())
            .connect("a", "ghost");
        let (state, result) = assemble(&config, &desc);
        assert_eq!(state, AssemblyState::Failed);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_node_type_requirements_conflict_fails() {
        let config = CompilerConfig::default().with_imports(
            ImportRequirements::default()
                .with_node_type("DataLoader", ImportDirective::aliased("torchvision.transforms", "T")),
        );
        let desc = PipelineDescription::new().node("a", "DataLoader", NodeConfig::new());
        let (state, result) = assemble(&config, &desc);
        assert_eq!(state, AssemblyState::Failed);
        assert!(matches!(
            result.unwrap_err(),
            CompileError::ImportConflict { ref module, .. } if module == "torchvision.transforms"
        ));
    }

    #[test]
    fn test_node_type_requirements_are_added() {
        let config = CompilerConfig::default();
        let desc = PipelineDescription::new().node("k", "KMeans", NodeConfig::new());
        let (_, result) = assemble(&config, &desc);
        let script = result.unwrap();
        assert!(script.text.contains("import sklearn.cluster as cluster\n"));
        assert_eq!(script.stats.unhandled_nodes, 1);
        assert_eq!(script.packages(), vec!["torch", "sklearn"]);
    }

    #[test]
    fn test_identifier_collision_fails() {
        let config = CompilerConfig::default();
        let desc = PipelineDescription::new()
            .node("a-1", "Foo", NodeConfig::new())
            .node("a_1", "Foo", NodeConfig::new());
        let (state, result) = assemble(&config, &desc);
        assert_eq!(state, AssemblyState::Failed);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_assembler_runs_once() {
        let config = CompilerConfig::default();
        let registry = GeneratorRegistry::with_builtins();
        let mut assembler = ScriptAssembler::new(&config, &registry);
        let desc = PipelineDescription::new();
        assert!(assembler.assemble(&desc).is_ok());
        assert!(assembler.assemble(&desc).is_err());
        assert_eq!(assembler.state(), AssemblyState::Assembled);
    }
}
