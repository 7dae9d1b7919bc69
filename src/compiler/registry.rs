//! Node type tag → code generator dispatch.

use super::error::CompileResult;
use super::generators::{
    DataLoaderGenerator, GeneratedCode, GeneratorInput, ImageAugmentationGenerator,
    ModelTrainingGenerator, NodeGenerator, UnhandledGenerator,
};
use crate::pipeline::node_type::NodeType;
use std::collections::HashMap;

/// One generator per tag, plus a fallback for everything else.
///
/// The registry is read-only during compilation and generators are
/// `Send + Sync`, so one registry can serve concurrent compiles.
pub struct GeneratorRegistry {
    generators: HashMap<String, Box<dyn NodeGenerator>>,
    fallback: Box<dyn NodeGenerator>,
}

impl GeneratorRegistry {
    /// Registry with only the fallback generator.
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
            fallback: Box::new(UnhandledGenerator),
        }
    }

    /// Registry with the built-in DataLoader, ImageAugmentation and
    /// ModelTraining generators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(NodeType::DataLoader.tag(), DataLoaderGenerator);
        registry.register(
            NodeType::ImageAugmentation.tag(),
            ImageAugmentationGenerator,
        );
        registry.register(NodeType::ModelTraining.tag(), ModelTrainingGenerator);
        registry
    }

    /// Register `generator` for `tag`, returning the one it replaces.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        generator: impl NodeGenerator + 'static,
    ) -> Option<Box<dyn NodeGenerator>> {
        self.generators.insert(tag.into(), Box::new(generator))
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.generators.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Generator for an exact tag, or the fallback.
    pub fn resolve(&self, tag: &str) -> &dyn NodeGenerator {
        self.generators
            .get(tag)
            .map(|g| g.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn generate(&self, input: &GeneratorInput<'_>) -> CompileResult<GeneratedCode> {
        let generator = self.resolve(input.node_type.tag());
        tracing::debug!(
            "Generating node {} with {} generator",
            input.node_id,
            generator.name()
        );
        generator.generate(input)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("tags", &self.tags())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
