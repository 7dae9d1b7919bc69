//! Test data builders for creating pipeline descriptions

use pipeline_codegen::{NodeConfig, PipelineDescription};
use serde_json::{json, Value};

/// Builder for creating test pipelines
pub struct PipelineBuilder {
    description: PipelineDescription,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            description: PipelineDescription::new(),
        }
    }

    pub fn node(mut self, id: &str, tag: &str) -> Self {
        self.description = self.description.node(id, tag, NodeConfig::new());
        self
    }

    pub fn node_with(mut self, id: &str, tag: &str, data: Value) -> Self {
        self.description = self.description.node(id, tag, NodeConfig::from_value(data));
        self
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.description = self.description.connect(source, target);
        self
    }

    pub fn describe(mut self, line: &str) -> Self {
        self.description = self.description.describe(line);
        self
    }

    pub fn build(self) -> PipelineDescription {
        self.description
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// DataLoader → ImageAugmentation → ModelTraining
pub fn image_classifier() -> PipelineDescription {
    PipelineBuilder::new()
        .node_with("n1", "DataLoader", json!({"datasetPath": "/data/cats", "batchSize": 64}))
        .node_with("n2", "ImageAugmentation", json!({"rotation": 15, "flip": true}))
        .node_with("n3", "ModelTraining", json!({"modelType": "resnet18", "epochs": 5}))
        .connect("n1", "n2")
        .connect("n2", "n3")
        .build()
}

/// Linear chain of `len` DataLoader-rooted nodes
pub fn chain(len: usize) -> PipelineDescription {
    let mut builder = PipelineBuilder::new().node("n0", "DataLoader");
    for i in 1..len {
        builder = builder
            .node(&format!("n{}", i), "ImageAugmentation")
            .connect(&format!("n{}", i - 1), &format!("n{}", i));
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder() {
        let desc = PipelineBuilder::new()
            .node("a", "DataLoader")
            .node("b", "Foo")
            .connect("a", "b")
            .build();

        assert_eq!(desc.node_count(), 2);
        assert_eq!(desc.connections.len(), 1);
    }
}
