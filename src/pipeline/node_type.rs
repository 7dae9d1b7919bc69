//! Node type tags.
//!
//! The editor labels each node with a free-form type string. The compiler
//! knows a fixed set of tags; anything else is kept verbatim as `Unknown` so
//! it can still be given a placeholder in the generated script.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Type tag of a pipeline node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Loads an image dataset and wraps it in a batching loader.
    DataLoader,
    /// Re-wraps an upstream loader with augmentation transforms.
    ImageAugmentation,
    /// Builds a model and trains it over an upstream loader.
    ModelTraining,
    /// Any tag without a registered generator.
    Unknown(String),
}

impl NodeType {
    /// Parse a tag. Matching is exact; unrecognised tags become `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "DataLoader" => NodeType::DataLoader,
            "ImageAugmentation" => NodeType::ImageAugmentation,
            "ModelTraining" => NodeType::ModelTraining,
            other => NodeType::Unknown(other.to_string()),
        }
    }

    /// The tag as it appears in pipeline descriptions.
    pub fn tag(&self) -> &str {
        match self {
            NodeType::DataLoader => "DataLoader",
            NodeType::ImageAugmentation => "ImageAugmentation",
            NodeType::ModelTraining => "ModelTraining",
            NodeType::Unknown(tag) => tag,
        }
    }

    /// Get the display name for this node type.
    pub fn display_name(&self) -> &str {
        match self {
            NodeType::DataLoader => "Data Loader",
            NodeType::ImageAugmentation => "Image Augmentation",
            NodeType::ModelTraining => "Model Training",
            NodeType::Unknown(tag) => tag,
        }
    }

    /// Get all node types that have a built-in generator.
    pub fn all() -> &'static [NodeType] {
        &[
            NodeType::DataLoader,
            NodeType::ImageAugmentation,
            NodeType::ModelTraining,
        ]
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NodeType::Unknown(_))
    }

    /// Check if this node type is expected to start a pipeline.
    pub fn is_source(&self) -> bool {
        matches!(self, NodeType::DataLoader)
    }

    /// Get a detailed description of what this node does.
    pub fn description(&self) -> &'static str {
        match self {
            NodeType::DataLoader =>
                "Loads an image folder dataset.\n\
                 Resizes to 224x224 and converts to tensors.\n\
                 Configure datasetPath, batchSize and shuffle.",

            NodeType::ImageAugmentation =>
                "Applies random augmentations to an upstream loader.\n\
                 Rotation, horizontal flip, brightness and crop.\n\
                 Keeps the upstream batch size and shuffle setting.",

            NodeType::ModelTraining =>
                "Trains a torchvision model on an upstream loader.\n\
                 Choose modelType, epochs and learningRate.\n\
                 Optimizer is configured through optimizerConfig.",

            NodeType::Unknown(_) =>
                "No code generator is registered for this type.\n\
                 A placeholder assignment is emitted instead.",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(NodeType::from_tag(&tag))
    }
}
