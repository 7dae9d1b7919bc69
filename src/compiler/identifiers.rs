//! Synthetic output identifiers.
//!
//! A node's generated output is bound to `lowercase(type tag) + "_" + node id`,
//! e.g. `dataloader_n1`. Characters that cannot appear in an identifier are
//! replaced with `_`, and a leading digit gets a `_` prefix.
//!
//! The built-in generators bind working names of their own inside the entry
//! routine (`temp_model`, `upstream_dataset`, ...). A node identifier equal to
//! one of them would be overwritten by a later block, so those names are
//! refused.

use super::error::{CompileError, CompileResult};
use crate::pipeline::id::{NodeId, NodeIndex};
use crate::pipeline::node_type::NodeType;
use std::collections::HashMap;

/// Names bound by the built-in generators and the entry routine prologue.
pub const RESERVED_NAMES: &[&str] = &[
    // entry routine
    "device",
    // DataLoader
    "dataset_path",
    "batch_size",
    "shuffle",
    "base_transform",
    "temp_dataset",
    // ImageAugmentation
    "aug_transforms",
    "augmentation_transform",
    "upstream_dataset",
    // ModelTraining
    "model_type",
    "temp_model",
    "criterion",
    "learning_rate",
    "epochs",
    "optimizer_type",
    "beta1",
    "beta2",
    "momentum",
    "temp_optimizer",
    "epoch",
    "running_loss",
    "datapoint",
    "labels",
    "outputs",
    "loss",
    "avg_loss",
];

pub fn synthetic_identifier(node_type: &NodeType, node_id: &NodeId) -> String {
    let raw = format!("{}_{}", node_type.tag().to_lowercase(), node_id.as_str());
    let mut ident: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Node → identifier map, written once per node.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    by_node: HashMap<NodeIndex, String>,
    owners: HashMap<String, NodeId>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identifier` for `node`.
    ///
    /// Fails if the node already has an identifier, if another node already
    /// owns the same identifier, or if the identifier is a reserved name.
    pub fn assign(&mut self, node: NodeIndex, node_id: &NodeId, identifier: String) -> CompileResult<()> {
        if RESERVED_NAMES.contains(&identifier.as_str()) {
            return Err(CompileError::Validation(format!(
                "Node '{}' maps to identifier '{}', which generated code uses internally",
                node_id, identifier
            )));
        }
        if let Some(existing) = self.by_node.get(&node) {
            return Err(CompileError::Validation(format!(
                "Node '{}' already has identifier '{}'",
                node_id, existing
            )));
        }
        if let Some(owner) = self.owners.get(&identifier) {
            return Err(CompileError::Validation(format!(
                "Nodes '{}' and '{}' both map to identifier '{}'",
                owner, node_id, identifier
            )));
        }
        self.owners.insert(identifier.clone(), node_id.clone());
        self.by_node.insert(node, identifier);
        Ok(())
    }

    pub fn get(&self, node: NodeIndex) -> Option<&str> {
        self.by_node.get(&node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}
