//! Directed connections between node ports.

use crate::pipeline::id::{NodeId, PortId};
use serde::{Deserialize, Serialize};

/// "target consumes source's output."
///
/// Self-loops and duplicates are representable; the sorter rejects any that
/// close a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "sourceNodeId")]
    pub source_node: NodeId,
    #[serde(rename = "sourcePortId", default)]
    pub source_port: PortId,
    #[serde(rename = "targetNodeId")]
    pub target_node: NodeId,
    #[serde(rename = "targetPortId", default)]
    pub target_port: PortId,
}

impl Connection {
    /// Connection between the default `output` and `input` ports.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::with_ports(source, "output", target, "input")
    }

    pub fn with_ports(
        source: impl Into<NodeId>,
        source_port: impl Into<String>,
        target: impl Into<NodeId>,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source_node: source.into(),
            source_port: PortId::new(source_port),
            target_node: target.into(),
            target_port: PortId::new(target_port),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_node == self.target_node
    }
}
