//! Pipeline description as submitted by the editor.
//!
//! The JSON document carries two keyed containers: `nodes` (node id → node
//! record) and `connections` (connection id → connection record). Both are
//! decoded into `IndexMap`s so the document's declaration order is the
//! iteration order everywhere downstream.
//!
//! ```json
//! {
//!   "pipelineId": "training-run-123",
//!   "nodes": {
//!     "n1": { "type": "DataLoader", "data": { "datasetPath": "/d" } },
//!     "n2": { "type": "ModelTraining", "data": { "epochs": 3 } }
//!   },
//!   "connections": {
//!     "c1": { "sourceNodeId": "n1", "sourcePortId": "output",
//!             "targetNodeId": "n2", "targetPortId": "input" }
//!   }
//! }
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::pipeline::connection::Connection;
use crate::pipeline::id::{ConnectionId, NodeId};
use crate::pipeline::node::{Node, NodeConfig};
use crate::pipeline::node_type::NodeType;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

/// One node entry of the `nodes` container. Editor-only fields such as
/// `position` and `title` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, deserialize_with = "deserialize_config")]
    pub data: NodeConfig,
}

fn deserialize_config<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NodeConfig, D::Error> {
    Value::deserialize(deserializer).map(NodeConfig::from_value)
}

/// Complete input of one compile request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,

    #[serde(default)]
    pub nodes: IndexMap<NodeId, NodeRecord>,

    #[serde(default)]
    pub connections: IndexMap<ConnectionId, Connection>,

    /// Free-text lines rendered as a comment header.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<String>,
}

impl PipelineDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the editor's JSON payload.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read and decode a description file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(Error::from)
            .with_context(|| format!("Failed to read pipeline description {}", path.display()))?;
        Self::from_json(&content)
            .map_err(Error::from)
            .with_context(|| format!("Failed to parse pipeline description {}", path.display()))
    }

    pub fn with_pipeline_id(mut self, id: impl Into<String>) -> Self {
        self.pipeline_id = Some(id.into());
        self
    }

    pub fn describe(mut self, line: impl Into<String>) -> Self {
        self.descriptions.push(line.into());
        self
    }

    /// Add (or replace) a node.
    pub fn node(mut self, id: impl Into<NodeId>, tag: &str, data: NodeConfig) -> Self {
        self.nodes.insert(
            id.into(),
            NodeRecord {
                node_type: NodeType::from_tag(tag),
                data,
            },
        );
        self
    }

    /// Add a connection under a generated `conn<N>` key.
    pub fn connect(self, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let key = format!("conn{}", self.connections.len() + 1);
        self.connection(key, Connection::new(source, target))
    }

    /// Add (or replace) a connection under an explicit key.
    pub fn connection(mut self, id: impl Into<String>, connection: Connection) -> Self {
        self.connections.insert(ConnectionId::new(id), connection);
        self
    }

    /// Nodes in declaration order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes
            .iter()
            .map(|(id, record)| Node::new(id.clone(), record.node_type.clone(), record.data.clone()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
