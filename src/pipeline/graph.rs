//! Arena representation of one pipeline graph.
//!
//! Nodes live in a flat `Vec<Node>` addressed by `NodeIndex`; edges refer to
//! nodes only through indices. A cyclic description is therefore plain data
//! until the sorter looks at it.

use crate::compiler::error::{CompileError, CompileResult};
use crate::pipeline::description::PipelineDescription;
use crate::pipeline::id::{ConnectionId, NodeId, NodeIndex};
use crate::pipeline::node::Node;
use std::collections::HashMap;

/// A resolved connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: ConnectionId,
    pub source: NodeIndex,
    pub target: NodeIndex,
}

/// Forward adjacency plus in-degree, both indexed by `NodeIndex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    /// `adjacency[n]` lists the targets of n's outgoing edges, in edge order.
    pub adjacency: Vec<Vec<NodeIndex>>,
    /// Number of incoming edges per node.
    pub in_degree: Vec<usize>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.in_degree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_degree.is_empty()
    }
}

/// Immutable node and edge arena for one compile.
#[derive(Debug, Clone)]
pub struct PipelineGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, NodeIndex>,
    edges: Vec<Edge>,
    /// Upstream nodes per node, in connection declaration order.
    incoming: Vec<Vec<NodeIndex>>,
}

impl PipelineGraph {
    /// Resolve a description into an arena.
    ///
    /// Fails with `Validation` if a connection names a node that is not in
    /// the node set.
    pub fn build(description: &PipelineDescription) -> CompileResult<Self> {
        let mut nodes = Vec::with_capacity(description.node_count());
        let mut index = HashMap::with_capacity(description.node_count());

        for (i, node) in description.iter_nodes().enumerate() {
            let idx = u32::try_from(i)
                .map(NodeIndex)
                .map_err(|_| CompileError::Validation("Too many nodes in pipeline".to_string()))?;
            index.insert(node.id.clone(), idx);
            nodes.push(node);
        }

        let mut edges = Vec::with_capacity(description.connections.len());
        let mut incoming = vec![Vec::new(); nodes.len()];

        for (conn_id, conn) in &description.connections {
            let resolve = |id: &NodeId, end: &str| {
                index.get(id).copied().ok_or_else(|| {
                    CompileError::Validation(format!(
                        "Connection '{}' references unknown {} node '{}'",
                        conn_id, end, id
                    ))
                })
            };
            let source = resolve(&conn.source_node, "source")?;
            let target = resolve(&conn.target_node, "target")?;

            incoming[target.index()].push(source);
            edges.push(Edge {
                id: conn_id.clone(),
                source,
                target,
            });
        }

        Ok(Self {
            nodes,
            index,
            edges,
            incoming,
        })
    }

    /// Adjacency list and in-degree table.
    ///
    /// Every node appears, including ones with no connections.
    pub fn adjacency(&self) -> Adjacency {
        let n = self.nodes.len();
        let mut adjacency = vec![Vec::new(); n];
        let mut in_degree = vec![0; n];

        for edge in &self.edges {
            adjacency[edge.source.index()].push(edge.target);
            in_degree[edge.target.index()] += 1;
        }

        Adjacency {
            adjacency,
            in_degree,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.index()]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Sources of the connections into `idx`, in declaration order.
    pub fn upstream(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.incoming[idx.index()]
    }

    /// Nodes with no incoming connection.
    pub fn source_count(&self) -> usize {
        self.incoming.iter().filter(|up| up.is_empty()).count()
    }

    /// Nodes with no outgoing connection.
    pub fn sink_count(&self) -> usize {
        let mut has_outgoing = vec![false; self.nodes.len()];
        for edge in &self.edges {
            has_outgoing[edge.source.index()] = true;
        }
        has_outgoing.iter().filter(|&&out| !out).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::connection::Connection;
    use crate::pipeline::node::NodeConfig;

    fn chain() -> PipelineDescription {
        PipelineDescription::new()
            .node("a", "DataLoader", NodeConfig::new())
            .node("b", "ImageAugmentation", NodeConfig::new())
            .node("c", "ModelTraining", NodeConfig::new())
            .connect("a", "b")
            .connect("b", "c")
    }

    #[test]
    fn test_adjacency_and_in_degree() {
        let graph = PipelineGraph::build(&chain()).unwrap();
        let adj = graph.adjacency();
        assert_eq!(adj.adjacency[0], vec![NodeIndex(1)]);
        assert_eq!(adj.adjacency[1], vec![NodeIndex(2)]);
        assert!(adj.adjacency[2].is_empty());
        assert_eq!(adj.in_degree, vec![0, 1, 1]);
    }

    #[test]
    fn test_isolated_nodes_are_present() {
        let desc = PipelineDescription::new()
            .node("x", "Foo", NodeConfig::new())
            .node("y", "Bar", NodeConfig::new());
        let adj = PipelineGraph::build(&desc).unwrap().adjacency();
        assert_eq!(adj.len(), 2);
        assert_eq!(adj.in_degree, vec![0, 0]);
        assert!(adj.adjacency.iter().all(|a| a.is_empty()));
    }

    #[test]
    fn test_dangling_target_is_rejected() {
        let desc = chain().connect("c", "ghost");
        let err = PipelineGraph::build(&desc).unwrap_err();
        assert!(matches!(err, CompileError::Validation(ref msg) if msg.contains("ghost")));
    }

    #[test]
    fn test_dangling_source_is_rejected() {
        let desc = chain().connection("bad", Connection::new("nowhere", "a"));
        let err = PipelineGraph::build(&desc).unwrap_err();
        assert!(matches!(err, CompileError::Validation(ref msg) if msg.contains("'bad'")));
    }

    #[test]
    fn test_upstream_follows_connection_order() {
        let desc = PipelineDescription::new()
            .node("late", "DataLoader", NodeConfig::new())
            .node("early", "DataLoader", NodeConfig::new())
            .node("sink", "Merge", NodeConfig::new())
            .connect("early", "sink")
            .connect("late", "sink");
        let graph = PipelineGraph::build(&desc).unwrap();
        let sink = graph.index_of(&NodeId::new("sink")).unwrap();
        assert_eq!(graph.upstream(sink), &[NodeIndex(1), NodeIndex(0)]);
    }

    #[test]
    fn test_source_and_sink_counts() {
        let graph = PipelineGraph::build(&chain()).unwrap();
        assert_eq!(graph.source_count(), 1);
        assert_eq!(graph.sink_count(), 1);
    }

    #[test]
    fn test_self_loop_is_structurally_allowed() {
        let desc = chain().connect("b", "b");
        let graph = PipelineGraph::build(&desc).unwrap();
        assert_eq!(graph.adjacency().in_degree[1], 2);
    }
}
