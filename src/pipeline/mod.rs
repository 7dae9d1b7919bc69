//! Pipeline graph data model.
//!
//! A pipeline is a set of typed nodes plus directed connections between their
//! ports, as drawn in the visual editor:
//!
//! ```text
//! [DataLoader n1] ──► [ImageAugmentation n2] ──► [ModelTraining n3]
//! ```
//!
//! # Design
//!
//! - **Ordered containers**: `PipelineDescription` keeps the editor's
//!   declaration order, which is what makes compilation deterministic.
//! - **Arena graph**: `PipelineGraph` stores nodes in a `Vec` and edges as
//!   index pairs, with `NodeIndex` as the array index.
//! - **Defaulted config**: `NodeConfig` accessors never fail.

pub mod connection;
pub mod description;
pub mod graph;
pub mod id;
pub mod node;
pub mod node_type;

pub use connection::Connection;
pub use description::{NodeRecord, PipelineDescription};
pub use graph::{Adjacency, Edge, PipelineGraph};
pub use id::{ConnectionId, NodeId, NodeIndex, PortId};
pub use node::{Node, NodeConfig};
pub use node_type::NodeType;
