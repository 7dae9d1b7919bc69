use super::imports::ImportAggregator;
use crate::error::{Error, Result, ResultExt};
use crate::pipeline::id::NodeId;
use std::fmt;
use std::path::Path;

/// Script generated for one pipeline description.
///
/// Built fresh per compile and handed to the caller; the compiler keeps no
/// reference to it.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    /// Pipeline id from the description, if it had one
    pub pipeline_id: Option<String>,

    /// Full script text
    pub text: String,

    /// Merged imports, in the order they appear in the script
    pub imports: ImportAggregator,

    /// Node ids in execution order
    pub order: Vec<NodeId>,

    /// (node id, synthetic identifier) in execution order
    pub identifiers: Vec<(NodeId, String)>,

    /// Compilation statistics
    pub stats: CompileStats,
}

/// Statistics about a compile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Total number of nodes in the description
    pub total_nodes: usize,

    /// Number of source nodes (no inputs)
    pub source_nodes: usize,

    /// Number of sink nodes (no outputs)
    pub sink_nodes: usize,

    /// Nodes that fell back to the placeholder generator
    pub unhandled_nodes: usize,

    /// Number of import statements in the script
    pub import_count: usize,

    /// Compilation time in microseconds
    pub compile_time_us: u64,
}

impl GeneratedScript {
    /// Synthetic identifier bound to `node`'s output
    pub fn identifier(&self, node: &NodeId) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|(id, _)| id == node)
            .map(|(_, ident)| ident.as_str())
    }

    /// Top-level packages the script imports
    pub fn packages(&self) -> Vec<String> {
        self.imports.packages()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Write the script text to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.text)
            .map_err(Error::from)
            .with_context(|| format!("Failed to write script to {}", path.display()))
    }
}

impl fmt::Display for GeneratedScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
