//! # pipeline-codegen: pipeline graph to training script compiler
//!
//! Takes the node graph drawn in a visual ML pipeline editor and generates a
//! single runnable Python script from it: one import block, one code block
//! per node in dependency order, and an entry routine that runs them.
//!
//! ## Architecture
//!
//! - **Pipeline model** (`pipeline`): the serialized description, plus an
//!   index-based graph built from it for one compile
//! - **Compiler** (`compiler`): topological ordering, per-type code
//!   generators, import aggregation and script assembly
//! - **Configuration** (`config`): layout options and import requirements,
//!   loaded from TOML or JSON
//!
//! The compiler does no I/O and keeps no state between compiles. Hosting
//! layers (the web editor, the `pipeline-codegen` CLI) own reading inputs and
//! delivering the script.
//!
//! ## Example
//!
//! ```
//! use pipeline_codegen::{CompilerConfig, NodeConfig, PipelineCompiler, PipelineDescription};
//!
//! let description = PipelineDescription::new()
//!     .node("n1", "DataLoader", NodeConfig::new().with("batchSize", 16))
//!     .node("n2", "ModelTraining", NodeConfig::new().with("epochs", 3))
//!     .connect("n1", "n2");
//!
//! let compiler = PipelineCompiler::new(CompilerConfig::default());
//! let script = compiler.compile(&description).unwrap();
//! assert!(script.text.contains("dataloader_n1 = DataLoader("));
//! assert!(script.text.contains("for datapoint, labels in dataloader_n1:"));
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use compiler::{
    CompileError, CompileStats, ErrorKind, GeneratedScript, GeneratorRegistry, ImportAggregator,
    ImportDirective, NodeGenerator, PipelineCompiler,
};
pub use config::{CompilerConfig, ImportRequirements};
pub use error::{Error, Result, ResultExt};
pub use pipeline::{Connection, NodeConfig, NodeId, NodeType, PipelineDescription};
