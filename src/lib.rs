//! # flowgen - Visual Flow Graph to Source Code Compiler
//!
//! **flowgen** translates visual workflow graphs (exported from a node-based
//! flow-authoring tool) into source code for an equivalent program built on a
//! target orchestration library. Prototypes built visually become deployable,
//! inspectable source instead of a black-box runtime interpreter.
//!
//! ## Core Workflow
//!
//! The crate is a small compiler. A conversion runs through five stages:
//!
//! 1.  **Parse**: normalize any of the tool's export shapes into one
//!     canonical [`graph::RawGraphDocument`].
//! 2.  **Build IR**: resolve every node through the [`registry::TypeRegistry`]
//!     and every `{{node.port}}` reference template into a typed
//!     [`ir::IRGraph`], accumulating diagnostics instead of failing.
//! 3.  **Validate**: check acyclicity, port-type compatibility, and
//!     required-input coverage without mutating the graph.
//! 4.  **Order**: compute a deterministic, dependency-respecting emission
//!     order (original document order breaks ties, so re-running an unchanged
//!     input yields byte-identical output).
//! 5.  **Generate**: dispatch each node to its converter, then merge the
//!     fragments (import deduplication, dependency-ordered declarations,
//!     entry-point wiring) into an in-memory file set plus a dependency
//!     manifest.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgen::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let export_json = std::fs::read_to_string("flow.json")?;
//!
//!     // Build the compiler once; it is immutable and shareable afterwards.
//!     let compiler = FlowCompiler::builder()
//!         .with_context(GenerationContext::default())
//!         .build()?;
//!
//!     // Pre-flight without generating code.
//!     let report = compiler.validate_only(&export_json)?;
//!     println!(
//!         "{} nodes, {}% of types supported",
//!         report.analysis.node_count, report.analysis.coverage_percent
//!     );
//!
//!     // Full conversion. Partial success is a normal outcome: unsupported
//!     // nodes are reported in `errors` while the rest still convert.
//!     let outcome = compiler.convert(&export_json);
//!     for error in &outcome.errors {
//!         eprintln!("warning: {error}");
//!     }
//!     if let Some(result) = outcome.result {
//!         for file in &result.files {
//!             println!("=== {} ===\n{}", file.path, file.content);
//!         }
//!         for (package, version) in &result.dependency_manifest {
//!             println!("depends on {package}@{version}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Extending
//!
//! Every node-type handler implements the single
//! [`registry::NodeConverter`] capability (`convert` / `dependencies` /
//! `supported_source_versions`) and registers into a flat map; adding a new
//! provider never touches the pipeline:
//!
//! ```rust,ignore
//! let compiler = FlowCompiler::builder()
//!     .with_converter(Arc::new(MyVectorStoreConverter))
//!     .build()?;
//! ```

pub mod codegen;
pub mod error;
pub mod graph;
pub mod ir;
pub mod order;
pub mod pipeline;
pub mod prelude;
pub mod registry;
pub mod validate;
