//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the flowgen crate. Import
//! this module to get access to the core functionality without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgen::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let export_json = std::fs::read_to_string("path/to/flow.json")?;
//!
//! let compiler = FlowCompiler::builder().build()?;
//! let outcome = compiler.convert(&export_json);
//!
//! if let Some(result) = outcome.result {
//!     for file in &result.files {
//!         println!("--- {} ---\n{}", file.path, file.content);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Top-level pipeline
pub use crate::pipeline::{
    ConversionMetrics, ConversionOutcome, FlowCompiler, FlowCompilerBuilder, GraphAnalysis,
    ValidationReport, parse_graph, parse_graph_bytes,
};

// Document and IR types
pub use crate::graph::{PortSpec, RawEdge, RawGraphDocument, RawNode};
pub use crate::ir::{IRConnection, IRGraph, IRNode, IRValue};

// Code generation
pub use crate::codegen::{
    CodeFragment, CodeGenerationResult, FeatureFlags, FileKind, FragmentKind, GeneratedFile,
    GenerationContext, ImportSpec, QuoteStyle, TargetFormat,
};

// Registry and converter contract
pub use crate::registry::{
    Capabilities, ConverterHandle, NodeConverter, PackageSpec, RegistryStatistics, TypeRegistry,
};

// Error types
pub use crate::error::{ConvertError, ParseError, RegistrationError, ValidationError};

// Standard library re-exports commonly used with this crate
pub use std::collections::BTreeMap;
pub use std::sync::Arc;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
