use crate::codegen::context::EmitContext;
use crate::codegen::fragment::CodeFragment;
use crate::error::ConvertError;
use crate::ir::IRNode;
use serde::Serialize;
use std::sync::Arc;

/// A package the generated code will depend on, destined for the dependency
/// manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: String,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// The single capability every node-type handler implements.
///
/// Model providers, memory stores, vector stores, tools, and chains all
/// register through this same contract; adding a node type never touches the
/// pipeline. Implementations must be pure functions of `(node, ctx)` with no
/// hidden shared mutable state, which keeps per-node dispatch trivially
/// parallelizable.
pub trait NodeConverter: Send + Sync {
    /// Canonical registry key for this converter.
    fn converter_key(&self) -> &str;

    /// Capability-reporting category (e.g. "Chat Models", "Chains").
    fn category(&self) -> &str;

    /// Additional type keys resolving to this converter.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Packages the emitted code requires at runtime.
    fn dependencies(&self) -> Vec<PackageSpec>;

    /// Major versions of the source export format this converter understands.
    /// An empty list means no gating.
    fn supported_source_versions(&self) -> &[&str] {
        &["1", "2"]
    }

    /// Emits this node's code fragments. Failures are isolated to the node
    /// by the dispatcher; they never abort the run.
    fn convert(&self, node: &IRNode, ctx: &EmitContext<'_>)
        -> Result<Vec<CodeFragment>, ConvertError>;
}

/// Shared, read-only handle to a registered converter.
pub type ConverterHandle = Arc<dyn NodeConverter>;
