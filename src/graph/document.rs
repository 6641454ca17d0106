use indexmap::IndexMap;
use serde::Serialize;

/// The normalized but untyped input document.
///
/// Produced once by the parser from any of the source tool's export shapes
/// and immutable afterwards. This is the canonical front-end output: every
/// downstream component consumes this instead of the raw export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawGraphDocument {
    pub name: String,
    pub version: String,
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

/// A single node as exported by the authoring tool.
#[derive(Debug, Clone, Serialize)]
pub struct RawNode {
    pub id: String,
    /// The string used to look up a converter, before alias resolution.
    pub type_key: String,
    pub category: String,
    pub label: String,
    /// Canvas coordinates; carried through for completeness, ignored
    /// downstream.
    pub position: Option<Position>,
    /// Literal values and `{{node.port}}` reference templates, keyed by input
    /// name. Insertion order is preserved so generated code is stable.
    pub input_values: IndexMap<String, serde_json::Value>,
    pub input_ports: Vec<PortSpec>,
    pub output_ports: Vec<PortSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A named, typed input or output slot on a node.
///
/// `declared_types` is a type-hierarchy list, most specific first. Two ports
/// are compatible when their declared-type sets intersect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortSpec {
    pub name: String,
    pub declared_types: Vec<String>,
    pub required: bool,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, declared_types: &[&str], required: bool) -> Self {
        Self {
            name: name.into(),
            declared_types: declared_types.iter().map(|t| t.to_string()).collect(),
            required,
        }
    }

    /// Non-empty intersection of declared-type sets. Ports without declared
    /// types are treated as compatible with anything; the export format omits
    /// type lists on some anchors and that must not produce false mismatches.
    pub fn is_compatible_with(&self, other: &PortSpec) -> bool {
        if self.declared_types.is_empty() || other.declared_types.is_empty() {
            return true;
        }
        self.declared_types
            .iter()
            .any(|t| other.declared_types.contains(t))
    }
}

/// A directed connection between two nodes, already reduced to plain port
/// names (handle decoration stripped by the parser).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawEdge {
    pub source: String,
    pub source_port: String,
    pub target: String,
    pub target_port: String,
}
