use crate::graph::PortSpec;
use crate::ir::value::IRValue;
use indexmap::IndexMap;
use serde::Serialize;

/// The typed counterpart of a raw node.
///
/// `converter_key` is the canonical registry key after alias resolution;
/// `None` marks an opaque node (no converter registered for its type), which
/// stays in the graph so shape and coverage can still be reported.
#[derive(Debug, Clone, Serialize)]
pub struct IRNode {
    pub id: String,
    pub type_key: String,
    pub converter_key: Option<String>,
    pub category: String,
    pub label: String,
    pub resolved_inputs: IndexMap<String, IRValue>,
    pub input_ports: Vec<PortSpec>,
    pub output_ports: Vec<PortSpec>,
}

impl IRNode {
    pub fn is_opaque(&self) -> bool {
        self.converter_key.is_none()
    }

    /// Node ids this node depends on through its resolved inputs.
    pub fn referenced_node_ids(&self) -> impl Iterator<Item = &str> {
        self.resolved_inputs
            .values()
            .filter_map(|value| value.as_port_ref().map(|(node_id, _)| node_id))
    }

    pub fn input_port(&self, name: &str) -> Option<&PortSpec> {
        self.input_ports.iter().find(|p| p.name == name)
    }

    pub fn output_port(&self, name: &str) -> Option<&PortSpec> {
        self.output_ports.iter().find(|p| p.name == name)
    }
}
