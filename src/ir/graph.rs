use crate::ir::node::IRNode;
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use serde::Serialize;

/// A typed connection between an output port and an input port.
///
/// Port-type compatibility is checked by the validator, not enforced at
/// construction: violations become validation errors, never panics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IRConnection {
    pub source_node_id: String,
    pub source_port: String,
    pub target_node_id: String,
    pub target_port: String,
}

/// The validated-ready intermediate representation of one flow.
///
/// Owns its node table (insertion order preserved, which the orderer's
/// tie-break depends on) and connection list. Built once per conversion
/// request and never mutated after validation; validation and ordering are
/// read-only traversals producing separate result objects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IRGraph {
    pub name: String,
    pub version: String,
    pub nodes: IndexMap<String, IRNode>,
    pub connections: Vec<IRConnection>,
}

impl IRGraph {
    pub fn node(&self, id: &str) -> Option<&IRNode> {
        self.nodes.get(id)
    }

    /// Position of the node in original document order.
    pub fn insertion_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Dependency edges for every node: sources of incoming connections plus
    /// any node referenced by its resolved inputs, deduplicated, connection
    /// order first. Built in one scan over the connection list and the node
    /// table so validation and ordering stay linear in graph size.
    pub fn dependency_map(&self) -> AHashMap<&str, Vec<&str>> {
        let mut deps: AHashMap<&str, Vec<&str>> = self
            .nodes
            .keys()
            .map(|id| (id.as_str(), Vec::new()))
            .collect();
        let mut seen: AHashSet<(&str, &str)> = AHashSet::new();

        for conn in &self.connections {
            let target = conn.target_node_id.as_str();
            let source = conn.source_node_id.as_str();
            if seen.insert((target, source)) {
                deps.entry(target).or_default().push(source);
            }
        }
        for node in self.nodes.values() {
            for referenced in node.referenced_node_ids() {
                if self.nodes.contains_key(referenced)
                    && seen.insert((node.id.as_str(), referenced))
                {
                    deps.entry(node.id.as_str()).or_default().push(referenced);
                }
            }
        }
        deps
    }

    /// Ids some other node consumes, through a connection or a `PortRef`.
    /// Nodes absent from the set are terminal.
    pub fn ids_with_outgoing(&self) -> AHashSet<&str> {
        let mut out: AHashSet<&str> = self
            .connections
            .iter()
            .map(|c| c.source_node_id.as_str())
            .collect();
        for node in self.nodes.values() {
            out.extend(node.referenced_node_ids());
        }
        out
    }

    /// Ids that consume another node, through a connection or one of their
    /// own `PortRef` inputs.
    pub fn ids_with_incoming(&self) -> AHashSet<&str> {
        let mut incoming: AHashSet<&str> = self
            .connections
            .iter()
            .map(|c| c.target_node_id.as_str())
            .collect();
        for node in self.nodes.values() {
            if node.referenced_node_ids().next().is_some() {
                incoming.insert(node.id.as_str());
            }
        }
        incoming
    }

    pub fn supported_count(&self) -> usize {
        self.nodes.values().filter(|n| !n.is_opaque()).count()
    }

    /// Fraction of nodes with a registered converter, as a whole percentage.
    pub fn coverage_percent(&self) -> u32 {
        if self.nodes.is_empty() {
            return 100;
        }
        (self.supported_count() * 100 / self.nodes.len()) as u32
    }
}
