use crate::error::BuildDiagnostic;
use crate::graph::RawGraphDocument;
use crate::ir::graph::{IRConnection, IRGraph};
use crate::ir::node::IRNode;
use crate::ir::value::{IRValue, is_reference_template, parse_reference_template};
use crate::registry::TypeRegistry;
use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::debug;

/// Lowers a normalized document into the typed IR.
///
/// Best-effort by contract: a single bad node, value, or edge never fails the
/// build. The method always returns a usable [`IRGraph`] plus the
/// diagnostics it accumulated, so callers can report partial coverage instead
/// of an all-or-nothing failure.
pub fn build(doc: &RawGraphDocument, registry: &TypeRegistry) -> (IRGraph, Vec<BuildDiagnostic>) {
    let mut diagnostics = Vec::new();
    let known_ids: AHashSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    let major_version = doc.version.split('.').next().unwrap_or("1");

    let mut nodes = IndexMap::with_capacity(doc.nodes.len());
    for raw in &doc.nodes {
        let converter_key = match registry.resolve(&raw.type_key) {
            Some(handle) => {
                let versions = handle.supported_source_versions();
                if !versions.is_empty() && !versions.contains(&major_version) {
                    diagnostics.push(BuildDiagnostic::VersionMismatch {
                        node_id: raw.id.clone(),
                        document_version: doc.version.clone(),
                    });
                }
                Some(handle.converter_key().to_string())
            }
            None => {
                diagnostics.push(BuildDiagnostic::UnsupportedType {
                    node_id: raw.id.clone(),
                    type_key: raw.type_key.clone(),
                });
                None
            }
        };

        let mut resolved_inputs = IndexMap::with_capacity(raw.input_values.len());
        for (input, value) in &raw.input_values {
            let resolved = resolve_value(&raw.id, input, value, &known_ids, &mut diagnostics);
            resolved_inputs.insert(input.clone(), resolved);
        }

        nodes.insert(
            raw.id.clone(),
            IRNode {
                id: raw.id.clone(),
                type_key: raw.type_key.clone(),
                converter_key,
                category: raw.category.clone(),
                label: raw.label.clone(),
                resolved_inputs,
                input_ports: raw.input_ports.clone(),
                output_ports: raw.output_ports.clone(),
            },
        );
    }

    let mut connections = Vec::with_capacity(doc.edges.len());
    for edge in &doc.edges {
        if !known_ids.contains(edge.source.as_str()) || !known_ids.contains(edge.target.as_str()) {
            diagnostics.push(BuildDiagnostic::DanglingEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
            });
            continue;
        }
        connections.push(IRConnection {
            source_node_id: edge.source.clone(),
            source_port: edge.source_port.clone(),
            target_node_id: edge.target.clone(),
            target_port: edge.target_port.clone(),
        });
    }

    debug!(
        nodes = nodes.len(),
        connections = connections.len(),
        diagnostics = diagnostics.len(),
        "built IR graph"
    );

    (
        IRGraph {
            name: doc.name.clone(),
            version: doc.version.clone(),
            nodes,
            connections,
        },
        diagnostics,
    )
}

/// Resolves one input value: literals copy through, reference templates
/// become `PortRef`. Malformed templates and references to unknown nodes
/// fall back to literal strings with a diagnostic, preserving the invariant
/// that every `PortRef` names a node present in the graph.
fn resolve_value(
    node_id: &str,
    input: &str,
    value: &serde_json::Value,
    known_ids: &AHashSet<&str>,
    diagnostics: &mut Vec<BuildDiagnostic>,
) -> IRValue {
    let serde_json::Value::String(raw) = value else {
        return IRValue::Literal(value.clone());
    };
    if !is_reference_template(raw) {
        return IRValue::Literal(value.clone());
    }

    match parse_reference_template(raw) {
        Some((referenced, port)) if known_ids.contains(referenced.as_str()) => IRValue::PortRef {
            node_id: referenced,
            port,
        },
        _ => {
            diagnostics.push(BuildDiagnostic::InvalidReference {
                node_id: node_id.to_string(),
                input: input.to_string(),
                raw: raw.clone(),
            });
            IRValue::Literal(value.clone())
        }
    }
}
