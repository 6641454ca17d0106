use crate::error::{ValidationError, ValidationWarning};
use crate::ir::{IRGraph, IRValue};
use ahash::AHashMap;
use serde::Serialize;
use tracing::debug;

/// Outcome of a validation pass. Errors are fatal to code generation;
/// warnings never block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Node coloring for the cycle scan.
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Checks the IR graph for structural invariants without mutating it:
/// acyclicity, port-type compatibility, required-input coverage, and a
/// connectivity advisory. Deterministic given the same graph.
pub fn validate(graph: &IRGraph) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_cycles(graph, &mut errors);
    check_port_compatibility(graph, &mut errors);
    check_required_inputs(graph, &mut errors);
    check_connectivity(graph, &mut warnings);

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "validated IR graph"
    );

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Three-color DFS over the dependency edges (explicit connections plus
/// `PortRef` usages). A grey-to-grey edge is a back edge; the enclosing path
/// is reported so the author can see the loop. The adjacency is built once
/// up front, keeping the whole scan linear in graph size.
fn check_cycles(graph: &IRGraph, errors: &mut Vec<ValidationError>) {
    let deps_map = graph.dependency_map();
    let mut marks: AHashMap<&str, Mark> = graph
        .nodes
        .keys()
        .map(|id| (id.as_str(), Mark::White))
        .collect();

    for id in graph.nodes.keys() {
        if marks[id.as_str()] == Mark::White {
            let mut stack = Vec::new();
            visit(id, &deps_map, &mut marks, &mut stack, errors);
        }
    }
}

fn visit<'a>(
    id: &'a str,
    deps_map: &AHashMap<&'a str, Vec<&'a str>>,
    marks: &mut AHashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    marks.insert(id, Mark::Grey);
    stack.push(id);

    // the map points at what `id` consumes; traversing it still finds every
    // cycle, just walked against the data-flow direction.
    for &dep in deps_map.get(id).map(Vec::as_slice).unwrap_or_default() {
        match marks.get(dep).copied() {
            Some(Mark::White) => visit(dep, deps_map, marks, stack, errors),
            Some(Mark::Grey) => {
                let start = stack.iter().position(|n| *n == dep).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                path.push(dep.to_string());
                errors.push(ValidationError::CycleDetected { path });
            }
            _ => {}
        }
    }

    stack.pop();
    marks.insert(id, Mark::Black);
}

/// Every connection's port-type sets must intersect. Ports the document did
/// not describe are skipped rather than guessed at.
fn check_port_compatibility(graph: &IRGraph, errors: &mut Vec<ValidationError>) {
    for conn in &graph.connections {
        let (Some(source), Some(target)) = (
            graph.node(&conn.source_node_id),
            graph.node(&conn.target_node_id),
        ) else {
            continue;
        };
        let (Some(source_port), Some(target_port)) = (
            source.output_port(&conn.source_port),
            target.input_port(&conn.target_port),
        ) else {
            continue;
        };
        if !source_port.is_compatible_with(target_port) {
            errors.push(ValidationError::TypeMismatch {
                source_node: conn.source_node_id.clone(),
                source_port: conn.source_port.clone(),
                target_node: conn.target_node_id.clone(),
                target_port: conn.target_port.clone(),
                source_types: source_port.declared_types.clone(),
                target_types: target_port.declared_types.clone(),
            });
        }
    }
}

/// A required input is covered by an incoming connection on that port, a
/// `PortRef`, or a non-empty literal. An explicit null or empty string is
/// what the authoring tool writes for a field left blank, so neither counts.
fn check_required_inputs(graph: &IRGraph, errors: &mut Vec<ValidationError>) {
    for node in graph.nodes.values() {
        for port in node.input_ports.iter().filter(|p| p.required) {
            let connected = graph
                .connections
                .iter()
                .any(|c| c.target_node_id == node.id && c.target_port == port.name);
            if connected {
                continue;
            }
            let provided = match node.resolved_inputs.get(&port.name) {
                Some(IRValue::PortRef { .. }) => true,
                Some(IRValue::Literal(value)) => {
                    !value.is_null() && value.as_str() != Some("")
                }
                None => false,
            };
            if !provided {
                errors.push(ValidationError::MissingRequiredInput {
                    node_id: node.id.clone(),
                    port: port.name.clone(),
                });
            }
        }
    }
}

/// Fully disconnected nodes are advisory only; some node types are
/// legitimately connection-free.
fn check_connectivity(graph: &IRGraph, warnings: &mut Vec<ValidationWarning>) {
    let incoming = graph.ids_with_incoming();
    let outgoing = graph.ids_with_outgoing();
    for id in graph.nodes.keys() {
        if !incoming.contains(id.as_str()) && !outgoing.contains(id.as_str()) {
            warnings.push(ValidationWarning::Disconnected(id.clone()));
        }
    }
}
