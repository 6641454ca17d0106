use crate::error::ParseError;
use crate::graph::document::{Position, PortSpec, RawEdge, RawGraphDocument, RawNode};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Parses an exported graph document into the canonical [`RawGraphDocument`].
///
/// Accepts three export shapes:
/// 1. a flat document with top-level `nodes`/`edges`,
/// 2. a single named flow whose `flowData` field is itself a JSON-encoded
///    flat document (string or already-decoded object),
/// 3. a multi-flow envelope (`flows` or `chatflows` array) of which the
///    first entry is selected.
///
/// Pure function: no I/O, no semantic validation beyond requiring that a
/// `nodes` array exists in some form.
pub fn parse(input: &str) -> Result<RawGraphDocument, ParseError> {
    let trimmed = input.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let root: Value = serde_json::from_str(trimmed).map_err(|e| ParseError::Malformed {
        context: e.to_string(),
        line: e.line(),
        column: e.column(),
    })?;

    let doc = normalize_document(&root)?;
    debug!(
        name = %doc.name,
        nodes = doc.nodes.len(),
        edges = doc.edges.len(),
        "parsed graph document"
    );
    Ok(doc)
}

/// Parses a raw byte buffer, decoding it first. Exports arrive as files and
/// HTTP bodies in whatever encoding the authoring tool's host platform
/// produced: UTF-16 (either endianness, detected by BOM) is transcoded,
/// anything else is decoded as UTF-8 with invalid sequences replaced.
pub fn parse_bytes(input: &[u8]) -> Result<RawGraphDocument, ParseError> {
    match input {
        [0xff, 0xfe, rest @ ..] => parse(&decode_utf16(rest, u16::from_le_bytes)),
        [0xfe, 0xff, rest @ ..] => parse(&decode_utf16(rest, u16::from_be_bytes)),
        _ => parse(&String::from_utf8_lossy(input)),
    }
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| read([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Resolves whichever envelope shape the export used down to one flat
/// `nodes`/`edges` object, then lowers it.
fn normalize_document(root: &Value) -> Result<RawGraphDocument, ParseError> {
    if root.get("nodes").is_some_and(Value::is_array) {
        return lower_flat(root, default_name(root), version_of(root));
    }

    if let Some(flow_data) = root.get("flowData") {
        return lower_flow_entry(root, flow_data);
    }

    for key in ["flows", "chatflows"] {
        if let Some(entries) = root.get(key).and_then(Value::as_array) {
            let Some(first) = entries.first() else {
                return Err(ParseError::MissingNodes);
            };
            if let Some(flow_data) = first.get("flowData") {
                return lower_flow_entry(first, flow_data);
            }
            if first.get("nodes").is_some_and(Value::is_array) {
                return lower_flat(first, default_name(first), version_of(first));
            }
            return Err(ParseError::MissingNodes);
        }
    }

    Err(ParseError::MissingNodes)
}

/// Handles the named-flow envelope: `flowData` is either a JSON string or an
/// inline object holding the flat document.
fn lower_flow_entry(entry: &Value, flow_data: &Value) -> Result<RawGraphDocument, ParseError> {
    let name = default_name(entry);
    match flow_data {
        Value::String(encoded) => {
            let inner: Value =
                serde_json::from_str(encoded).map_err(|e| ParseError::MalformedFlowData {
                    flow_name: name.clone(),
                    context: e.to_string(),
                })?;
            if !inner.get("nodes").is_some_and(Value::is_array) {
                return Err(ParseError::MissingNodes);
            }
            let version = version_of(&inner);
            lower_flat(&inner, name, version)
        }
        Value::Object(_) => {
            if !flow_data.get("nodes").is_some_and(Value::is_array) {
                return Err(ParseError::MissingNodes);
            }
            lower_flat(flow_data, name, version_of(flow_data))
        }
        _ => Err(ParseError::MissingNodes),
    }
}

fn default_name(value: &Value) -> String {
    string_field(value, &["name", "id"]).unwrap_or_else(|| "flow".to_string())
}

fn version_of(value: &Value) -> String {
    string_field(value, &["version"]).unwrap_or_else(|| "1".to_string())
}

fn lower_flat(
    flat: &Value,
    name: String,
    version: String,
) -> Result<RawGraphDocument, ParseError> {
    let nodes = flat
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingNodes)?
        .iter()
        .filter_map(lower_node)
        .collect::<Vec<_>>();

    let edges = flat
        .get("edges")
        .and_then(Value::as_array)
        .map(|edges| edges.iter().filter_map(lower_edge).collect())
        .unwrap_or_default();

    Ok(RawGraphDocument {
        name,
        version,
        nodes,
        edges,
    })
}

/// Lowers one node entry. The exporter sometimes nests the payload under a
/// `data` envelope (canvas position at the top level) and sometimes writes it
/// flat; both are accepted. Entries without an id are skipped: there is
/// nothing to report them by, and the builder tolerates missing nodes.
fn lower_node(raw: &Value) -> Option<RawNode> {
    let data = raw.get("data").filter(|d| d.is_object()).unwrap_or(raw);
    let id = string_field(raw, &["id"]).or_else(|| string_field(data, &["id"]))?;

    let type_key = string_field(data, &["typeKey", "name", "type"]).unwrap_or_default();
    let category = string_field(data, &["category"]).unwrap_or_default();
    let label = string_field(data, &["label"]).unwrap_or_else(|| type_key.clone());

    let position = raw.get("position").and_then(|p| {
        Some(Position {
            x: p.get("x")?.as_f64()?,
            y: p.get("y")?.as_f64()?,
        })
    });

    let mut input_values = IndexMap::new();
    if let Some(map) = field(data, &["inputValues", "inputs"]).and_then(Value::as_object) {
        for (key, value) in map {
            input_values.insert(key.clone(), value.clone());
        }
    }

    Some(RawNode {
        id,
        type_key,
        category,
        label,
        position,
        input_values,
        input_ports: lower_ports(data, &["inputPorts", "inputAnchors"]),
        output_ports: lower_ports(data, &["outputPorts", "outputAnchors"]),
    })
}

/// Lowers a port list. `type` is a pipe-separated hierarchy list in the
/// export format ("BaseChatModel | BaseLanguageModel"); `optional` inverts
/// into `required` and defaults to optional when absent, matching how the
/// exporter omits the flag on connection-free anchors.
fn lower_ports(data: &Value, keys: &[&str]) -> Vec<PortSpec> {
    let Some(entries) = field(data, keys).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = string_field(entry, &["name", "id"])?;
            let declared_types = string_field(entry, &["type"])
                .map(|t| {
                    t.split('|')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let required = entry
                .get("optional")
                .and_then(Value::as_bool)
                .map(|optional| !optional)
                .unwrap_or(false);
            Some(PortSpec {
                name,
                declared_types,
                required,
            })
        })
        .collect()
}

fn lower_edge(raw: &Value) -> Option<RawEdge> {
    let source = string_field(raw, &["source"])?;
    let target = string_field(raw, &["target"])?;
    let source_port = string_field(raw, &["sourcePort", "sourceHandle"])
        .map(|h| port_from_handle(&h, &source))
        .unwrap_or_else(|| "output".to_string());
    let target_port = string_field(raw, &["targetPort", "targetHandle"])
        .map(|h| port_from_handle(&h, &target))
        .unwrap_or_else(|| "input".to_string());
    Some(RawEdge {
        source,
        source_port,
        target,
        target_port,
    })
}

/// Edge handles are decorated as `<nodeId>-<portName>-<TypeList>` in the
/// export format; plain port names pass through unchanged.
fn port_from_handle(handle: &str, node_id: &str) -> String {
    let stripped = handle
        .strip_prefix(node_id)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(handle);
    match stripped.split_once('-') {
        Some((port, _)) if !port.is_empty() => port.to_string(),
        _ => stripped.to_string(),
    }
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| value.get(key))
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    field(value, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}
