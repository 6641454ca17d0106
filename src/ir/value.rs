use serde::Serialize;
use std::fmt;

/// A resolved input value on an IR node.
///
/// The source format encodes references to other nodes' outputs as templated
/// strings inside literal values (`{{otherNode.output}}`). The IR builder
/// eagerly converts those into `PortRef` so no downstream component ever
/// re-parses strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IRValue {
    Literal(serde_json::Value),
    PortRef { node_id: String, port: String },
}

impl IRValue {
    pub fn as_port_ref(&self) -> Option<(&str, &str)> {
        match self {
            IRValue::PortRef { node_id, port } => Some((node_id, port)),
            IRValue::Literal(_) => None,
        }
    }
}

impl fmt::Display for IRValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IRValue::Literal(v) => write!(f, "{}", v),
            IRValue::PortRef { node_id, port } => write!(f, "${}.{}", node_id, port),
        }
    }
}

/// True when the string is shaped like a reference template. A template that
/// looks the part but fails [`parse_reference_template`] is reported as a
/// diagnostic and kept as a literal.
pub fn is_reference_template(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.starts_with("{{") && trimmed.ends_with("}}")
}

/// Parses `{{nodeId.portName}}` into its parts. The port name may itself
/// contain dots (`{{llm1.data.instance}}`): the split happens at the first
/// one, everything after belongs to the port path.
pub fn parse_reference_template(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?.trim();
    let (node_id, port) = inner.split_once('.')?;
    let node_id = node_id.trim();
    let port = port.trim();
    if node_id.is_empty() || port.is_empty() || node_id.contains(char::is_whitespace) {
        return None;
    }
    Some((node_id.to_string(), port.to_string()))
}
