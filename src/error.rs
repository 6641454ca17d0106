use serde::Serialize;
use thiserror::Error;

/// Errors raised while parsing an exported graph document.
///
/// These are fatal to the whole request: nothing downstream can run without a
/// normalized document.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Input is empty or contains only whitespace")]
    Empty,

    #[error("Input is not valid JSON: {context} (line {line}, column {column})")]
    Malformed {
        context: String,
        line: usize,
        column: usize,
    },

    #[error("Document contains no 'nodes' array in any recognized shape")]
    MissingNodes,

    #[error("The 'flowData' field of flow '{flow_name}' is not valid JSON: {context}")]
    MalformedFlowData { flow_name: String, context: String },
}

/// Errors raised when registering a converter under an already-claimed key.
///
/// Registration happens at construction time, so this surfaces programming
/// mistakes rather than user input problems.
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    #[error("Converter key or alias '{0}' is already claimed by another converter")]
    DuplicateKey(String),
}

/// Non-fatal findings accumulated while lowering a raw document into the IR.
///
/// The builder always produces a usable graph; these describe what it had to
/// work around along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BuildDiagnostic {
    /// No converter is registered for the node's type; the node is kept as an
    /// opaque placeholder so coverage can still be reported.
    UnsupportedType { node_id: String, type_key: String },

    /// An input value looked like a `{{node.port}}` reference template but
    /// could not be parsed; the value was kept as a literal string.
    InvalidReference {
        node_id: String,
        input: String,
        raw: String,
    },

    /// An edge names a node id that does not exist in the document; the edge
    /// was dropped.
    DanglingEdge { source: String, target: String },

    /// The document's version is outside a converter's supported set.
    VersionMismatch {
        node_id: String,
        document_version: String,
    },
}

impl std::fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildDiagnostic::UnsupportedType { node_id, type_key } => {
                write!(f, "Node '{node_id}' has unsupported type '{type_key}'")
            }
            BuildDiagnostic::InvalidReference { node_id, input, raw } => write!(
                f,
                "Node '{node_id}' input '{input}' has a malformed reference template '{raw}'; treated as a literal"
            ),
            BuildDiagnostic::DanglingEdge { source, target } => write!(
                f,
                "Edge '{source}' -> '{target}' references a missing node and was dropped"
            ),
            BuildDiagnostic::VersionMismatch {
                node_id,
                document_version,
            } => write!(
                f,
                "Node '{node_id}' converter does not declare support for document version '{document_version}'"
            ),
        }
    }
}

/// Structural violations that make code generation impossible.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    #[error("Cycle detected through nodes: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    #[error(
        "Connection '{source_node}.{source_port}' -> '{target_node}.{target_port}' has no common type (source: [{}], target: [{}])",
        source_types.join(", "),
        target_types.join(", ")
    )]
    TypeMismatch {
        source_node: String,
        source_port: String,
        target_node: String,
        target_port: String,
        source_types: Vec<String>,
        target_types: Vec<String>,
    },

    #[error("Node '{node_id}' is missing required input '{port}'")]
    MissingRequiredInput { node_id: String, port: String },
}

/// Advisory findings that never block generation.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationWarning {
    #[error("Node '{0}' has no incoming or outgoing connections")]
    Disconnected(String),
}

/// Defensive second line behind the validator's cycle check: the orderer must
/// terminate on any input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderingError {
    #[error("Cycle detected; nodes left unordered: {}", remaining.join(", "))]
    CycleDetected { remaining: Vec<String> },
}

/// Errors a single converter can raise while emitting fragments.
///
/// These never abort the run; dispatch records them per node and continues.
#[derive(Error, Debug, Clone)]
pub enum ConvertError {
    #[error("Converter for '{node_id}' requires input '{input}' which was not provided")]
    MissingInput { node_id: String, input: String },

    #[error("Converter for '{node_id}' received an unusable value for input '{input}': {message}")]
    InvalidInput {
        node_id: String,
        input: String,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Per-node failures recorded during dispatch; partial success is a
/// first-class outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GenerationError {
    /// The node carries no converter (opaque), so no fragments were emitted.
    UnsupportedNode { node_id: String, type_key: String },

    /// The node's converter failed; its fragments are absent from the output.
    ConverterFailed { node_id: String, message: String },
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::UnsupportedNode { node_id, type_key } => {
                write!(f, "Node '{node_id}': no converter for type '{type_key}'")
            }
            GenerationError::ConverterFailed { node_id, message } => {
                write!(f, "Node '{node_id}': converter failed: {message}")
            }
        }
    }
}
