//! Common test utilities for building flow documents and export JSON.
use flowgen::prelude::*;
use indexmap::IndexMap;

/// The minimal two-node export: a chat model feeding a QA chain.
#[allow(dead_code)]
pub const SIMPLE_EXPORT_JSON: &str = r#"{
    "name": "simple-qa",
    "nodes": [
        {
            "id": "llm1",
            "typeKey": "chatModel",
            "inputValues": { "model": "x" }
        },
        {
            "id": "chain1",
            "typeKey": "qaChain",
            "inputValues": { "model": "{{llm1.output}}" }
        }
    ],
    "edges": [
        { "source": "llm1", "target": "chain1" }
    ]
}"#;

/// The same flat document wrapped in a named-flow envelope with a
/// JSON-encoded `flowData` string, as the authoring tool's API export does.
#[allow(dead_code)]
pub fn wrapped_export_json() -> String {
    let flat = serde_json::json!({
        "nodes": [
            { "id": "llm1", "typeKey": "chatOpenAI", "inputValues": { "model": "gpt-4" } }
        ],
        "edges": []
    });
    serde_json::json!({
        "name": "wrapped-flow",
        "flowData": flat.to_string()
    })
    .to_string()
}

/// A multi-flow envelope; only the first entry should be selected.
#[allow(dead_code)]
pub fn multi_flow_export_json() -> String {
    serde_json::json!({
        "flows": [
            {
                "name": "first",
                "flowData": serde_json::json!({
                    "nodes": [{ "id": "a", "typeKey": "calculator" }]
                }).to_string()
            },
            {
                "name": "second",
                "flowData": serde_json::json!({
                    "nodes": [{ "id": "b", "typeKey": "serpAPI" }]
                }).to_string()
            }
        ]
    })
    .to_string()
}

/// Builds a document node directly, bypassing the parser.
#[allow(dead_code)]
pub fn make_node(id: &str, type_key: &str, inputs: &[(&str, serde_json::Value)]) -> RawNode {
    let mut input_values = IndexMap::new();
    for (key, value) in inputs {
        input_values.insert(key.to_string(), value.clone());
    }
    RawNode {
        id: id.to_string(),
        type_key: type_key.to_string(),
        category: String::new(),
        label: type_key.to_string(),
        position: None,
        input_values,
        input_ports: Vec::new(),
        output_ports: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn make_edge(source: &str, target: &str) -> RawEdge {
    RawEdge {
        source: source.to_string(),
        source_port: "output".to_string(),
        target: target.to_string(),
        target_port: "input".to_string(),
    }
}

/// Three supported nodes wired into a cycle: a -> b -> c -> a.
#[allow(dead_code)]
pub fn cyclic_document() -> RawGraphDocument {
    RawGraphDocument {
        name: "cyclic".to_string(),
        version: "1".to_string(),
        nodes: vec![
            make_node("a", "llmChain", &[]),
            make_node("b", "llmChain", &[]),
            make_node("c", "llmChain", &[]),
        ],
        edges: vec![
            make_edge("a", "b"),
            make_edge("b", "c"),
            make_edge("c", "a"),
        ],
    }
}

/// A document with `supported` convertible nodes and `unsupported` opaque
/// ones, all disconnected.
#[allow(dead_code)]
pub fn coverage_document(supported: usize, unsupported: usize) -> RawGraphDocument {
    let mut nodes = Vec::new();
    for i in 0..supported {
        nodes.push(make_node(&format!("s{i}"), "calculator", &[]));
    }
    for i in 0..unsupported {
        nodes.push(make_node(&format!("u{i}"), "mysteryNode", &[]));
    }
    RawGraphDocument {
        name: "coverage".to_string(),
        version: "1".to_string(),
        nodes,
        edges: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn default_compiler() -> FlowCompiler {
    FlowCompiler::builder()
        .build()
        .expect("builtin registry should build")
}

/// The main implementation file of a generation result.
#[allow(dead_code)]
pub fn implementation_of(result: &CodeGenerationResult) -> &GeneratedFile {
    result
        .files
        .iter()
        .find(|f| f.path.starts_with("index.") && !f.path.contains("test"))
        .expect("result should contain an implementation file")
}
