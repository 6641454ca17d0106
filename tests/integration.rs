//! End-to-end conversion tests over the full pipeline.
mod common;

use flowgen::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn simple_flow_converts_end_to_end() {
    let outcome = common::default_compiler().convert(common::SIMPLE_EXPORT_JSON);

    assert!(outcome.success);
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.metrics.node_count, 2);
    assert_eq!(outcome.metrics.coverage_percent, 100);

    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    let model_at = main
        .content
        .find("const chatModel = new ChatOpenAI(")
        .expect("model initialization");
    let chain_at = main
        .content
        .find("const qaChain = new RetrievalQAChain(")
        .expect("chain initialization");
    assert!(model_at < chain_at, "model must be initialized before the chain");
    // the chain has no retriever wired in, so it degrades to a stuff chain
    // over the referenced model variable
    assert!(main.content.contains("loadQAStuffChain(chatModel)"));

    let mut expected_manifest = BTreeMap::new();
    expected_manifest.insert("@langchain/openai".to_string(), "^0.3.0".to_string());
    expected_manifest.insert("langchain".to_string(), "^0.3.0".to_string());
    assert_eq!(result.dependency_manifest, expected_manifest);
}

#[test]
fn conversion_is_deterministic() {
    let first = common::default_compiler().convert(common::SIMPLE_EXPORT_JSON);
    let second = common::default_compiler().convert(common::SIMPLE_EXPORT_JSON);

    let first = first.result.expect("generation should run");
    let second = second.result.expect("generation should run");
    assert_eq!(first.files, second.files);
    assert_eq!(first.dependency_manifest, second.dependency_manifest);
}

#[test]
fn unsupported_nodes_do_not_block_the_rest() {
    let doc = RawGraphDocument {
        name: "partial".to_string(),
        version: "1".to_string(),
        nodes: vec![
            common::make_node("m1", "chatOpenAI", &[("model", serde_json::json!("gpt-4"))]),
            common::make_node("x1", "mysteryNode", &[]),
        ],
        edges: vec![common::make_edge("m1", "x1")],
    };
    let outcome = common::default_compiler().convert_document(&doc);

    // generation ran, with the failure confined to the opaque node
    assert!(outcome.success);
    assert_eq!(outcome.metrics.supported_nodes, 1);
    assert_eq!(outcome.metrics.unsupported_nodes, 1);
    assert!(outcome.errors.iter().any(|e| e.contains("x1")));

    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);
    assert!(main.content.contains("const chatOpenAI = new ChatOpenAI("));
    assert!(!main.content.contains("mysteryNode"));
    // the only terminal node produced nothing, so there is no entry point
    assert!(
        outcome
            .warnings
            .iter()
            .any(|w| w.contains("no entry point")),
        "warnings: {:?}",
        outcome.warnings
    );
}

#[test]
fn cyclic_flows_are_rejected_before_generation() {
    let outcome = common::default_compiler().convert_document(&common::cyclic_document());

    assert!(!outcome.success);
    assert!(outcome.result.is_none());
    assert!(outcome.errors.iter().any(|e| e.contains("Cycle detected")));
    assert_eq!(outcome.metrics.node_count, 3);
    assert_eq!(outcome.metrics.file_count, 0);
}

#[test]
fn initializations_follow_dependency_order() {
    // the chain is listed first but depends on both of the others
    let doc = RawGraphDocument {
        name: "ordered".to_string(),
        version: "1".to_string(),
        nodes: vec![
            common::make_node(
                "chain",
                "conversationChain",
                &[
                    ("llm", serde_json::json!("{{model.output}}")),
                    ("memory", serde_json::json!("{{mem.output}}")),
                ],
            ),
            common::make_node("model", "chatOpenAI", &[]),
            common::make_node("mem", "bufferMemory", &[]),
        ],
        edges: vec![
            common::make_edge("model", "chain"),
            common::make_edge("mem", "chain"),
        ],
    };
    let outcome = common::default_compiler().convert_document(&doc);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    let model_at = main.content.find("const chatOpenAI = new").expect("model init");
    let mem_at = main.content.find("const bufferMemory = new").expect("memory init");
    let chain_at = main
        .content
        .find("const conversationChain = new")
        .expect("chain init");
    assert!(model_at < chain_at);
    assert!(mem_at < chain_at);
    assert!(main.content.contains("llm: chatOpenAI"));
    assert!(main.content.contains("memory: bufferMemory"));
}

#[test]
fn coverage_is_reported_per_document() {
    let doc = common::coverage_document(7, 3);
    let outcome = common::default_compiler().convert_document(&doc);

    assert!(outcome.success);
    assert_eq!(outcome.metrics.node_count, 10);
    assert_eq!(outcome.metrics.supported_nodes, 7);
    assert_eq!(outcome.metrics.unsupported_nodes, 3);
    assert_eq!(outcome.metrics.coverage_percent, 70);
    assert_eq!(outcome.errors.len(), 3);
}

#[test]
fn wrapped_envelope_converts_end_to_end() {
    let outcome = common::default_compiler().convert(&common::wrapped_export_json());

    assert!(outcome.success);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);
    assert!(main.content.contains("import { ChatOpenAI } from \"@langchain/openai\";"));
    assert!(result.dependency_manifest.contains_key("@langchain/openai"));
}

#[test]
fn unknown_document_version_warns_but_converts() {
    let doc = RawGraphDocument {
        name: "future".to_string(),
        version: "9".to_string(),
        nodes: vec![common::make_node("c1", "calculator", &[])],
        edges: Vec::new(),
    };
    let outcome = common::default_compiler().convert_document(&doc);

    assert!(outcome.success);
    assert!(
        outcome
            .warnings
            .iter()
            .any(|w| w.contains("document version '9'")),
        "warnings: {:?}",
        outcome.warnings
    );
}

#[test]
fn references_to_missing_nodes_fall_back_to_literals() {
    let doc = RawGraphDocument {
        name: "ghost-ref".to_string(),
        version: "1".to_string(),
        nodes: vec![common::make_node(
            "chain1",
            "llmChain",
            &[("llm", serde_json::json!("{{ghost.output}}"))],
        )],
        edges: Vec::new(),
    };
    let outcome = common::default_compiler().convert_document(&doc);

    assert!(outcome.success);
    assert!(
        outcome
            .warnings
            .iter()
            .any(|w| w.contains("{{ghost.output}}")),
        "warnings: {:?}",
        outcome.warnings
    );
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);
    // the unresolvable template survives as a plain string literal
    assert!(main.content.contains("llm: \"{{ghost.output}}\""));
}

#[test]
fn dangling_edges_are_dropped_with_a_warning() {
    let doc = RawGraphDocument {
        name: "dangling".to_string(),
        version: "1".to_string(),
        nodes: vec![common::make_node("c1", "calculator", &[])],
        edges: vec![common::make_edge("c1", "nowhere")],
    };
    let outcome = common::default_compiler().convert_document(&doc);

    assert!(outcome.success);
    assert_eq!(outcome.metrics.connection_count, 0);
    assert!(
        outcome.warnings.iter().any(|w| w.contains("was dropped")),
        "warnings: {:?}",
        outcome.warnings
    );
}

#[test]
fn incompatible_port_types_fail_validation() {
    let mut source = common::make_node("m1", "chatOpenAI", &[]);
    source.output_ports = vec![PortSpec::new("output", &["ChatOpenAI", "BaseChatModel"], false)];
    let mut target = common::make_node("mem1", "bufferMemory", &[]);
    target.input_ports = vec![PortSpec::new("memory", &["BaseMemory"], false)];

    let doc = RawGraphDocument {
        name: "mismatched".to_string(),
        version: "1".to_string(),
        nodes: vec![source, target],
        edges: vec![RawEdge {
            source: "m1".to_string(),
            source_port: "output".to_string(),
            target: "mem1".to_string(),
            target_port: "memory".to_string(),
        }],
    };
    let outcome = common::default_compiler().convert_document(&doc);

    assert!(!outcome.success);
    assert!(outcome.result.is_none());
    assert!(
        outcome.errors.iter().any(|e| e.contains("no common type")),
        "errors: {:?}",
        outcome.errors
    );
}

#[test]
fn uncovered_required_inputs_fail_validation() {
    let mut chain = common::make_node("chain1", "llmChain", &[]);
    chain.input_ports = vec![PortSpec::new("llm", &["BaseLanguageModel"], true)];

    let doc = RawGraphDocument {
        name: "uncovered".to_string(),
        version: "1".to_string(),
        nodes: vec![chain.clone()],
        edges: Vec::new(),
    };
    let outcome = common::default_compiler().convert_document(&doc);
    assert!(!outcome.success);
    assert!(
        outcome
            .errors
            .iter()
            .any(|e| e.contains("missing required input 'llm'")),
        "errors: {:?}",
        outcome.errors
    );

    // an incoming connection on that port satisfies the requirement
    let doc = RawGraphDocument {
        name: "covered".to_string(),
        version: "1".to_string(),
        nodes: vec![common::make_node("m1", "chatOpenAI", &[]), chain],
        edges: vec![RawEdge {
            source: "m1".to_string(),
            source_port: "output".to_string(),
            target: "chain1".to_string(),
            target_port: "llm".to_string(),
        }],
    };
    let report = common::default_compiler().validate_document(&doc);
    assert!(report.is_valid, "errors: {:?}", report.errors);
}

#[test]
fn disconnected_nodes_warn_without_blocking() {
    let doc = RawGraphDocument {
        name: "islands".to_string(),
        version: "1".to_string(),
        nodes: vec![
            common::make_node("m1", "chatOpenAI", &[]),
            common::make_node("chain1", "llmChain", &[]),
            common::make_node("island1", "calculator", &[]),
        ],
        edges: vec![common::make_edge("m1", "chain1")],
    };
    let report = common::default_compiler().validate_document(&doc);

    assert!(report.is_valid);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("'island1'") && w.contains("no incoming or outgoing")),
        "warnings: {:?}",
        report.warnings
    );
    assert!(!report.warnings.iter().any(|w| w.contains("'m1'")));
}

#[test]
fn validate_only_reports_without_generating() {
    let compiler = common::default_compiler();

    let report = compiler
        .validate_only(common::SIMPLE_EXPORT_JSON)
        .expect("input parses");
    assert!(report.is_valid);
    assert_eq!(report.analysis.node_count, 2);
    assert_eq!(report.analysis.coverage_percent, 100);
    assert!(report.analysis.unsupported_types.is_empty());

    let report = compiler.validate_document(&common::cyclic_document());
    assert!(!report.is_valid);
    assert!(report.errors.iter().any(|e| e.contains("Cycle detected")));
}

#[test]
fn custom_converters_extend_the_registry() {
    use flowgen::codegen::EmitContext;

    struct EchoConverter;
    impl NodeConverter for EchoConverter {
        fn converter_key(&self) -> &str {
            "echoTool"
        }
        fn category(&self) -> &str {
            "Tools"
        }
        fn dependencies(&self) -> Vec<PackageSpec> {
            Vec::new()
        }
        fn convert(
            &self,
            node: &IRNode,
            ctx: &EmitContext<'_>,
        ) -> std::result::Result<Vec<CodeFragment>, ConvertError> {
            let var = ctx.var_name(&node.id);
            Ok(vec![CodeFragment::initialization(
                &node.id,
                format!("const {var} = (input) => input;"),
            )])
        }
    }

    let compiler = FlowCompiler::builder()
        .with_converter(Arc::new(EchoConverter))
        .build()
        .expect("registration succeeds");

    let doc = RawGraphDocument {
        name: "custom".to_string(),
        version: "1".to_string(),
        nodes: vec![common::make_node("e1", "echoTool", &[])],
        edges: Vec::new(),
    };
    let outcome = compiler.convert_document(&doc);
    assert!(outcome.success);
    assert!(outcome.errors.is_empty());
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);
    assert!(main.content.contains("const echoTool = (input) => input;"));
}
