//! Tests for fragment assembly, style options, and the emit helpers.
mod common;

use flowgen::codegen::{EmitContext, NameAllocator};
use flowgen::ir::IRValue;
use flowgen::prelude::*;
use pretty_assertions::assert_eq;

fn emit_fixture() -> (GenerationContext, NameAllocator) {
    let mut names = NameAllocator::new();
    names.allocate("llm1", "My Model");
    (GenerationContext::default(), names)
}

#[test]
fn value_expr_renders_literals_and_refs() {
    let (context, names) = emit_fixture();
    let ctx = EmitContext::new(&context, &names);

    assert_eq!(
        ctx.value_expr(&IRValue::Literal(serde_json::json!("gpt-4"))),
        "\"gpt-4\""
    );
    assert_eq!(ctx.value_expr(&IRValue::Literal(serde_json::json!(0.7))), "0.7");
    assert_eq!(ctx.value_expr(&IRValue::Literal(serde_json::json!(true))), "true");
    assert_eq!(
        ctx.value_expr(&IRValue::Literal(serde_json::json!(["a", "b"]))),
        "[\"a\", \"b\"]"
    );
    assert_eq!(
        ctx.value_expr(&IRValue::PortRef {
            node_id: "llm1".to_string(),
            port: "output".to_string(),
        }),
        "myModel"
    );
}

#[test]
fn quote_style_is_respected() {
    let (mut context, names) = emit_fixture();
    context.quotes = QuoteStyle::Single;
    let ctx = EmitContext::new(&context, &names);

    assert_eq!(
        ctx.value_expr(&IRValue::Literal(serde_json::json!("it's"))),
        "'it\\'s'"
    );
}

#[test]
fn object_literal_honors_trailing_comma_setting() {
    let (mut context, names) = emit_fixture();
    context.trailing_commas = false;
    let ctx = EmitContext::new(&context, &names);

    let rendered = ctx.object_literal(&[
        ("model".to_string(), "\"gpt-4\"".to_string()),
        ("temperature".to_string(), "0".to_string()),
    ]);
    assert_eq!(rendered, "{\n  model: \"gpt-4\",\n  temperature: 0\n}");

    context.trailing_commas = true;
    let ctx = EmitContext::new(&context, &names);
    let rendered = ctx.object_literal(&[("model".to_string(), "\"gpt-4\"".to_string())]);
    assert_eq!(rendered, "{\n  model: \"gpt-4\",\n}");
}

#[test]
fn imports_are_merged_per_module_and_sorted() {
    // chatOpenAI and openAIEmbeddings both import from "@langchain/openai";
    // the assembled file must contain exactly one import for that module
    // with the union of both symbol sets.
    let doc = RawGraphDocument {
        name: "imports".to_string(),
        version: "1".to_string(),
        nodes: vec![
            common::make_node("e1", "openAIEmbeddings", &[]),
            common::make_node("m1", "chatOpenAI", &[]),
        ],
        edges: Vec::new(),
    };
    let outcome = common::default_compiler().convert_document(&doc);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    let import_lines: Vec<&str> = main
        .content
        .lines()
        .filter(|l| l.starts_with("import "))
        .collect();
    assert_eq!(
        import_lines,
        vec![r#"import { ChatOpenAI, OpenAIEmbeddings } from "@langchain/openai";"#]
    );
}

#[test]
fn competing_default_imports_share_one_statement() {
    // Two converters each claim the default import slot of the same module.
    // Only one default clause is legal per statement, so the loser must move
    // into the named set instead of being dropped with its identifier still
    // referenced by an initialization.
    struct AlphaConverter;
    impl NodeConverter for AlphaConverter {
        fn converter_key(&self) -> &str {
            "alphaTool"
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
            Ok(vec![
                CodeFragment::import(&node.id, ImportSpec::default_import("helper-lib", "alpha")),
                CodeFragment::initialization(&node.id, format!("const {var} = alpha();")),
            ])
        }
    }

    struct BetaConverter;
    impl NodeConverter for BetaConverter {
        fn converter_key(&self) -> &str {
            "betaTool"
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
            Ok(vec![
                CodeFragment::import(&node.id, ImportSpec::default_import("helper-lib", "beta")),
                CodeFragment::initialization(&node.id, format!("const {var} = beta();")),
            ])
        }
    }

    let compiler = FlowCompiler::builder()
        .with_converter(Arc::new(AlphaConverter))
        .with_converter(Arc::new(BetaConverter))
        .build()
        .expect("registration succeeds");

    let doc = RawGraphDocument {
        name: "defaults".to_string(),
        version: "1".to_string(),
        nodes: vec![
            common::make_node("a1", "alphaTool", &[]),
            common::make_node("b1", "betaTool", &[]),
        ],
        edges: Vec::new(),
    };
    let outcome = compiler.convert_document(&doc);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    let import_lines: Vec<&str> = main
        .content
        .lines()
        .filter(|l| l.starts_with("import "))
        .collect();
    assert_eq!(
        import_lines,
        vec![r#"import alpha, { beta } from "helper-lib";"#]
    );
    assert!(main.content.contains("const alphaTool = alpha();"));
    assert!(main.content.contains("const betaTool = beta();"));
}

#[test]
fn entry_point_wires_the_terminal_node() {
    let outcome = common::default_compiler().convert(common::SIMPLE_EXPORT_JSON);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    assert!(main.content.contains("export async function run(input: string)"));
    // chain1 is the only terminal node; its variable is invoked and exported
    assert!(main.content.contains("await qaChain.invoke({ input })"));
    assert!(main.content.contains("export { qaChain };"));
}

#[test]
fn javascript_target_drops_type_annotations() {
    let context = GenerationContext {
        target: TargetFormat::JavaScript,
        ..GenerationContext::default()
    };
    let compiler = FlowCompiler::builder()
        .with_context(context)
        .build()
        .expect("builder");

    let outcome = compiler.convert(common::SIMPLE_EXPORT_JSON);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    assert_eq!(main.path, "index.js");
    assert!(main.content.contains("export async function run(input)"));
    assert!(!main.content.contains(": Promise<"));
    // no separate type declarations for JavaScript output
    assert!(result.files.iter().all(|f| f.kind != FileKind::Types));
}

#[test]
fn feature_flags_gate_optional_files() {
    let context = GenerationContext {
        flags: FeatureFlags {
            include_tests: true,
            include_docs: true,
            include_observability: false,
        },
        ..GenerationContext::default()
    };
    let compiler = FlowCompiler::builder()
        .with_context(context)
        .build()
        .expect("builder");

    let outcome = compiler.convert(common::SIMPLE_EXPORT_JSON);
    let result = outcome.result.expect("generation should run");

    let tests = result
        .files
        .iter()
        .find(|f| f.kind == FileKind::Tests)
        .expect("tests file");
    assert_eq!(tests.path, "index.test.ts");
    assert!(tests.content.contains("import { run } from \"./index\";"));

    let docs = result
        .files
        .iter()
        .find(|f| f.kind == FileKind::Docs)
        .expect("docs file");
    assert!(docs.content.contains("# simple-qa"));
    assert!(docs.content.contains("`chatModel`"));

    // default flags emit neither
    let bare = common::default_compiler().convert(common::SIMPLE_EXPORT_JSON);
    let bare = bare.result.expect("generation should run");
    assert!(bare.files.iter().all(|f| f.kind != FileKind::Tests));
    assert!(bare.files.iter().all(|f| f.kind != FileKind::Docs));
}

#[test]
fn observability_flag_threads_verbose_through_constructors() {
    let context = GenerationContext {
        flags: FeatureFlags {
            include_observability: true,
            ..FeatureFlags::default()
        },
        ..GenerationContext::default()
    };
    let compiler = FlowCompiler::builder()
        .with_context(context)
        .build()
        .expect("builder");

    let outcome = compiler.convert(common::SIMPLE_EXPORT_JSON);
    let result = outcome.result.expect("generation should run");
    let main = common::implementation_of(&result);

    assert!(main.content.contains("verbose: true"));
    assert!(main.content.contains("console.time"));
}
