use crate::codegen::context::EmitContext;
use crate::codegen::fragment::{CodeFragment, ImportSpec};
use crate::error::ConvertError;
use crate::ir::{IRNode, IRValue};
use crate::registry::converter::{ConverterHandle, NodeConverter, PackageSpec};
use crate::registry::TypeRegistry;
use std::sync::Arc;

/// Registers the built-in converter set. The set is statically known and its
/// keys are unique by construction, so registration cannot actually fail.
pub(crate) fn register_builtin_converters(registry: &mut TypeRegistry) {
    for converter in builtin_set() {
        if let Err(err) = registry.register(converter) {
            debug_assert!(false, "built-in converter key collision: {err}");
        }
    }
}

fn builtin_set() -> Vec<ConverterHandle> {
    let mut set = constructor_converters();
    set.push(Arc::new(PromptTemplateConverter));
    set.push(Arc::new(ChatPromptTemplateConverter));
    set.push(Arc::new(RetrievalQaChainConverter));
    set.push(Arc::new(MemoryVectorStoreConverter));
    set
}

/// Values the authoring tool writes for fields the user left blank; these
/// must not turn into constructor arguments.
fn is_blank(value: &IRValue) -> bool {
    matches!(value, IRValue::Literal(v) if v.is_null() || v.as_str() == Some(""))
}

/// The common "import the class, construct it from the resolved inputs"
/// recipe shared by most provider node types.
fn constructor_fragments(
    node: &IRNode,
    ctx: &EmitContext<'_>,
    class: &str,
    module: &str,
) -> Vec<CodeFragment> {
    let mut fields: Vec<(String, String)> = node
        .resolved_inputs
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(key, value)| (key.clone(), ctx.value_expr(value)))
        .collect();
    if ctx.context.flags.include_observability {
        fields.push(("verbose".to_string(), "true".to_string()));
    }

    let var = ctx.var_name(&node.id);
    let init = if fields.is_empty() {
        format!("const {var} = new {class}();")
    } else {
        format!("const {var} = new {class}({});", ctx.object_literal(&fields))
    };

    vec![
        CodeFragment::import(&node.id, ImportSpec::named(module, &[class])),
        CodeFragment::initialization(&node.id, init),
    ]
}

fn require_input<'a>(node: &'a IRNode, input: &str) -> Result<&'a IRValue, ConvertError> {
    node.resolved_inputs
        .get(input)
        .filter(|value| !is_blank(value))
        .ok_or_else(|| ConvertError::MissingInput {
            node_id: node.id.clone(),
            input: input.to_string(),
        })
}

/// Defines the standard constructor-call converters: struct, trait impl, and
/// the collected handle list.
macro_rules! define_constructor_converters {
    ( $( ($struct_name:ident, $key:expr, $category:expr, $class:expr, $module:expr,
          $package:expr, $pkg_version:expr, [$($alias:expr),*]) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl NodeConverter for $struct_name {
                fn converter_key(&self) -> &str { $key }
                fn category(&self) -> &str { $category }
                fn aliases(&self) -> &[&str] { &[$($alias),*] }
                fn dependencies(&self) -> Vec<PackageSpec> {
                    vec![PackageSpec::new($package, $pkg_version)]
                }
                fn convert(
                    &self,
                    node: &IRNode,
                    ctx: &EmitContext<'_>,
                ) -> Result<Vec<CodeFragment>, ConvertError> {
                    Ok(constructor_fragments(node, ctx, $class, $module))
                }
            }
        )*

        fn constructor_converters() -> Vec<ConverterHandle> {
            vec![ $( Arc::new($struct_name), )* ]
        }
    };
}

define_constructor_converters! {
    (ChatOpenAiConverter, "chatOpenAI", "Chat Models", "ChatOpenAI",
     "@langchain/openai", "@langchain/openai", "^0.3.0", ["chatModel"]),
    (ChatAnthropicConverter, "chatAnthropic", "Chat Models", "ChatAnthropic",
     "@langchain/anthropic", "@langchain/anthropic", "^0.3.0", []),
    (OpenAiConverter, "openAI", "LLMs", "OpenAI",
     "@langchain/openai", "@langchain/openai", "^0.3.0", ["llm"]),
    (LlmChainConverter, "llmChain", "Chains", "LLMChain",
     "langchain/chains", "langchain", "^0.3.0", []),
    (ConversationChainConverter, "conversationChain", "Chains", "ConversationChain",
     "langchain/chains", "langchain", "^0.3.0", []),
    (BufferMemoryConverter, "bufferMemory", "Memory", "BufferMemory",
     "langchain/memory", "langchain", "^0.3.0", []),
    (OpenAiEmbeddingsConverter, "openAIEmbeddings", "Embeddings", "OpenAIEmbeddings",
     "@langchain/openai", "@langchain/openai", "^0.3.0", ["embeddings"]),
    (CalculatorConverter, "calculator", "Tools", "Calculator",
     "@langchain/community/tools/calculator", "@langchain/community", "^0.3.0", []),
    (SerpApiConverter, "serpAPI", "Tools", "SerpAPI",
     "@langchain/community/tools/serpapi", "@langchain/community", "^0.3.0", ["serpApi"]),
    (StructuredOutputParserConverter, "structuredOutputParser", "Output Parsers",
     "StructuredOutputParser", "langchain/output_parsers", "langchain", "^0.3.0", []),
}

// --- Composite recipes that do not fit the constructor pattern ---

struct PromptTemplateConverter;

impl NodeConverter for PromptTemplateConverter {
    fn converter_key(&self) -> &str {
        "promptTemplate"
    }
    fn category(&self) -> &str {
        "Prompts"
    }
    fn aliases(&self) -> &[&str] {
        &["prompt"]
    }
    fn dependencies(&self) -> Vec<PackageSpec> {
        vec![PackageSpec::new("@langchain/core", "^0.3.0")]
    }
    fn convert(
        &self,
        node: &IRNode,
        ctx: &EmitContext<'_>,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let template = require_input(node, "template")?;
        let var = ctx.var_name(&node.id);
        let init = format!(
            "const {var} = PromptTemplate.fromTemplate({});",
            ctx.value_expr(template)
        );
        Ok(vec![
            CodeFragment::import(
                &node.id,
                ImportSpec::named("@langchain/core/prompts", &["PromptTemplate"]),
            ),
            CodeFragment::initialization(&node.id, init),
        ])
    }
}

struct ChatPromptTemplateConverter;

impl NodeConverter for ChatPromptTemplateConverter {
    fn converter_key(&self) -> &str {
        "chatPromptTemplate"
    }
    fn category(&self) -> &str {
        "Prompts"
    }
    fn dependencies(&self) -> Vec<PackageSpec> {
        vec![PackageSpec::new("@langchain/core", "^0.3.0")]
    }
    fn convert(
        &self,
        node: &IRNode,
        ctx: &EmitContext<'_>,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let system = require_input(node, "systemMessagePrompt")?;
        let human = node
            .resolved_inputs
            .get("humanMessagePrompt")
            .filter(|v| !is_blank(v))
            .map(|v| ctx.value_expr(v))
            .unwrap_or_else(|| ctx.context.quote("{input}"));

        let indent = ctx.context.indent(1);
        let var = ctx.var_name(&node.id);
        let init = format!(
            "const {var} = ChatPromptTemplate.fromMessages([\n{indent}[{}, {}],\n{indent}[{}, {}],\n]);",
            ctx.context.quote("system"),
            ctx.value_expr(system),
            ctx.context.quote("human"),
            human,
        );
        Ok(vec![
            CodeFragment::import(
                &node.id,
                ImportSpec::named("@langchain/core/prompts", &["ChatPromptTemplate"]),
            ),
            CodeFragment::initialization(&node.id, init),
        ])
    }
}

struct RetrievalQaChainConverter;

impl NodeConverter for RetrievalQaChainConverter {
    fn converter_key(&self) -> &str {
        "retrievalQAChain"
    }
    fn category(&self) -> &str {
        "Chains"
    }
    fn aliases(&self) -> &[&str] {
        &["qaChain"]
    }
    fn dependencies(&self) -> Vec<PackageSpec> {
        vec![PackageSpec::new("langchain", "^0.3.0")]
    }
    fn convert(
        &self,
        node: &IRNode,
        ctx: &EmitContext<'_>,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let model = ctx.value_expr(require_input(node, "model")?);
        let var = ctx.var_name(&node.id);

        // The retriever input comes in three historical spellings; a bare
        // vector store still needs the `.asRetriever()` adapter.
        let retriever = ["vectorStoreRetriever", "retriever"]
            .iter()
            .find_map(|key| node.resolved_inputs.get(*key).filter(|v| !is_blank(v)))
            .map(|v| ctx.value_expr(v))
            .or_else(|| {
                node.resolved_inputs
                    .get("vectorStore")
                    .filter(|v| !is_blank(v))
                    .map(|v| format!("{}.asRetriever()", ctx.value_expr(v)))
            });

        match retriever {
            Some(retriever) => {
                let init =
                    format!("const {var} = RetrievalQAChain.fromLLM({model}, {retriever});");
                Ok(vec![
                    CodeFragment::import(
                        &node.id,
                        ImportSpec::named("langchain/chains", &["RetrievalQAChain"]),
                    ),
                    CodeFragment::initialization(&node.id, init),
                ])
            }
            None => {
                // No retrieval source wired in: degrade to a plain stuff
                // chain over the model so the flow stays runnable.
                let init = format!(
                    "const {var} = new RetrievalQAChain({});",
                    ctx.object_literal(&[(
                        "combineDocumentsChain".to_string(),
                        format!("loadQAStuffChain({model})"),
                    )])
                );
                Ok(vec![
                    CodeFragment::import(
                        &node.id,
                        ImportSpec::named(
                            "langchain/chains",
                            &["RetrievalQAChain", "loadQAStuffChain"],
                        ),
                    ),
                    CodeFragment::initialization(&node.id, init),
                ])
            }
        }
    }
}

struct MemoryVectorStoreConverter;

impl NodeConverter for MemoryVectorStoreConverter {
    fn converter_key(&self) -> &str {
        "memoryVectorStore"
    }
    fn category(&self) -> &str {
        "Vector Stores"
    }
    fn dependencies(&self) -> Vec<PackageSpec> {
        vec![PackageSpec::new("langchain", "^0.3.0")]
    }
    fn convert(
        &self,
        node: &IRNode,
        ctx: &EmitContext<'_>,
    ) -> Result<Vec<CodeFragment>, ConvertError> {
        let embeddings = ctx.value_expr(require_input(node, "embeddings")?);
        let var = ctx.var_name(&node.id);
        let init = format!("const {var} = new MemoryVectorStore({embeddings});");
        Ok(vec![
            CodeFragment::import(
                &node.id,
                ImportSpec::named("langchain/vectorstores/memory", &["MemoryVectorStore"]),
            ),
            CodeFragment::initialization(&node.id, init),
        ])
    }
}
