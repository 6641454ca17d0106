use crate::codegen::context::{GenerationContext, TargetFormat};
use crate::codegen::fragment::{CodeFragment, FileKind, FragmentKind, GeneratedFile};
use crate::codegen::names::NameAllocator;
use crate::ir::IRGraph;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// Merges all emitted fragments into the final in-memory file set.
///
/// Inherently sequential: it depends on the global topological order and the
/// shared name allocator, so parallel dispatch must funnel into this single
/// deterministic pass.
pub(crate) fn assemble(
    graph: &IRGraph,
    order: &[String],
    fragments: &[CodeFragment],
    produced: &AHashSet<String>,
    context: &GenerationContext,
    names: &NameAllocator,
    manifest: &BTreeMap<String, String>,
) -> (Vec<GeneratedFile>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut files = Vec::new();

    let owner_index: AHashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    let mut main = String::new();
    main.push_str(&format!(
        "// Generated by flowgen from flow {}. Do not edit by hand.\n\n",
        context.quote(&graph.name)
    ));

    let imports = render_imports(fragments, context);
    if !imports.is_empty() {
        main.push_str(&imports);
        main.push('\n');
    }

    for kind in [FragmentKind::Declaration, FragmentKind::Initialization] {
        let section = render_section(fragments, &kind, &owner_index);
        if !section.is_empty() {
            main.push_str(&section);
            main.push('\n');
        }
    }

    // Terminal nodes that actually produced code become the externally
    // invocable surface; the first in topological order is the entry point.
    let consumed = graph.ids_with_outgoing();
    let terminals: Vec<&str> = order
        .iter()
        .map(String::as_str)
        .filter(|id| produced.contains(*id))
        .filter(|id| !consumed.contains(id))
        .collect();

    match terminals.first() {
        Some(entry) => {
            main.push_str(&render_entry_point(entry, &terminals, context, names));
        }
        None => warnings
            .push("Flow has no convertible terminal node; no entry point was emitted".to_string()),
    }

    for fragment in fragments
        .iter()
        .filter(|f| f.kind == FragmentKind::Export)
        .sorted_by_key(|f| {
            (
                owner_index.get(f.owner_node_id.as_str()).copied(),
                f.ordering_key.clone(),
            )
        })
    {
        main.push('\n');
        main.push_str(&fragment.content);
        main.push('\n');
    }

    files.push(GeneratedFile {
        path: format!("index.{}", context.target.extension()),
        content: main,
        kind: FileKind::Implementation,
    });

    if context.target == TargetFormat::TypeScript {
        files.push(GeneratedFile {
            path: "types.ts".to_string(),
            content: render_types(),
            kind: FileKind::Types,
        });
    }

    if context.flags.include_tests {
        files.push(GeneratedFile {
            path: format!("index.test.{}", context.target.extension()),
            content: render_tests(graph, context),
            kind: FileKind::Tests,
        });
    }

    if context.flags.include_docs {
        files.push(GeneratedFile {
            path: "README.md".to_string(),
            content: render_docs(graph, order, names, manifest),
            kind: FileKind::Docs,
        });
    }

    (files, warnings)
}

/// One import statement per module specifier, symbols unioned and sorted,
/// modules sorted, for deterministic output.
fn render_imports(fragments: &[CodeFragment], context: &GenerationContext) -> String {
    let mut modules: BTreeMap<&str, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
    for fragment in fragments {
        let FragmentKind::Import(spec) = &fragment.kind else {
            continue;
        };
        let (symbols, defaults) = modules.entry(spec.module.as_str()).or_default();
        symbols.extend(spec.symbols.iter().map(String::as_str));
        if let Some(default) = &spec.default_symbol {
            defaults.insert(default.as_str());
        }
    }

    let mut out = String::new();
    for (module, (symbols, defaults)) in &modules {
        let mut clauses = Vec::new();
        // One import statement allows a single default clause; when several
        // fragments claim a default for the same module, the first
        // (alphabetically) keeps the slot and the rest join the named set so
        // every referenced identifier stays declared.
        let mut named = symbols.clone();
        let mut defaults = defaults.iter().copied();
        if let Some(default) = defaults.next() {
            clauses.push(default.to_string());
            named.extend(defaults);
        }
        if !named.is_empty() {
            clauses.push(format!("{{ {} }}", named.iter().join(", ")));
        }
        out.push_str(&format!(
            "import {} from {};\n",
            clauses.join(", "),
            context.quote(module)
        ));
    }
    out
}

/// Fragments of one kind, in dependency order with the ordering key as the
/// deterministic tie-break.
fn render_section(
    fragments: &[CodeFragment],
    kind: &FragmentKind,
    owner_index: &AHashMap<&str, usize>,
) -> String {
    let mut out = String::new();
    for fragment in fragments
        .iter()
        .filter(|f| f.kind == *kind)
        .sorted_by_key(|f| {
            (
                owner_index
                    .get(f.owner_node_id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX),
                f.ordering_key.clone(),
            )
        })
    {
        out.push_str(&fragment.content);
        out.push_str("\n\n");
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn render_entry_point(
    entry: &str,
    terminals: &[&str],
    context: &GenerationContext,
    names: &NameAllocator,
) -> String {
    let entry_var = names.get(entry);
    let fn_name = &context.entry_name;
    let indent = context.indent(1);
    let (param, ret) = match context.target {
        TargetFormat::TypeScript => (": string", ": Promise<unknown>"),
        TargetFormat::JavaScript => ("", ""),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "export async function {fn_name}(input{param}){ret} {{\n"
    ));
    if context.flags.include_observability {
        out.push_str(&format!(
            "{indent}console.time({});\n",
            context.quote(fn_name)
        ));
    }
    out.push_str(&format!(
        "{indent}const output = await {entry_var}.invoke({{ input }});\n"
    ));
    if context.flags.include_observability {
        out.push_str(&format!(
            "{indent}console.timeEnd({});\n",
            context.quote(fn_name)
        ));
    }
    out.push_str(&format!("{indent}return output;\n}}\n"));

    let exported = terminals.iter().map(|id| names.get(id)).unique().join(", ");
    out.push_str(&format!("\nexport {{ {exported} }};\n"));
    out
}

fn render_types() -> String {
    "// Shared type surface for the generated flow.\n\n\
     export interface FlowInput {\n  input: string;\n}\n\n\
     export type FlowOutput = unknown;\n"
        .to_string()
}

fn render_tests(graph: &IRGraph, context: &GenerationContext) -> String {
    let entry = &context.entry_name;
    format!(
        "import {{ {entry} }} from {};\n\n\
         test({}, async () => {{\n\
         {indent}const output = await {entry}({});\n\
         {indent}expect(output).toBeDefined();\n\
         }});\n",
        context.quote("./index"),
        context.quote(&format!("{} produces output", graph.name)),
        context.quote("Hello"),
        indent = context.indent(1),
    )
}

fn render_docs(
    graph: &IRGraph,
    order: &[String],
    names: &NameAllocator,
    manifest: &BTreeMap<String, String>,
) -> String {
    let mut out = format!("# {}\n\nGenerated by flowgen. Do not edit by hand.\n\n", graph.name);

    out.push_str("## Nodes\n\n| Variable | Type | Label |\n| --- | --- | --- |\n");
    for id in order {
        if let Some(node) = graph.node(id) {
            out.push_str(&format!(
                "| `{}` | `{}` | {} |\n",
                names.get(id),
                node.type_key,
                node.label
            ));
        }
    }

    if !manifest.is_empty() {
        out.push_str("\n## Dependencies\n\n");
        for (package, version) in manifest {
            out.push_str(&format!("- `{package}@{version}`\n"));
        }
    }
    out
}
