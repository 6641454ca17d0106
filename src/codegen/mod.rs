pub mod assembler;
pub mod context;
pub mod fragment;
pub mod names;

pub use context::*;
pub use fragment::*;
pub use names::*;

use crate::error::GenerationError;
use crate::ir::IRGraph;
use crate::registry::TypeRegistry;
use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Diagnostics accumulated during dispatch and assembly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub errors: Vec<GenerationError>,
    pub warnings: Vec<String>,
}

/// The in-memory output of one conversion: logical files, the union of the
/// invoked converters' package requirements, and per-node diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CodeGenerationResult {
    pub files: Vec<GeneratedFile>,
    pub dependency_manifest: BTreeMap<String, String>,
    pub diagnostics: Diagnostics,
}

/// Dispatches every node in `order` to its converter and assembles the
/// fragments into the final file set.
///
/// Partial success is a first-class outcome: an opaque node or a failing
/// converter is recorded in the diagnostics and the run continues with the
/// remaining nodes. The dependency manifest only collects packages from
/// converters that actually emitted code, so unused providers never bloat it.
pub fn generate(
    graph: &IRGraph,
    order: &[String],
    registry: &TypeRegistry,
    context: &GenerationContext,
) -> CodeGenerationResult {
    // Names are allocated up front, in emission order, so dispatch is a pure
    // read and a node's converter can name its dependencies' variables.
    let mut names = NameAllocator::new();
    for id in order {
        if let Some(node) = graph.node(id) {
            let hint = if node.label.is_empty() {
                &node.type_key
            } else {
                &node.label
            };
            names.allocate(id, hint);
        }
    }

    let emit = EmitContext::new(context, &names);
    let mut fragments = Vec::new();
    let mut errors = Vec::new();
    let mut manifest = BTreeMap::new();
    let mut produced: AHashSet<String> = AHashSet::new();

    for id in order {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let Some(converter) = node
            .converter_key
            .as_deref()
            .and_then(|key| registry.resolve(key))
        else {
            errors.push(GenerationError::UnsupportedNode {
                node_id: node.id.clone(),
                type_key: node.type_key.clone(),
            });
            continue;
        };

        match converter.convert(node, &emit) {
            Ok(emitted) => {
                for package in converter.dependencies() {
                    manifest.insert(package.name, package.version);
                }
                produced.insert(node.id.clone());
                fragments.extend(emitted);
            }
            Err(err) => {
                warn!(node = %node.id, error = %err, "converter failed");
                errors.push(GenerationError::ConverterFailed {
                    node_id: node.id.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    let (files, warnings) =
        assembler::assemble(graph, order, &fragments, &produced, context, &names, &manifest);

    debug!(
        files = files.len(),
        fragments = fragments.len(),
        errors = errors.len(),
        "generated code"
    );

    CodeGenerationResult {
        files,
        dependency_manifest: manifest,
        diagnostics: Diagnostics { errors, warnings },
    }
}
