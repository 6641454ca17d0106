use crate::codegen::{self, CodeGenerationResult, GenerationContext};
use crate::error::{ParseError, RegistrationError};
use crate::graph::{self, RawGraphDocument};
use crate::ir::{self, IRGraph};
use crate::order;
use crate::registry::{Capabilities, ConverterHandle, RegistryStatistics, TypeRegistry};
use crate::validate::{self, ValidationResult};
use itertools::Itertools;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Parses raw export text into the canonical document. Exposed standalone so
/// callers holding pre-parsed documents can skip straight to [`FlowCompiler`].
pub fn parse_graph(input: &str) -> Result<RawGraphDocument, ParseError> {
    graph::parse(input)
}

/// Byte-buffer variant of [`parse_graph`]: decodes UTF-16 (by BOM) or lossy
/// UTF-8 before parsing, for callers holding raw file or request bodies.
pub fn parse_graph_bytes(input: &[u8]) -> Result<RawGraphDocument, ParseError> {
    graph::parse_bytes(input)
}

/// The top-level conversion facade: registry + generation context, built
/// once and reusable across any number of documents. The registry is never
/// mutated after construction, so a `FlowCompiler` can be shared across
/// threads for concurrent conversions.
pub struct FlowCompiler {
    registry: TypeRegistry,
    context: GenerationContext,
}

pub struct FlowCompilerBuilder {
    registry: TypeRegistry,
    context: GenerationContext,
    registration_error: Option<RegistrationError>,
}

impl FlowCompilerBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::with_builtins(),
            context: GenerationContext::default(),
            registration_error: None,
        }
    }

    /// Starts from an empty registry instead of the built-in set.
    pub fn without_builtins(mut self) -> Self {
        self.registry = TypeRegistry::new();
        self
    }

    pub fn with_context(mut self, context: GenerationContext) -> Self {
        self.context = context;
        self
    }

    /// Registers an additional converter. Key conflicts surface when the
    /// builder is finished, keeping the chained style usable.
    pub fn with_converter(mut self, converter: ConverterHandle) -> Self {
        if self.registration_error.is_none() {
            self.registration_error = self.registry.register(converter).err();
        }
        self
    }

    pub fn build(self) -> Result<FlowCompiler, RegistrationError> {
        if let Some(err) = self.registration_error {
            return Err(err);
        }
        Ok(FlowCompiler {
            registry: self.registry,
            context: self.context,
        })
    }
}

impl Default for FlowCompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-run measurements reported alongside every conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionMetrics {
    pub node_count: usize,
    pub connection_count: usize,
    pub supported_nodes: usize,
    pub unsupported_nodes: usize,
    pub coverage_percent: u32,
    pub file_count: usize,
    pub duration_ms: u64,
}

/// What `convert` hands back to external callers (CLI, API server, UI).
///
/// `success` means the pipeline reached code generation; per-node generation
/// failures are reported through `errors` and the result's diagnostics
/// without flipping it, because partial output is still useful output.
#[derive(Debug, Serialize)]
pub struct ConversionOutcome {
    pub success: bool,
    pub result: Option<CodeGenerationResult>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metrics: ConversionMetrics,
}

/// Pre-flight analysis for `validate_only`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphAnalysis {
    pub node_count: usize,
    pub connection_count: usize,
    pub supported_types: Vec<String>,
    pub unsupported_types: Vec<String>,
    pub coverage_percent: u32,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub analysis: GraphAnalysis,
}

impl FlowCompiler {
    pub fn builder() -> FlowCompilerBuilder {
        FlowCompilerBuilder::new()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    /// Runs the whole pipeline on raw export text. Parse failures are fatal;
    /// everything downstream follows [`FlowCompiler::convert_document`].
    pub fn convert(&self, input: &str) -> ConversionOutcome {
        match parse_graph(input) {
            Ok(document) => self.convert_document(&document),
            Err(err) => ConversionOutcome {
                success: false,
                result: None,
                errors: vec![err.to_string()],
                warnings: Vec::new(),
                metrics: ConversionMetrics::default(),
            },
        }
    }

    /// Parser → IR builder → validator → orderer → dispatch/assembly.
    ///
    /// Validation errors and cycles stop before generation; build
    /// diagnostics and per-node generation failures accumulate instead.
    pub fn convert_document(&self, document: &RawGraphDocument) -> ConversionOutcome {
        let started = Instant::now();
        let (ir_graph, build_diagnostics) = ir::build(document, &self.registry);
        let mut warnings: Vec<String> = build_diagnostics.iter().map(|d| d.to_string()).collect();

        let validation = validate::validate(&ir_graph);
        warnings.extend(validation.warnings.iter().map(|w| w.to_string()));
        if !validation.is_valid {
            return ConversionOutcome {
                success: false,
                result: None,
                errors: validation.errors.iter().map(|e| e.to_string()).collect(),
                warnings,
                metrics: self.metrics_for(&ir_graph, 0, started),
            };
        }

        let emission_order = match order::order(&ir_graph) {
            Ok(order) => order,
            Err(err) => {
                return ConversionOutcome {
                    success: false,
                    result: None,
                    errors: vec![err.to_string()],
                    warnings,
                    metrics: self.metrics_for(&ir_graph, 0, started),
                };
            }
        };

        let result = codegen::generate(&ir_graph, &emission_order, &self.registry, &self.context);
        let errors: Vec<String> = result
            .diagnostics
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect();
        warnings.extend(result.diagnostics.warnings.iter().cloned());

        let metrics = self.metrics_for(&ir_graph, result.files.len(), started);
        debug!(
            flow = %document.name,
            files = metrics.file_count,
            coverage = metrics.coverage_percent,
            "conversion finished"
        );

        ConversionOutcome {
            success: true,
            result: Some(result),
            errors,
            warnings,
            metrics,
        }
    }

    /// Pre-flights a graph without generating code: structural validation
    /// plus a coverage analysis of which node types have converters.
    pub fn validate_only(&self, input: &str) -> Result<ValidationReport, ParseError> {
        let document = parse_graph(input)?;
        Ok(self.validate_document(&document))
    }

    pub fn validate_document(&self, document: &RawGraphDocument) -> ValidationReport {
        let (ir_graph, build_diagnostics) = ir::build(document, &self.registry);
        let validation = validate::validate(&ir_graph);
        let analysis = self.analyze(&ir_graph);

        let mut warnings: Vec<String> = build_diagnostics.iter().map(|d| d.to_string()).collect();
        warnings.extend(validation.warnings.iter().map(|w| w.to_string()));

        ValidationReport {
            is_valid: validation.is_valid,
            errors: validation.errors.iter().map(|e| e.to_string()).collect(),
            warnings,
            analysis,
        }
    }

    /// Structural validation of an already-built IR graph; used by callers
    /// that drive the pipeline stages themselves.
    pub fn validate_ir(&self, ir_graph: &IRGraph) -> ValidationResult {
        validate::validate(ir_graph)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.registry.capabilities()
    }

    pub fn statistics(&self) -> RegistryStatistics {
        self.registry.statistics()
    }

    fn analyze(&self, ir_graph: &IRGraph) -> GraphAnalysis {
        let supported_types: Vec<String> = ir_graph
            .nodes
            .values()
            .filter(|n| !n.is_opaque())
            .map(|n| n.type_key.clone())
            .sorted()
            .dedup()
            .collect();
        let unsupported_types: Vec<String> = ir_graph
            .nodes
            .values()
            .filter(|n| n.is_opaque())
            .map(|n| n.type_key.clone())
            .sorted()
            .dedup()
            .collect();

        GraphAnalysis {
            node_count: ir_graph.nodes.len(),
            connection_count: ir_graph.connections.len(),
            supported_types,
            unsupported_types,
            coverage_percent: ir_graph.coverage_percent(),
        }
    }

    fn metrics_for(&self, ir_graph: &IRGraph, file_count: usize, started: Instant) -> ConversionMetrics {
        let supported = ir_graph.supported_count();
        ConversionMetrics {
            node_count: ir_graph.nodes.len(),
            connection_count: ir_graph.connections.len(),
            supported_nodes: supported,
            unsupported_nodes: ir_graph.nodes.len() - supported,
            coverage_percent: ir_graph.coverage_percent(),
            file_count,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}
