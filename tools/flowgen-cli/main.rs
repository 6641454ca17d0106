use clap::{Parser, Subcommand, ValueEnum};
use flowgen::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// A compiler that translates visual workflow graphs into deployable source code
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an exported flow graph into source code
    Convert {
        /// Path to the exported flow JSON file
        flow_path: String,

        /// Directory the generated files are written to
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,

        /// Target sub-language of the generated code
        #[arg(short, long, value_enum, default_value_t = TargetCli::Typescript)]
        target: TargetCli,

        /// Also generate a smoke-test file
        #[arg(long)]
        with_tests: bool,

        /// Also generate a README describing the flow
        #[arg(long)]
        with_docs: bool,

        /// Thread verbose/observability wiring through the generated code
        #[arg(long)]
        with_observability: bool,
    },
    /// Pre-flight a flow graph without generating code
    Validate {
        /// Path to the exported flow JSON file
        flow_path: String,
    },
    /// List the registered converters, categories, and aliases
    Capabilities,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetCli {
    Typescript,
    Javascript,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            flow_path,
            out_dir,
            target,
            with_tests,
            with_docs,
            with_observability,
        } => run_convert(
            flow_path,
            out_dir,
            target,
            with_tests,
            with_docs,
            with_observability,
        ),
        Command::Validate { flow_path } => run_validate(flow_path),
        Command::Capabilities => run_capabilities(),
    }
}

fn build_compiler(context: GenerationContext) -> FlowCompiler {
    FlowCompiler::builder()
        .with_context(context)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build compiler: {}", e)))
}

fn run_convert(
    flow_path: String,
    out_dir: PathBuf,
    target: TargetCli,
    with_tests: bool,
    with_docs: bool,
    with_observability: bool,
) {
    let total_start = Instant::now();

    let flow_json = fs::read_to_string(&flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read flow file '{}': {}", &flow_path, e))
    });

    let context = GenerationContext {
        target: match target {
            TargetCli::Typescript => TargetFormat::TypeScript,
            TargetCli::Javascript => TargetFormat::JavaScript,
        },
        flags: FeatureFlags {
            include_tests: with_tests,
            include_docs: with_docs,
            include_observability: with_observability,
        },
        ..GenerationContext::default()
    };
    let compiler = build_compiler(context);

    println!("Converting '{}'...", flow_path);
    let convert_start = Instant::now();
    let outcome = compiler.convert(&flow_json);
    let convert_duration = convert_start.elapsed();

    for warning in &outcome.warnings {
        println!("  warning: {}", warning);
    }
    for error in &outcome.errors {
        eprintln!("  error: {}", error);
    }

    let Some(result) = outcome.result else {
        exit_with_error("Conversion failed; no output was produced.");
    };

    fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to create output directory '{}': {}",
            out_dir.display(),
            e
        ))
    });
    for file in &result.files {
        let path = out_dir.join(&file.path);
        fs::write(&path, &file.content).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
        });
        println!("  -> Wrote '{}'", path.display());
    }

    println!("\n--- Conversion Summary ---");
    println!(
        "Nodes:      {} ({} supported, {} unsupported)",
        outcome.metrics.node_count,
        outcome.metrics.supported_nodes,
        outcome.metrics.unsupported_nodes
    );
    println!("Coverage:   {}%", outcome.metrics.coverage_percent);
    println!("Files:      {}", outcome.metrics.file_count);
    println!("Packages:   {}", result.dependency_manifest.len());
    for (package, version) in &result.dependency_manifest {
        println!("  {}@{}", package, version);
    }
    println!("\n--- Performance Summary ---");
    println!("Conversion:       {:?}", convert_duration);
    println!("Total Execution:  {:?}", total_start.elapsed());
}

fn run_validate(flow_path: String) {
    let flow_json = fs::read_to_string(&flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read flow file '{}': {}", &flow_path, e))
    });
    let compiler = build_compiler(GenerationContext::default());

    let report = compiler
        .validate_only(&flow_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow: {}", e)));

    println!("Valid:      {}", report.is_valid);
    println!(
        "Nodes:      {} ({} connections)",
        report.analysis.node_count, report.analysis.connection_count
    );
    println!("Coverage:   {}%", report.analysis.coverage_percent);
    if !report.analysis.unsupported_types.is_empty() {
        println!(
            "Unsupported types: {}",
            report.analysis.unsupported_types.join(", ")
        );
    }
    for error in &report.errors {
        println!("  error: {}", error);
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }

    if !report.is_valid {
        std::process::exit(1);
    }
}

fn run_capabilities() {
    let compiler = build_compiler(GenerationContext::default());
    let capabilities = compiler.capabilities();

    println!("Converters: {}", capabilities.total_converters);
    println!("\nSupported types:");
    for type_key in &capabilities.supported_types {
        println!("  {}", type_key);
    }
    println!("\nCategories:");
    for category in &capabilities.categories {
        println!("  {}", category);
    }
    if !capabilities.aliases.is_empty() {
        println!("\nAliases:");
        for (alias, canonical) in &capabilities.aliases {
            println!("  {} -> {}", alias, canonical);
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
