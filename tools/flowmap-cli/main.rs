use clap::{Parser, Subcommand};
use flowmap::prelude::*;
use flowmap::scope::{EnvValueResolver, JsonFileValueResolver};
use std::fs;
use std::sync::Arc;
use std::time::Instant;

/// Apply flow mappings and evaluate mapping expressions from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Comma-separated JSON property files for `$property[...]` lookups
    #[arg(long, global = true, value_delimiter = ',')]
    props: Vec<String>,

    /// Log resolution and evaluation steps
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a list of mappings from an input scope to an output scope
    Map {
        /// Path to the mappings JSON file
        mappings_path: String,
        /// Path to the input scope JSON file (attribute -> value)
        #[arg(short, long)]
        input: String,
        /// Path to the output scope declaration JSON file (attribute -> type)
        #[arg(short, long)]
        output: String,
    },
    /// Evaluate a single expression
    Eval {
        /// The expression text, e.g. 'string.concat("Hello ", $flow.name)'
        expression: String,
        /// Optional path to the input scope JSON file
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let properties = load_properties(&cli.props);
    let resolver = ScopeResolver::new().with_properties(properties);
    let engine = MappingEngine::new();

    match cli.command {
        Command::Map {
            mappings_path,
            input,
            output,
        } => run_map(&engine, &resolver, &mappings_path, &input, &output),
        Command::Eval { expression, input } => run_eval(&engine, &resolver, &expression, input),
    }
}

fn load_properties(paths: &[String]) -> PropertyProvider {
    let mut provider = PropertyProvider::new();
    if !paths.is_empty() {
        let files = JsonFileValueResolver::from_paths(paths).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load property files: {}", e))
        });
        provider = provider.with_resolver(Arc::new(files));
    }
    let env = EnvValueResolver::from_env()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid environment mappings: {}", e)));
    provider.with_resolver(Arc::new(env))
}

fn load_input(path: Option<&str>) -> SimpleScope {
    match path {
        Some(path) => SimpleScope::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load input scope from '{}': {}", path, e))
        }),
        None => SimpleScope::new(),
    }
}

fn run_map(
    engine: &MappingEngine,
    resolver: &ScopeResolver<'_>,
    mappings_path: &str,
    input_path: &str,
    output_path: &str,
) {
    let load_start = Instant::now();
    let mapper = MapperDocument::from_file(mappings_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load mappings from '{}': {}",
            mappings_path, e
        ))
    });
    let input = load_input(Some(input_path));
    let declaration_json = fs::read_to_string(output_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read output declaration '{}': {}",
            output_path, e
        ))
    });
    let declaration: serde_json::Value = serde_json::from_str(&declaration_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse output declaration: {}", e)));
    let mut output = SimpleScope::from_declaration(declaration)
        .unwrap_or_else(|e| exit_with_error(&e));
    let load_duration = load_start.elapsed();

    let compile_start = Instant::now();
    let compiled = engine
        .compile(&mapper)
        .unwrap_or_else(|e| exit_with_error(&format!("Mapping compilation failed: {}", e)));
    let compile_duration = compile_start.elapsed();

    let apply_start = Instant::now();
    for mapping in &compiled {
        engine
            .run(mapping, &input, &mut output, resolver)
            .unwrap_or_else(|e| exit_with_error(&format!("Mapping failed: {}", e)));
    }
    let apply_duration = apply_start.elapsed();

    let rendered = serde_json::to_string_pretty(&output.to_json())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to render output: {}", e)));
    println!("{}", rendered);

    log::info!(
        "{} mapping(s): loading {:?}, compilation {:?}, application {:?}",
        compiled.len(),
        load_duration,
        compile_duration,
        apply_duration
    );
}

fn run_eval(
    engine: &MappingEngine,
    resolver: &ScopeResolver<'_>,
    expression: &str,
    input_path: Option<String>,
) {
    let input = load_input(input_path.as_deref());
    let result = engine
        .evaluate(expression, &input, resolver)
        .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));
    match result {
        Value::String(s) => println!("{}", s),
        other => println!("{}", other.to_json()),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
