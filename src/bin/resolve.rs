//! Schema Resolve CLI
//!
//! Resolves the definitions of a Swagger / OpenAPI JSON document and prints
//! the resulting type trees as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use indexmap::IndexMap;
use schema_resolver::{parse_definitions_with, CyclePolicy, Diagnostics, Resolver, ResolverConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-resolve")]
#[command(about = "Resolve schema definitions into render-agnostic types")]
struct Cli {
    /// Swagger 2.0 or OpenAPI 3 document (JSON)
    document: PathBuf,

    /// Resolve only this definition
    #[arg(short, long)]
    definition: Option<String>,

    /// Config file (defaults to resolver.toml lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on reference cycles instead of breaking them
    #[arg(long)]
    strict_cycles: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let mut config = ResolverConfig::load_from(config_path.as_deref())?;
    if cli.strict_cycles {
        config.cycle_policy = CyclePolicy::Fail;
    }

    let content = std::fs::read_to_string(&cli.document)
        .with_context(|| format!("Failed to read {}", cli.document.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", cli.document.display()))?;

    let mut diagnostics = Diagnostics::new();
    let definitions = parse_definitions_with(&document, &mut diagnostics)
        .with_context(|| format!("Failed to read definitions in {}", cli.document.display()))?;

    let locator = config.locator.build();
    let mut resolver = Resolver::with_config(&definitions, locator.as_ref(), config);

    let resolved = match &cli.definition {
        Some(name) => {
            let Some(model) = definitions.get(name) else {
                bail!("Definition '{}' not found", name);
            };
            let mut single = IndexMap::new();
            single.insert(name.clone(), resolver.resolve_named(name, model)?);
            single
        }
        None => resolver.resolve_all()?,
    };

    let output = match cli.format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&resolved)?,
        OutputFormat::Compact => serde_json::to_string(&resolved)?,
    };
    println!("{}", output);

    diagnostics.merge(resolver.into_diagnostics());
    if diagnostics.has_warnings() {
        eprint!("{}", diagnostics);
    }

    Ok(())
}
