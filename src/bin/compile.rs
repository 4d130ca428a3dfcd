//! Schema Compiler CLI
//!
//! Compiles schema documents into a type graph and prints it.
//! Paths come from the arguments, or from stdin (one per line) when none are given.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use schema_compiler::{compile, CompilerConfig, OutputFormat, TypeGraph};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-compile")]
#[command(about = "Compile namespaced type schemas into a type graph")]
struct Cli {
    /// Schema documents or directories (read from stdin when omitted)
    paths: Vec<PathBuf>,

    /// Explicit config file
    #[arg(short, long)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Fail when the link pass reports errors
    #[arg(long)]
    strict: bool,

    /// Skip the link pass
    #[arg(long)]
    no_link: bool,

    /// Print the graph fingerprint
    #[arg(long)]
    fingerprint: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Summary,
    Json,
    JsonCompact,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Summary => OutputFormat::Summary,
            Format::Json => OutputFormat::Json,
            Format::JsonCompact => OutputFormat::JsonCompact,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CompilerConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if cli.strict {
        config.link.strict = true;
    }
    if cli.no_link {
        config.link.enabled = false;
    }
    if cli.fingerprint {
        config.output.fingerprint = true;
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let inputs = if cli.paths.is_empty() {
        read_stdin_paths().context("reading input paths from stdin")?
    } else {
        cli.paths
    };

    let compilation = compile(&inputs, &config)?;

    if !compilation.diagnostics.is_empty() {
        eprint!("{}", compilation.diagnostics);
    }

    match config.output.format {
        OutputFormat::Summary => print_summary(&compilation.graph),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&compilation.graph)?),
        OutputFormat::JsonCompact => println!("{}", serde_json::to_string(&compilation.graph)?),
    }

    if config.output.fingerprint {
        println!("fingerprint {}", compilation.graph.fingerprint()?);
    }

    Ok(())
}

fn read_stdin_paths() -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            paths.push(PathBuf::from(line));
        }
    }
    Ok(paths)
}

fn print_summary(graph: &TypeGraph) {
    for namespace in graph.namespaces() {
        for definition in namespace.types() {
            if let Some(name) = definition.name() {
                println!("{}.{} {}", namespace.name, name, definition.kind());
            }
        }
    }
    println!(
        "{} namespace(s), {} type(s)",
        graph.namespaces().len(),
        graph.type_count()
    );
}
