//! smelter-infer: print the relational schema inferred from a JSON document
//!
//! Usage:
//!   # Read from file, output to stdout
//!   smelter-infer data.json
//!
//!   # Read from stdin with a custom root table name
//!   cat orders.json | smelter-infer --root-name orders --compact

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use smelter::input::read_document;
use smelter::{InferConfig, SchemaAnalyzer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "smelter-infer")]
#[command(about = "Infer a relational schema from a JSON document", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Name of the synthetic root table (default: "Root")
    #[arg(long)]
    root_name: Option<String>,

    /// Rows sampled per table for type inference (default: 100)
    #[arg(long)]
    sample_size: Option<usize>,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = InferConfig::default();
    if let Some(root_name) = args.root_name {
        config.root_name = root_name;
    }
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }

    let document = read_document(args.input.as_deref()).context("Failed to read JSON document")?;
    let schema = SchemaAnalyzer::new(config).analyze(&document);

    if schema.is_empty() {
        tracing::warn!("No tables inferred; the document holds no objects or lists");
    }

    let output = if args.compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };

    println!("{}", output);

    Ok(())
}
