//! smelter-load: infer, flatten and load a JSON document into SQLite
//!
//! Usage:
//!   # Infer the schema and load into a database file
//!   smelter-load data.json --database out.sqlite
//!
//!   # Load with a previously inferred (and possibly edited) schema
//!   smelter-infer data.json > schema.json
//!   smelter-load data.json --schema schema.json --database out.sqlite
//!
//!   # Dry run: write one .jsonl file per table instead of loading
//!   smelter-load data.json --output-dir ./tables

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use smelter::input::read_document;
use smelter::{
    flatten, InferConfig, LoadConfig, LoadReport, Loader, SchemaAnalyzer, SchemaMap,
    SqliteConnector, TableLoad, TableWriter,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "smelter-load")]
#[command(about = "Load a nested JSON document into relational tables", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Schema produced by smelter-infer; inferred from the document if omitted
    #[arg(long)]
    schema: Option<PathBuf>,

    /// SQLite database file (or ":memory:")
    #[arg(long, env = "SMELTER_DATABASE")]
    database: Option<String>,

    /// Write one <table>.jsonl file per table here instead of loading (takes precedence over --database)
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Name of the synthetic root table (default: "Root")
    #[arg(long)]
    root_name: Option<String>,

    /// Rows sampled per table for type inference (default: 100)
    #[arg(long)]
    sample_size: Option<usize>,

    /// Maximum rows per INSERT statement (default: 500)
    #[arg(long)]
    batch_size: Option<usize>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut infer = InferConfig::default();
    if let Some(root_name) = args.root_name {
        infer.root_name = root_name;
    }
    if let Some(sample_size) = args.sample_size {
        infer.sample_size = sample_size;
    }

    let mut load = LoadConfig::default();
    if let Some(batch_size) = args.batch_size {
        load.batch_size = batch_size;
    }

    let document = read_document(args.input.as_deref()).context("Failed to read JSON document")?;

    let schema = match &args.schema {
        Some(path) => read_schema(path)?,
        None => SchemaAnalyzer::new(infer).analyze(&document),
    };
    tracing::info!(tables = schema.len(), "Schema ready");

    let rows = flatten(&schema, &document);

    let report = if let Some(output_dir) = args.output_dir {
        let mut writer = TableWriter::new_file_writer(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let written = writer.write_tables(&schema, &rows)?;
        writer.flush()?;
        LoadReport {
            tables: written
                .into_iter()
                .map(|(table, rows)| TableLoad { table, rows })
                .collect(),
        }
    } else {
        let Some(database) = args.database else {
            bail!("No destination: pass --database, set SMELTER_DATABASE, or use --output-dir");
        };
        Loader::new(load)
            .load(&SqliteConnector, &database, &schema, &rows)
            .with_context(|| format!("Failed to load into {}", database))?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn read_schema(path: &Path) -> Result<SchemaMap> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let schema = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse schema {}", path.display()))?;
    Ok(schema)
}
