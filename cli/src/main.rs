mod loader;

use anyhow::{Context, Result};
use clap::Parser;
use openapi2jsonschema_core::config::DEFAULT_PREFIX;
use openapi2jsonschema_core::{convert, ConvertOptions};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "openapi2jsonschema")]
#[command(about = "Convert OpenAPI 2 and OpenAPI 3 documents into standalone JSON Schema files")]
#[command(version)]
struct Cli {
    /// OpenAPI document to convert: a file path or an http(s) URL, YAML or JSON
    schema: String,

    /// Directory to store schema files
    #[arg(short, long, default_value = "schemas")]
    output: PathBuf,

    /// Prefix for JSON references (Swagger 2 only)
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Inline all references so every file is self-contained
    #[arg(long)]
    stand_alone: bool,

    /// Include the API group and version in file names
    #[arg(long)]
    expanded: bool,

    /// Apply Kubernetes conventions (int-or-string, apiVersion/kind enums, nullable optionals)
    #[arg(long)]
    kubernetes: bool,

    /// Forbid properties that are not declared
    #[arg(long)]
    strict: bool,

    /// Also emit schemas for request/response bodies and operation parameters (OpenAPI 3)
    #[arg(long)]
    include_bodies: bool,

    /// Extra HTTP header for URL downloads, "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Max nested references followed when inlining
    #[arg(long, default_value_t = 50)]
    max_depth: usize,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; nothing is written to stdout
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let headers = loader::parse_headers(&cli.headers);
    let document = loader::load_document(&cli.schema, &headers)?;

    let options = ConvertOptions {
        prefix: cli.prefix,
        kubernetes: cli.kubernetes,
        strict: cli.strict,
        expanded: cli.expanded,
        stand_alone: cli.stand_alone,
        include_bodies: cli.include_bodies,
        max_depth: cli.max_depth,
    };

    let output = convert(document, &options)
        .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?;

    fs::create_dir_all(&cli.output).with_context(|| {
        format!("Failed to create output directory: {}", cli.output.display())
    })?;
    for file in &output.files {
        write_json(&file.schema, &cli.output.join(&file.name))?;
    }

    tracing::info!(
        files = output.files.len(),
        skipped = output.failures.len(),
        output = %cli.output.display(),
        "Wrote schemas"
    );

    Ok(())
}

fn write_json<T: serde::Serialize>(val: &T, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output file")?;

    Ok(())
}
