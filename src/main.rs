use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ermark::dot::{DotConfig, GraphKind, RelationStyle};
use ermark::filter::{filter_resources, Filter};
use ermark::output::{self, OutputFormat};
use ermark::source::{self, MarkupSource, SchemaSource};
use ermark::sql::SqlOptions;

#[derive(Parser)]
#[command(name = "ermark")]
#[command(version)]
#[command(about = "Turn er markup and SQL schemas into er markup, Graphviz DOT, Mermaid or images", long_about = None)]
struct Cli {
    /// Input file: .er markup or .sql DDL ("-" reads er markup from stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (default: stdout). The extension picks the format in auto mode
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output mode: auto, er, dot, mermaid, mermaid_er, graph
    #[arg(short, long, default_value = "auto")]
    mode: String,

    /// Only keep tables matching these patterns
    #[arg(long, num_args = 1..)]
    include_tables: Option<Vec<String>>,

    /// Drop tables matching these patterns
    #[arg(long, num_args = 1..)]
    exclude_tables: Option<Vec<String>>,

    /// Only keep columns matching these patterns
    #[arg(long, num_args = 1..)]
    include_columns: Option<Vec<String>>,

    /// Drop columns matching these patterns
    #[arg(long, num_args = 1..)]
    exclude_columns: Option<Vec<String>>,

    /// SQL dialect: auto, generic, postgres, mysql
    #[arg(long, default_value = "auto")]
    dialect: String,

    /// Normalize SQL column types (int4 -> INTEGER, ...)
    #[arg(long)]
    normalize_types: bool,

    /// Key column marker in DOT: underline, asterisk
    #[arg(long, default_value = "underline")]
    key_marker: String,

    /// Graph direction in DOT: LR, TB
    #[arg(long, default_value = "LR")]
    direction: String,

    /// Emit a directed graph
    #[arg(long)]
    digraph: bool,

    /// Draw cardinalities as crow's feet instead of labels
    #[arg(long)]
    crowfoot: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let sql_options = SqlOptions {
        dialect: cli.dialect.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        normalize_types: cli.normalize_types,
    };
    let config = DotConfig {
        key_marker: cli.key_marker.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        direction: cli.direction.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        graph_kind: if cli.digraph { GraphKind::Digraph } else { GraphKind::Graph },
        relation_style: if cli.crowfoot { RelationStyle::Crowfoot } else { RelationStyle::Label },
    };
    let format = OutputFormat::from_mode(&cli.mode, cli.output.as_deref())?;

    let filter = Filter::new(
        cli.include_tables.as_deref(),
        cli.exclude_tables.as_deref(),
        cli.include_columns.as_deref(),
        cli.exclude_columns.as_deref(),
    )?;

    let schema = if cli.input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        MarkupSource::from_text(text).load()?
    } else {
        source::from_path(&cli.input, sql_options)?
            .load()
            .with_context(|| format!("Failed to load {}", cli.input.display()))?
    };

    let (tables, relations) = if filter.is_empty() {
        (schema.tables, schema.relations)
    } else {
        filter_resources(&schema.tables, &schema.relations, &filter)
    };

    let text = output::render_text(&format, &tables, &relations, &config);

    match (&format, cli.output) {
        (OutputFormat::Image(image), Some(path)) => {
            output::render_image(&text, image, &path)?;
            eprintln!("Rendered to: {}", path.display());
        }
        (_, Some(path)) => {
            output::write_text(&text, &path)?;
            eprintln!(
                "Wrote {} ({} tables, {} relations) to {}",
                format,
                tables.len(),
                relations.len(),
                path.display()
            );
        }
        (_, None) => print!("{}", text),
    }

    Ok(())
}
