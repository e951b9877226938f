//! CLI tool for execgrid - loads executions and prints the filtered grid as TSV
//!
//! Usage:
//!   execgrid_cli <rows.json>                                  # All fields, TSV to stdout
//!   execgrid_cli <rows.json> --columns table-columns.json     # Visible layout
//!   execgrid_cli <rows.json> --fields all-fields.json         # Field catalog
//!   execgrid_cli <rows.json> --mic mic-codes.csv              # Resolve country flags
//!   execgrid_cli <rows.json> --filter trader=alice ...        # Value filters (repeatable)
//!   execgrid_cli <rows.json> -o out.tsv                       # TSV to file
//!
//! Set `RUST_LOG=execgrid=debug` for state transition logs on stderr.

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};

use execgrid::api::{decode_field_catalog, decode_rows, decode_table_config};
use execgrid::grid::{to_tsv, ExecutionGrid};
use execgrid::layout::ColumnLayout;
use execgrid::mic_country::MicCountryMap;
use execgrid::types::{ColumnDescriptor, GridConfig, Row};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: execgrid_cli <rows.json> [--columns table-columns.json] \
[--fields all-fields.json] [--mic mic-codes.csv] [--filter field=value]... [-o output.tsv]";

#[derive(Default)]
struct Args {
    rows: String,
    columns: Option<String>,
    fields: Option<String>,
    mic: Option<String>,
    filters: Vec<(String, String)>,
    output: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().ok_or_else(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--columns" => args.columns = Some(value("--columns")?),
            "--fields" => args.fields = Some(value("--fields")?),
            "--mic" => args.mic = Some(value("--mic")?),
            "-o" => args.output = Some(value("-o")?),
            "--filter" => {
                let pair = value("--filter")?;
                let (field, v) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("filter must be field=value, got {pair}"))?;
                args.filters.push((field.to_string(), v.to_string()));
            }
            other if other.starts_with('-') => return Err(format!("unknown option {other}")),
            other if args.rows.is_empty() => args.rows = other.to_string(),
            other => return Err(format!("unexpected argument {other}")),
        }
    }
    if args.rows.is_empty() {
        return Err("missing rows file".to_string());
    }
    Ok(args)
}

fn read(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading {path}: {e}"))
}

/// Catalog from the first row's keys, for runs without any configuration.
fn catalog_from_rows(rows: &[Row]) -> Vec<ColumnDescriptor> {
    rows.first()
        .map(|row| {
            row.iter()
                .map(|(field, _)| ColumnDescriptor::text(field, field))
                .collect()
        })
        .unwrap_or_default()
}

fn run(args: &Args) -> Result<String, String> {
    let rows = decode_rows(&read(&args.rows)?).map_err(|e| format!("Error parsing rows: {e}"))?;

    let visible = match &args.columns {
        Some(path) => Some(
            decode_table_config(&read(path)?)
                .map_err(|e| format!("Error parsing {path}: {e}"))?
                .columns,
        ),
        None => None,
    };
    let catalog = match &args.fields {
        Some(path) => decode_field_catalog(&read(path)?)
            .map_err(|e| format!("Error parsing {path}: {e}"))?
            .fields,
        None => visible.clone().unwrap_or_else(|| catalog_from_rows(&rows)),
    };
    let layout = match visible {
        Some(visible) => ColumnLayout::new(catalog, visible),
        None => ColumnLayout::all_visible(catalog),
    };

    let mut grid = ExecutionGrid::new(GridConfig::default(), layout);
    if let Some(path) = &args.mic {
        grid.set_mic_map(MicCountryMap::parse(&read(path)?));
    }
    grid.load_rows(rows);

    for (field, value) in &args.filters {
        let col = grid
            .layout()
            .index_of(field)
            .ok_or_else(|| format!("filter field {field} is not a visible column"))?;
        if !grid.is_value_selected(col, value) {
            grid.toggle_value(col, value).map_err(|e| e.to_string())?;
        }
    }

    let columns = grid.columns();
    let mut table = Vec::with_capacity(grid.filtered_len() + 1);
    table.push(columns.iter().map(|c| c.header.clone()).collect());
    for row in 0..grid.filtered_len() {
        table.push(
            (0..columns.len())
                .map(|col| grid.cell_text(row, col).unwrap_or_default())
                .collect(),
        );
    }
    tracing::info!(
        rows = grid.rows().len(),
        shown = grid.filtered_len(),
        columns = columns.len(),
        "grid rendered"
    );
    Ok(to_tsv(&table))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(1);
        }
    };

    let tsv = match run(&args) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, format!("{tsv}\n")) {
                eprintln!("Error writing {path}: {e}");
                std::process::exit(1);
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{tsv}") {
                eprintln!("Error writing output: {e}");
                std::process::exit(1);
            }
        }
    }
}
