//! calsgrid CLI - CALS table ↔ grid model converter

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
use calsgrid::{
    inspect_cals_xml, normalize_cals_xml, CalsTableDefinition, CalsTableStructure, Document,
    GridModel, TableStructure,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "calsgrid")]
#[command(version)]
#[command(about = "calsgrid - CALS table ↔ grid model converter", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// TOML file overriding element names, attribute names and tokens
    #[arg(long, global = true)]
    config: Option<String>,

    /// Namespace URI of the table elements
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Rename every column to `column-<index>`
    #[arg(long, global = true)]
    normalize_names: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Rewrite every table through the grid model
    Normalize {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the grid of every table
    Inspect {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,

        /// Print the grid models as JSON
        #[arg(long)]
        json: bool,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Report tables with inconsistent spans or columns
    Check {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let definition = match load_definition(&cli) {
        Ok(definition) => definition,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Normalize { input, output } => {
            let xml = read_input(input.as_deref())?;
            match normalize_cals_xml(&xml, &definition) {
                Ok(result) => write_output(output.as_deref(), &result),
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            }
        }
        Commands::Inspect {
            input,
            json,
            output,
        } => {
            let xml = read_input(input.as_deref())?;
            let grids = match inspect_cals_xml(&xml, &definition) {
                Ok(grids) => grids,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            };
            let text = if json {
                serde_json::to_string_pretty(&grids)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            } else {
                grids
                    .iter()
                    .enumerate()
                    .map(|(i, grid)| describe_grid(i, grid))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            write_output(output.as_deref(), &text)
        }
        Commands::Check { input } => {
            let xml = read_input(input.as_deref())?;
            let doc = match Document::parse(&xml) {
                Ok(doc) => doc,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            };
            let structure = CalsTableStructure::new(definition);
            let mut failures = 0;
            let tables = structure.find_tables(&doc, doc.root());
            for (i, &table) in tables.iter().enumerate() {
                match structure.build_grid_model(&doc, table) {
                    Ok(grid) => {
                        println!("table {}: ok ({}x{})", i + 1, grid.height(), grid.width())
                    }
                    Err(err) => {
                        failures += 1;
                        println!("table {}: {}", i + 1, err);
                    }
                }
            }
            eprintln!("{} table(s) checked, {} failed", tables.len(), failures);
            if failures > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn load_definition(cli: &Cli) -> Result<CalsTableDefinition, String> {
    let mut definition = match &cli.config {
        Some(path) => {
            let source = fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
            CalsTableDefinition::from_toml_str(&source).map_err(|e| format!("{}: {}", path, e))?
        }
        None => CalsTableDefinition::default(),
    };
    if let Some(namespace) = &cli.namespace {
        definition.namespace = Some(namespace.clone());
    }
    if cli.normalize_names {
        definition.normalize_column_names = true;
    }
    Ok(definition)
}

#[cfg(feature = "cli")]
fn describe_grid(index: usize, grid: &GridModel) -> String {
    let mut out = format!(
        "Table {} ({} rows x {} columns, {} header, {} footer)\n",
        index + 1,
        grid.height(),
        grid.width(),
        grid.header_row_count,
        grid.footer_row_count
    );
    out.push_str(&grid.render_ascii());
    out.push_str("\nColumns:\n");
    for spec in &grid.column_specifications {
        out.push_str(&format!(
            "  {:<12} width {:<8} share {:>5.1}%  colsep {}  rowsep {}\n",
            spec.column_name,
            spec.column_width,
            spec.computed_width * 100.0,
            u8::from(spec.column_separator),
            u8::from(spec.row_separator)
        ));
    }
    out
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&str>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install calsgrid --features cli");
    eprintln!("  calsgrid <normalize|inspect|check> [INPUT_FILE]");
}
