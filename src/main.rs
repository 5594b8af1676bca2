use std::path::PathBuf;

use clap::Parser;
use results_export::catalog;
use results_export::convert;
use results_export::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let specs = match &cli.catalog {
        Some(path) => catalog::load_catalog(path)?,
        None => catalog::default_catalog(),
    };
    let specs = catalog::filter_sheets(specs, &cli.sheet)?;

    let outcomes = convert::convert_catalog(&cli.excel, &cli.output_dir, &specs)?;
    for outcome in &outcomes {
        println!("Wrote {}", outcome.path.display());
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert results.xlsx sheets into CSV files for the app."
)]
struct Cli {
    /// Path to the Excel file.
    #[arg(long, default_value = "results.xlsx")]
    excel: PathBuf,

    /// Output directory for CSV files.
    #[arg(long, default_value = "public/data")]
    output_dir: PathBuf,

    /// Optional JSON catalog replacing the built-in sheet mappings.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Only convert the named sheet. May be repeated.
    #[arg(long)]
    sheet: Vec<String>,
}
