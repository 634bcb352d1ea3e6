//! `cellar`: load a wines CSV into a SQLite star schema.
//!
//! Reads `cellar.toml` (or the path given with `--config`) when present,
//! then runs the ETL pipeline once.
//!
//! ```text
//! cellar --input Wines.csv --database Wine.db --report-json
//! ```

use std::{io, path::PathBuf};

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Load a wines CSV into a SQLite star schema")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cellar.toml")]
  config: PathBuf,

  /// Source CSV; overrides `input_path` from the config.
  #[arg(long, value_name = "FILE")]
  input: Option<PathBuf>,

  /// SQLite database file; overrides `database_path` from the config.
  #[arg(long, value_name = "FILE")]
  database: Option<PathBuf>,

  /// Print every staging row as a JSON line after the run.
  #[arg(long)]
  dump_staging: bool,

  /// Print the run report as JSON.
  #[arg(long)]
  report_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let config = cellar_etl::load_config(&cli.config, cli.input, cli.database)?;

  let report = cellar_etl::run_etl(&config).await?;

  if cli.dump_staging {
    let rows = cellar_etl::staging_rows(&config.database_path).await?;
    cellar_etl::write_json_lines(&rows, io::stdout().lock())?;
  }

  if cli.report_json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  }

  if !report.is_clean() {
    tracing::warn!(
      failed = report.failures().count(),
      "run finished with failed or skipped steps"
    );
  }

  Ok(())
}
