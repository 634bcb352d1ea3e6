//! Wines ETL: load a wines CSV and build the star schema in a SQLite file.
//!
//! [`run_etl`] is the whole process: load the source file, open the
//! warehouse, run the fixed pipeline, log a summary and release the
//! connection.

use std::{
  io::Write,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use cellar_core::{
  loader,
  pipeline::{self, RunReport},
  store::WineWarehouse,
  wine::StagingWine,
};
use cellar_store_sqlite::SqliteWarehouse;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Where to read from and write to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EtlConfig {
  pub input_path:    PathBuf,
  pub database_path: PathBuf,
}

impl EtlConfig {
  pub const DEFAULT_INPUT: &'static str = "Wines.csv";
  pub const DEFAULT_DATABASE: &'static str = "Wine.db";
}

impl Default for EtlConfig {
  fn default() -> Self {
    Self {
      input_path:    PathBuf::from(Self::DEFAULT_INPUT),
      database_path: PathBuf::from(Self::DEFAULT_DATABASE),
    }
  }
}

/// Layer defaults, the optional TOML file at `file`, `CELLAR_*` environment
/// variables and explicit overrides, in increasing precedence.
pub fn load_config(
  file:     &Path,
  input:    Option<PathBuf>,
  database: Option<PathBuf>,
) -> anyhow::Result<EtlConfig> {
  let settings = config::Config::builder()
    .set_default("input_path", EtlConfig::DEFAULT_INPUT)?
    .set_default("database_path", EtlConfig::DEFAULT_DATABASE)?
    .add_source(config::File::from(file.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("CELLAR"))
    .set_override_option("input_path", input.map(|p| p.display().to_string()))?
    .set_override_option("database_path", database.map(|p| p.display().to_string()))?
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise EtlConfig")
}

// ─── Run ──────────────────────────────────────────────────────────────────────

/// Run the ETL once.
///
/// A load error aborts before the database is touched. A database that
/// cannot be opened yields a report with every step skipped. Step failures
/// are recorded in the report, never returned as `Err`.
pub async fn run_etl(config: &EtlConfig) -> anyhow::Result<RunReport> {
  let frame = loader::load_wines(&config.input_path)
    .with_context(|| format!("failed to load {}", config.input_path.display()))?;

  for (column, kind) in frame.dtypes() {
    tracing::info!(column, %kind, "column type");
  }

  let warehouse = match SqliteWarehouse::open(&config.database_path).await {
    Ok(warehouse) => warehouse,
    Err(e) => {
      tracing::error!(
        path = %config.database_path.display(),
        error = %e,
        "connection to database refused"
      );
      return Ok(RunReport::unconnected(e.to_string()));
    }
  };

  let report = pipeline::run(&warehouse, &frame).await;
  log_summary(&warehouse).await;

  if let Err(e) = warehouse.close().await {
    tracing::warn!(error = %e, "failed to close database");
  }
  Ok(report)
}

async fn log_summary(warehouse: &SqliteWarehouse) {
  match warehouse.table_counts().await {
    Ok(counts) => tracing::info!(
      staging = counts.staging,
      winery = counts.winery,
      geography = counts.geography,
      variety = counts.variety,
      fact = counts.fact,
      "table counts"
    ),
    Err(e) => tracing::warn!(error = %e, "could not count table rows"),
  }

  match warehouse.price_summary().await {
    Ok(Some(summary)) => tracing::info!(
      priced = summary.priced_rows,
      average = summary.average,
      max = summary.max,
      "price summary"
    ),
    Ok(None) => tracing::info!("no priced wines in staging"),
    Err(e) => tracing::warn!(error = %e, "could not summarise prices"),
  }
}

// ─── Staging dump ─────────────────────────────────────────────────────────────

/// Read every staging row back from the database at `path`.
pub async fn staging_rows(path: &Path) -> anyhow::Result<Vec<StagingWine>> {
  let warehouse = SqliteWarehouse::open(path)
    .await
    .with_context(|| format!("failed to open database at {}", path.display()))?;
  let rows = warehouse
    .list_staging()
    .await
    .context("failed to read staging_wines")?;
  warehouse.close().await?;
  Ok(rows)
}

/// Write `rows` as one JSON object per line.
pub fn write_json_lines<W: Write>(rows: &[StagingWine], mut out: W) -> anyhow::Result<()> {
  for row in rows {
    serde_json::to_writer(&mut out, row)?;
    out.write_all(b"\n")?;
  }
  out.flush()?;
  Ok(())
}
