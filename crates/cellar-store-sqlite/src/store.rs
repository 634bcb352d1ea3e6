//! [`SqliteWarehouse`], the SQLite implementation of [`WineWarehouse`].

use std::path::Path;

use cellar_core::{
  frame::Frame,
  schema::{Dimension, Table},
  store::WineWarehouse,
  wine::{FactWine, PriceSummary, StagingWine, TableCounts},
};
use rusqlite::types::Value;

use crate::{
  Result,
  encode::{FACT_SELECT, STAGING_SELECT, encode_cell, read_fact, read_staging, staging_column},
  schema,
};

// ─── Warehouse ───────────────────────────────────────────────────────────────

/// A wine warehouse backed by a single SQLite file.
///
/// Holds exactly one connection. It is released by [`SqliteWarehouse::close`]
/// or, failing that, when the last clone is dropped.
#[derive(Clone)]
pub struct SqliteWarehouse {
  conn: tokio_rusqlite::Connection,
}

impl SqliteWarehouse {
  /// Open (or create) the database file at `path`. No tables are created
  /// here; that is the first pipeline step.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::configure(conn).await
  }

  /// Open an in-memory warehouse for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::configure(conn).await
  }

  async fn configure(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(schema::PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  /// Close the connection, surfacing any error SQLite reports on close.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Run one write statement inside its own transaction and return the
  /// number of rows it changed.
  async fn execute_committed(&self, sql: String) -> Result<u64> {
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(&sql, [])?;
        tx.commit()?;
        Ok(changed as u64)
      })
      .await?;
    Ok(changed)
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── WineWarehouse impl ──────────────────────────────────────────────────────

impl WineWarehouse for SqliteWarehouse {
  type Error = crate::Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn create_table(&self, table: Table) -> Result<()> {
    let ddl = schema::create_table(table);
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Population (additive only) ───────────────────────────────────────────

  async fn load_staging(&self, frame: &Frame) -> Result<u64> {
    if frame.is_empty() {
      return Ok(0);
    }

    let columns = frame
      .columns()
      .iter()
      .map(|c| staging_column(&c.name))
      .collect::<Result<Vec<_>>>()?;
    let placeholders = (1..=columns.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "INSERT INTO staging_wines ({}) VALUES ({placeholders})",
      columns.join(", ")
    );

    let rows: Vec<Vec<Value>> = frame
      .rows()
      .iter()
      .map(|row| row.iter().map(encode_cell).collect())
      .collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0u64;
        {
          let mut stmt = tx.prepare(&sql)?;
          for row in &rows {
            inserted += stmt.execute(rusqlite::params_from_iter(row.iter()))? as u64;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    tracing::debug!(rows = inserted, "appended staging rows");
    Ok(inserted)
  }

  async fn populate_dimension(&self, dimension: Dimension) -> Result<u64> {
    self
      .execute_committed(schema::populate_dimension(dimension))
      .await
  }

  async fn populate_facts(&self) -> Result<u64> {
    self
      .execute_committed(schema::POPULATE_FACTS.to_owned())
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn table_counts(&self) -> Result<TableCounts> {
    let counts = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM staging_wines),
             (SELECT COUNT(*) FROM dimwinery),
             (SELECT COUNT(*) FROM dimgeography),
             (SELECT COUNT(*) FROM dimvariety),
             (SELECT COUNT(*) FROM factwine)",
          [],
          |row| {
            Ok(TableCounts {
              staging:   row.get::<_, i64>(0)? as u64,
              winery:    row.get::<_, i64>(1)? as u64,
              geography: row.get::<_, i64>(2)? as u64,
              variety:   row.get::<_, i64>(3)? as u64,
              fact:      row.get::<_, i64>(4)? as u64,
            })
          },
        )?)
      })
      .await?;
    Ok(counts)
  }

  async fn price_summary(&self) -> Result<Option<PriceSummary>> {
    let (priced_rows, average, max): (i64, Option<f64>, Option<f64>) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(price), AVG(price), MAX(price)
           FROM staging_wines WHERE price IS NOT NULL",
          [],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?)
      })
      .await?;

    Ok(match (average, max) {
      (Some(average), Some(max)) if priced_rows > 0 => Some(PriceSummary {
        priced_rows: priced_rows as u64,
        average,
        max,
      }),
      _ => None,
    })
  }

  async fn list_staging(&self) -> Result<Vec<StagingWine>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(STAGING_SELECT)?;
        let rows = stmt
          .query_map([], read_staging)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_facts(&self) -> Result<Vec<FactWine>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(FACT_SELECT)?;
        let rows = stmt
          .query_map([], read_fact)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
