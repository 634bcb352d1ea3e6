//! The `WineWarehouse` trait.
//!
//! Implemented by storage backends (e.g. `cellar-store-sqlite`). The pipeline
//! driver depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  frame::Frame,
  schema::{Dimension, Table},
  wine::{FactWine, PriceSummary, StagingWine, TableCounts},
};

/// A star-schema warehouse for wine records.
///
/// All writes are strictly additive: nothing is updated or deleted, and no
/// insert checks for existing rows.
pub trait WineWarehouse: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Create `table` if it does not already exist.
  fn create_table(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Population ────────────────────────────────────────────────────────

  /// Append every row of `frame` to the staging table. Returns the number of
  /// rows inserted.
  fn load_staging(
    &self,
    frame: &Frame,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

  /// Insert the distinct values of `dimension` currently in staging.
  fn populate_dimension(
    &self,
    dimension: Dimension,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Insert one fact row per staging row that matches a row in every
  /// dimension table on its natural key.
  fn populate_facts(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn table_counts(
    &self,
  ) -> impl Future<Output = Result<TableCounts, Self::Error>> + Send + '_;

  /// Average and maximum over non-null staging prices; `None` when there are
  /// none.
  fn price_summary(
    &self,
  ) -> impl Future<Output = Result<Option<PriceSummary>, Self::Error>> + Send + '_;

  fn list_staging(
    &self,
  ) -> impl Future<Output = Result<Vec<StagingWine>, Self::Error>> + Send + '_;

  fn list_facts(
    &self,
  ) -> impl Future<Output = Result<Vec<FactWine>, Self::Error>> + Send + '_;
}
