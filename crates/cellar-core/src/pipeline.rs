//! The fixed ETL plan and its driver.
//!
//! ```text
//! create tables (staging → dimensions → fact)
//!   └─ load staging
//!        └─ populate dimwinery, dimvariety, dimgeography
//!             └─ populate factwine
//! ```
//!
//! Every step runs exactly once, in order. A failing step is logged and
//! recorded in the [`RunReport`]; the remaining steps still run and may fail
//! in turn. Nothing is retried or rolled back.

use std::fmt;

use serde::Serialize;

use crate::{
  frame::Frame,
  schema::{Dimension, Table},
  store::WineWarehouse,
};

// ─── Steps ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "target", rename_all = "snake_case")]
pub enum Step {
  CreateTable(Table),
  LoadStaging,
  PopulateDimension(Dimension),
  PopulateFacts,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::CreateTable(t) => write!(f, "create table {t}"),
      Step::LoadStaging => write!(f, "load {}", Table::StagingWines),
      Step::PopulateDimension(d) => write!(f, "populate {d}"),
      Step::PopulateFacts => write!(f, "populate {}", Table::FactWine),
    }
  }
}

/// The full plan in execution order.
pub fn steps() -> Vec<Step> {
  Table::ALL
    .into_iter()
    .map(Step::CreateTable)
    .chain([Step::LoadStaging])
    .chain(Dimension::ALL.into_iter().map(Step::PopulateDimension))
    .chain([Step::PopulateFacts])
    .collect()
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
  /// `rows` is the number of rows written, when the step writes rows.
  Completed { rows: Option<u64> },
  Failed { error: String },
  Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
  #[serde(flatten)]
  pub step:    Step,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// What happened to every step of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
  pub steps: Vec<StepReport>,
}

impl RunReport {
  /// A report for a run whose store could not be opened: every step is
  /// skipped.
  pub fn unconnected(reason: impl Into<String>) -> Self {
    let reason = reason.into();
    let steps = steps()
      .into_iter()
      .map(|step| {
        tracing::warn!(%step, "skipped: no database connection");
        StepReport { step, outcome: Outcome::Skipped { reason: reason.clone() } }
      })
      .collect();
    Self { steps }
  }

  fn record<E: fmt::Display>(&mut self, step: Step, result: Result<Option<u64>, E>) {
    let outcome = match result {
      Ok(rows) => {
        tracing::info!(%step, rows = ?rows, "step completed");
        Outcome::Completed { rows }
      }
      Err(e) => {
        tracing::error!(%step, error = %e, "step failed");
        Outcome::Failed { error: e.to_string() }
      }
    };
    self.steps.push(StepReport { step, outcome });
  }

  /// True when every step completed.
  pub fn is_clean(&self) -> bool {
    self
      .steps
      .iter()
      .all(|s| matches!(s.outcome, Outcome::Completed { .. }))
  }

  pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
    self
      .steps
      .iter()
      .filter(|s| matches!(s.outcome, Outcome::Failed { .. }))
  }

  /// Rows written by `step`, if it completed and writes rows.
  pub fn rows(&self, step: Step) -> Option<u64> {
    self.steps.iter().find(|s| s.step == step).and_then(|s| match s.outcome {
      Outcome::Completed { rows } => rows,
      _ => None,
    })
  }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Run the whole plan against `warehouse`.
pub async fn run<W: WineWarehouse>(warehouse: &W, frame: &Frame) -> RunReport {
  let mut report = RunReport::default();

  for step in steps() {
    let result = match step {
      Step::CreateTable(table) => warehouse.create_table(table).await.map(|()| None),
      Step::LoadStaging => warehouse.load_staging(frame).await.map(Some),
      Step::PopulateDimension(dim) => warehouse.populate_dimension(dim).await.map(Some),
      Step::PopulateFacts => warehouse.populate_facts().await.map(Some),
    };
    report.record(step, result);
  }

  report
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::wine::{FactWine, PriceSummary, StagingWine, TableCounts};

  #[derive(Debug, thiserror::Error)]
  #[error("{0}")]
  struct FakeError(String);

  /// Records calls and fails creation of one table on demand.
  #[derive(Default)]
  struct FakeWarehouse {
    calls:      Mutex<Vec<String>>,
    fail_table: Option<Table>,
  }

  impl FakeWarehouse {
    fn log(&self, call: String) { self.calls.lock().unwrap().push(call); }
  }

  impl WineWarehouse for FakeWarehouse {
    type Error = FakeError;

    async fn create_table(&self, table: Table) -> Result<(), FakeError> {
      self.log(format!("create {table}"));
      if self.fail_table == Some(table) {
        return Err(FakeError(format!("cannot create {table}")));
      }
      Ok(())
    }

    async fn load_staging(&self, frame: &Frame) -> Result<u64, FakeError> {
      self.log("load".into());
      Ok(frame.len() as u64)
    }

    async fn populate_dimension(&self, dimension: Dimension) -> Result<u64, FakeError> {
      self.log(format!("populate {dimension}"));
      Ok(1)
    }

    async fn populate_facts(&self) -> Result<u64, FakeError> {
      self.log("populate factwine".into());
      if self.fail_table == Some(Table::FactWine) {
        return Err(FakeError("no such table: factwine".into()));
      }
      Ok(1)
    }

    async fn table_counts(&self) -> Result<TableCounts, FakeError> {
      Ok(TableCounts::default())
    }

    async fn price_summary(&self) -> Result<Option<PriceSummary>, FakeError> { Ok(None) }

    async fn list_staging(&self) -> Result<Vec<StagingWine>, FakeError> { Ok(vec![]) }

    async fn list_facts(&self) -> Result<Vec<FactWine>, FakeError> { Ok(vec![]) }
  }

  fn frame() -> Frame { Frame::from_reader("winery\nFoo\nBar\n".as_bytes()).unwrap() }

  #[test]
  fn plan_creates_dimensions_before_fact_and_populates_them_first() {
    let plan = steps();
    assert_eq!(plan.len(), 10);
    assert_eq!(plan[0], Step::CreateTable(Table::StagingWines));
    assert_eq!(plan[4], Step::CreateTable(Table::FactWine));
    assert_eq!(plan[5], Step::LoadStaging);
    assert_eq!(plan.last(), Some(&Step::PopulateFacts));
  }

  #[tokio::test]
  async fn runs_every_step_in_order() {
    let warehouse = FakeWarehouse::default();
    let report = run(&warehouse, &frame()).await;

    assert!(report.is_clean());
    assert_eq!(report.rows(Step::LoadStaging), Some(2));
    assert_eq!(report.rows(Step::CreateTable(Table::DimWinery)), None);
    assert_eq!(*warehouse.calls.lock().unwrap(), vec![
      "create staging_wines",
      "create dimwinery",
      "create dimgeography",
      "create dimvariety",
      "create factwine",
      "load",
      "populate dimwinery",
      "populate dimvariety",
      "populate dimgeography",
      "populate factwine",
    ]);
  }

  #[tokio::test]
  async fn failed_step_does_not_halt_the_run() {
    let warehouse = FakeWarehouse {
      fail_table: Some(Table::FactWine),
      ..Default::default()
    };
    let report = run(&warehouse, &frame()).await;

    assert!(!report.is_clean());
    assert_eq!(report.steps.len(), 10);
    let failed: Vec<Step> = report.failures().map(|s| s.step).collect();
    assert_eq!(failed, vec![Step::CreateTable(Table::FactWine), Step::PopulateFacts]);
    assert_eq!(
      report.rows(Step::PopulateDimension(Dimension::Geography)),
      Some(1)
    );
  }

  #[test]
  fn unconnected_report_skips_everything() {
    let report = RunReport::unconnected("unable to open database file");

    assert_eq!(report.steps.len(), steps().len());
    assert!(!report.is_clean());
    assert_eq!(report.failures().count(), 0);
    assert!(report.steps.iter().all(|s| matches!(
      &s.outcome,
      Outcome::Skipped { reason } if reason == "unable to open database file"
    )));
  }

  #[test]
  fn report_serializes_flat() {
    let mut report = RunReport::default();
    report.record::<FakeError>(Step::CreateTable(Table::StagingWines), Ok(None));
    report.record::<FakeError>(Step::PopulateDimension(Dimension::Winery), Ok(Some(3)));
    report.record(Step::PopulateFacts, Err(FakeError("boom".into())));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "steps": [
          { "step": "create_table", "target": "staging_wines", "status": "completed", "rows": null },
          { "step": "populate_dimension", "target": "winery", "status": "completed", "rows": 3 },
          { "step": "populate_facts", "status": "failed", "error": "boom" },
        ]
      })
    );
  }
}
