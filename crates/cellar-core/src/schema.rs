//! Names of the warehouse tables and the dimension groups.
//!
//! Table and column names are an external contract; consumers query them
//! directly.

use std::fmt;

use serde::Serialize;

/// Every table, in creation order. The fact table references the three
/// dimensions, so it comes last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
  #[serde(rename = "staging_wines")]
  StagingWines,
  DimWinery,
  DimGeography,
  DimVariety,
  FactWine,
}

impl Table {
  pub const ALL: [Table; 5] = [
    Table::StagingWines,
    Table::DimWinery,
    Table::DimGeography,
    Table::DimVariety,
    Table::FactWine,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Table::StagingWines => "staging_wines",
      Table::DimWinery => "dimwinery",
      Table::DimGeography => "dimgeography",
      Table::DimVariety => "dimvariety",
      Table::FactWine => "factwine",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// An attribute group derived from staging into its own dimension table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
  Winery,
  Variety,
  /// The `(country, province, county)` triple.
  Geography,
}

impl Dimension {
  pub const ALL: [Dimension; 3] =
    [Dimension::Winery, Dimension::Variety, Dimension::Geography];

  pub fn table(self) -> Table {
    match self {
      Dimension::Winery => Table::DimWinery,
      Dimension::Variety => Table::DimVariety,
      Dimension::Geography => Table::DimGeography,
    }
  }

  /// Staging columns forming the natural key.
  pub fn natural_key(self) -> &'static [&'static str] {
    match self {
      Dimension::Winery => &["winery"],
      Dimension::Variety => &["variety"],
      Dimension::Geography => &["country", "province", "county"],
    }
  }
}

impl fmt::Display for Dimension {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.table().name())
  }
}
