//! Row types for the staging table and the star schema.

use serde::{Deserialize, Serialize};

/// Header of the currency-formatted column in the source file.
pub const PRICE_COLUMN: &str = "price";

/// Staging columns in table order. Source headers are matched against these
/// case-insensitively.
pub const STAGING_COLUMNS: [&str; 10] = [
  "vintage",
  "country",
  "county",
  "designation",
  "points",
  "price",
  "province",
  "title",
  "variety",
  "winery",
];

/// One row of `staging_wines`, exactly as landed from the source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StagingWine {
  pub vintage:     Option<String>,
  pub country:     Option<String>,
  pub county:      Option<String>,
  pub designation: Option<String>,
  pub points:      Option<i64>,
  pub price:       Option<f64>,
  pub province:    Option<String>,
  pub title:       Option<String>,
  pub variety:     Option<String>,
  pub winery:      Option<String>,
}

/// One row of `factwine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactWine {
  pub wine_id:      i64,
  pub title:        Option<String>,
  pub winery_id:    i64,
  pub geography_id: i64,
  pub variety_id:   i64,
  pub points:       Option<i64>,
  pub price:        Option<f64>,
  pub vintage:      Option<String>,
}

/// Row counts of every table in the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TableCounts {
  pub staging:   u64,
  pub winery:    u64,
  pub geography: u64,
  pub variety:   u64,
  pub fact:      u64,
}

/// Aggregate over the non-null staging prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
  pub priced_rows: u64,
  pub average:     f64,
  pub max:         f64,
}
