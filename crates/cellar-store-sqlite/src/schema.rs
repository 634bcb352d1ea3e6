//! SQL schema for the cellar warehouse.
//!
//! One statement per table so a failure leaves only that table absent. Every
//! statement is idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

use cellar_core::schema::{Dimension, Table};

/// Applied to every connection on open.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

// Staging mirrors the source file. No key and no uniqueness: duplicate
// source rows are preserved.
const STAGING_WINES: &str = "
CREATE TABLE IF NOT EXISTS staging_wines (
    vintage     TEXT,
    country     TEXT,
    county      TEXT,
    designation TEXT,
    points      INTEGER,
    price       REAL,
    province    TEXT,
    title       TEXT,
    variety     TEXT,
    winery      TEXT
)";

const DIM_WINERY: &str = "
CREATE TABLE IF NOT EXISTS dimwinery (
    winery_id   INTEGER PRIMARY KEY,
    winery_name TEXT
)";

const DIM_GEOGRAPHY: &str = "
CREATE TABLE IF NOT EXISTS dimgeography (
    geography_id INTEGER PRIMARY KEY,
    country      TEXT,
    province     TEXT,
    county       TEXT
)";

const DIM_VARIETY: &str = "
CREATE TABLE IF NOT EXISTS dimvariety (
    variety_id INTEGER PRIMARY KEY,
    variety    TEXT
)";

// Many-to-one into each dimension.
const FACT_WINE: &str = "
CREATE TABLE IF NOT EXISTS factwine (
    wine_id      INTEGER PRIMARY KEY,
    title        TEXT,
    winery_id    INTEGER,
    geography_id INTEGER,
    variety_id   INTEGER,
    points       INTEGER,
    price        REAL,
    vintage      TEXT,
    FOREIGN KEY (winery_id)    REFERENCES dimwinery (winery_id),
    FOREIGN KEY (geography_id) REFERENCES dimgeography (geography_id),
    FOREIGN KEY (variety_id)   REFERENCES dimvariety (variety_id)
)";

pub fn create_table(table: Table) -> &'static str {
  match table {
    Table::StagingWines => STAGING_WINES,
    Table::DimWinery => DIM_WINERY,
    Table::DimGeography => DIM_GEOGRAPHY,
    Table::DimVariety => DIM_VARIETY,
    Table::FactWine => FACT_WINE,
  }
}

/// Dimension columns receiving the natural key, aligned with
/// [`Dimension::natural_key`].
pub fn dimension_columns(dimension: Dimension) -> &'static [&'static str] {
  match dimension {
    Dimension::Winery => &["winery_name"],
    Dimension::Variety => &["variety"],
    Dimension::Geography => &["country", "province", "county"],
  }
}

/// Copy the distinct natural keys of `dimension` out of staging.
pub fn populate_dimension(dimension: Dimension) -> String {
  format!(
    "INSERT INTO {table} ({columns})
     SELECT DISTINCT {keys} FROM staging_wines",
    table = dimension.table(),
    columns = dimension_columns(dimension).join(", "),
    keys = dimension.natural_key().join(", "),
  )
}

/// Plain equality joins: a NULL on any natural key never matches, so that
/// staging row produces no fact.
pub const POPULATE_FACTS: &str = "
INSERT INTO factwine (title, winery_id, geography_id, variety_id, points, price, vintage)
SELECT s.title, w.winery_id, g.geography_id, v.variety_id, s.points, s.price, s.vintage
FROM staging_wines s
JOIN dimwinery    w ON s.winery   = w.winery_name
JOIN dimgeography g ON s.country  = g.country
                   AND s.province = g.province
                   AND s.county   = g.county
JOIN dimvariety   v ON s.variety  = v.variety";
