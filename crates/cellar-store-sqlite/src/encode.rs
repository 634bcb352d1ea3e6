//! Conversions between frame cells, row types and SQLite values.
//!
//! Staging columns rely on SQLite type affinity, so a value read back may not
//! have the storage class its column declares (an unparseable `points` stays
//! TEXT). Decoding is therefore lenient: anything that does not fit the
//! target type reads as `None`.

use cellar_core::{
  frame::Cell,
  wine::{FactWine, STAGING_COLUMNS, StagingWine},
};
use rusqlite::{Row, types::Value};

use crate::{Error, Result};

// ─── Writes ──────────────────────────────────────────────────────────────────

pub fn encode_cell(cell: &Cell) -> Value {
  match cell {
    Cell::Null => Value::Null,
    Cell::Integer(i) => Value::Integer(*i),
    Cell::Real(r) => Value::Real(*r),
    Cell::Text(t) => Value::Text(t.clone()),
  }
}

/// Resolve a source header to its `staging_wines` column.
pub fn staging_column(header: &str) -> Result<&'static str> {
  STAGING_COLUMNS
    .iter()
    .find(|c| c.eq_ignore_ascii_case(header))
    .copied()
    .ok_or_else(|| Error::UnknownColumn(header.to_owned()))
}

// ─── Reads ───────────────────────────────────────────────────────────────────

fn decode_text(v: Value) -> Option<String> {
  match v {
    Value::Text(t) => Some(t),
    Value::Integer(i) => Some(i.to_string()),
    Value::Real(r) => Some(r.to_string()),
    Value::Null | Value::Blob(_) => None,
  }
}

fn decode_integer(v: Value) -> Option<i64> {
  match v {
    Value::Integer(i) => Some(i),
    Value::Real(r) if r.fract() == 0.0 => Some(r as i64),
    _ => None,
  }
}

fn decode_real(v: Value) -> Option<f64> {
  match v {
    Value::Real(r) => Some(r),
    Value::Integer(i) => Some(i as f64),
    _ => None,
  }
}

/// Column list matching [`read_staging`].
pub const STAGING_SELECT: &str = "SELECT vintage, country, county, designation, points, \
                                  price, province, title, variety, winery FROM staging_wines";

pub fn read_staging(row: &Row<'_>) -> rusqlite::Result<StagingWine> {
  Ok(StagingWine {
    vintage:     decode_text(row.get(0)?),
    country:     decode_text(row.get(1)?),
    county:      decode_text(row.get(2)?),
    designation: decode_text(row.get(3)?),
    points:      decode_integer(row.get(4)?),
    price:       decode_real(row.get(5)?),
    province:    decode_text(row.get(6)?),
    title:       decode_text(row.get(7)?),
    variety:     decode_text(row.get(8)?),
    winery:      decode_text(row.get(9)?),
  })
}

/// Column list matching [`read_fact`].
pub const FACT_SELECT: &str = "SELECT wine_id, title, winery_id, geography_id, variety_id, \
                               points, price, vintage FROM factwine ORDER BY wine_id";

pub fn read_fact(row: &Row<'_>) -> rusqlite::Result<FactWine> {
  Ok(FactWine {
    wine_id:      row.get(0)?,
    title:        decode_text(row.get(1)?),
    winery_id:    row.get(2)?,
    geography_id: row.get(3)?,
    variety_id:   row.get(4)?,
    points:       decode_integer(row.get(5)?),
    price:        decode_real(row.get(6)?),
    vintage:      decode_text(row.get(7)?),
  })
}
