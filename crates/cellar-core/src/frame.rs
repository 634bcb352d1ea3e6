//! In-memory tabular data read from a comma-separated file.
//!
//! A [`Frame`] holds one column per header field. Column kinds are inferred
//! once at load time: a column is numeric only when every non-empty value in
//! it parses as a number. Empty fields and the usual missing-value markers
//! (`NA`, `N/A`, `NaN`, `null`, ...) become [`Cell::Null`].

use std::{fmt, io};

use crate::Result;

/// Field values read as missing, in addition to the empty string.
pub const NA_TOKENS: &[&str] = &[
  "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
  "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(value: &str) -> bool { value.is_empty() || NA_TOKENS.contains(&value) }

// ─── Column kinds ────────────────────────────────────────────────────────────

/// The inferred storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Integer,
  Real,
  Text,
}

impl ColumnKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ColumnKind::Integer => "integer",
      ColumnKind::Real => "real",
      ColumnKind::Text => "text",
    }
  }

  /// Pick the narrowest kind that every present value parses as.
  fn infer<'a>(values: impl Iterator<Item = &'a str> + Clone) -> Self {
    let mut present = values.clone().peekable();
    if present.peek().is_none() {
      return ColumnKind::Text;
    }
    if values.clone().all(|v| v.parse::<i64>().is_ok()) {
      ColumnKind::Integer
    } else if values.clone().all(|v| parse_real(v).is_some()) {
      ColumnKind::Real
    } else {
      ColumnKind::Text
    }
  }
}

impl fmt::Display for ColumnKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

fn parse_real(v: &str) -> Option<f64> {
  v.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ─── Cells ───────────────────────────────────────────────────────────────────

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Cell {
  fn coerce(kind: ColumnKind, raw: Option<String>) -> Self {
    let Some(raw) = raw else { return Cell::Null };
    match kind {
      ColumnKind::Integer => raw.parse().map(Cell::Integer).unwrap_or(Cell::Text(raw)),
      ColumnKind::Real => parse_real(&raw).map(Cell::Real).unwrap_or(Cell::Text(raw)),
      ColumnKind::Text => Cell::Text(raw),
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Cell::Null) }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
  pub name: String,
  pub kind: ColumnKind,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
  columns: Vec<Column>,
  rows:    Vec<Vec<Cell>>,
  /// Source line of each row, for diagnostics.
  lines:   Vec<u64>,
}

impl Frame {
  pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
    Self::from_reader_with(reader, |_, value| value)
  }

  /// Read a frame, passing every raw field through `scrub` before missing-value
  /// detection and kind inference. `scrub` receives the column header.
  ///
  /// Records with a different field count than the header fail the whole
  /// read.
  pub fn from_reader_with<R, F>(reader: R, mut scrub: F) -> Result<Self>
  where
    R: io::Read,
    F: FnMut(&str, String) -> String,
  {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut lines = Vec::new();

    for record in reader.records() {
      let record = record?;
      lines.push(record.position().map_or(0, |p| p.line()));
      for (idx, field) in record.iter().enumerate() {
        let value = scrub(&headers[idx], field.to_owned());
        raw_columns[idx].push((!is_missing(&value)).then_some(value));
      }
    }

    let kinds: Vec<ColumnKind> = raw_columns
      .iter()
      .map(|values| ColumnKind::infer(values.iter().flatten().map(String::as_str)))
      .collect();

    let mut rows: Vec<Vec<Cell>> = (0..lines.len())
      .map(|_| Vec::with_capacity(headers.len()))
      .collect();
    for (kind, values) in kinds.iter().zip(raw_columns) {
      for (row, raw) in rows.iter_mut().zip(values) {
        row.push(Cell::coerce(*kind, raw));
      }
    }

    let columns = headers
      .into_iter()
      .zip(kinds)
      .map(|(name, kind)| Column { name, kind })
      .collect();

    Ok(Self { columns, rows, lines })
  }

  pub fn columns(&self) -> &[Column] { &self.columns }

  pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Source line number of row `idx` (1-based, header is line 1).
  pub fn line(&self, idx: usize) -> Option<u64> { self.lines.get(idx).copied() }

  /// Case-insensitive header lookup.
  pub fn column_index(&self, name: &str) -> Option<usize> {
    self
      .columns
      .iter()
      .position(|c| c.name.eq_ignore_ascii_case(name))
  }

  /// Iterate the cells of column `idx` top to bottom.
  pub fn column_cells(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
    self.rows.iter().map(move |row| &row[idx])
  }

  /// `(header, kind)` pairs in header order.
  pub fn dtypes(&self) -> Vec<(&str, ColumnKind)> {
    self
      .columns
      .iter()
      .map(|c| (c.name.as_str(), c.kind))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn infers_column_kinds() {
    let csv = "name,points,price,note\nA,90,12.5,\nB,85,7,x\n";
    let frame = Frame::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(frame.dtypes(), vec![
      ("name", ColumnKind::Text),
      ("points", ColumnKind::Integer),
      ("price", ColumnKind::Real),
      ("note", ColumnKind::Text),
    ]);
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.rows()[1][2], Cell::Real(7.0));
  }

  #[test]
  fn empty_fields_are_null_and_do_not_block_inference() {
    let csv = "points,county\n90,\n,Napa\n";
    let frame = Frame::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(frame.columns()[0].kind, ColumnKind::Integer);
    assert_eq!(frame.rows()[0][1], Cell::Null);
    assert!(frame.rows()[1][0].is_null());
  }

  #[test]
  fn missing_value_markers_are_null() {
    let csv = "points,county\n90,NA\nN/A,Napa\nnan,null\n";
    let frame = Frame::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(frame.columns()[0].kind, ColumnKind::Integer);
    assert!(frame.rows()[0][1].is_null());
    assert!(frame.rows()[1][0].is_null());
    assert!(frame.rows()[2][0].is_null());
    assert!(frame.rows()[2][1].is_null());
    assert_eq!(frame.rows()[1][1], Cell::Text("Napa".into()));
  }

  #[test]
  fn markers_are_case_sensitive() {
    let frame = Frame::from_reader("county\nNa\n".as_bytes()).unwrap();
    assert_eq!(frame.rows()[0][0], Cell::Text("Na".into()));
  }

  #[test]
  fn all_empty_column_is_text() {
    let frame = Frame::from_reader("a,b\n1,\n2,\n".as_bytes()).unwrap();
    assert_eq!(frame.columns()[1].kind, ColumnKind::Text);
  }

  #[test]
  fn non_finite_values_stay_text() {
    let frame = Frame::from_reader("x\n1.5\ninf\n".as_bytes()).unwrap();
    assert_eq!(frame.columns()[0].kind, ColumnKind::Text);
    assert_eq!(frame.rows()[0][0], Cell::Text("1.5".into()));
  }

  #[test]
  fn wrong_field_count_is_a_parse_error() {
    let err = Frame::from_reader("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Csv(_)));
  }

  #[test]
  fn column_lookup_ignores_case() {
    let frame = Frame::from_reader("Price,Winery\n1,Foo\n".as_bytes()).unwrap();
    assert_eq!(frame.column_index("price"), Some(0));
    assert_eq!(frame.column_index("WINERY"), Some(1));
    assert_eq!(frame.column_index("variety"), None);
  }

  #[test]
  fn records_source_lines() {
    let frame = Frame::from_reader("a\n1\n2\n".as_bytes()).unwrap();
    assert_eq!(frame.line(0), Some(2));
    assert_eq!(frame.line(1), Some(3));
  }
}
