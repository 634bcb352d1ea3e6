//! Wine CSV loading.
//!
//! The source `Price` column is a formatted currency string (`$1,234.00`).
//! Every `$` and `,` is stripped before kind inference, after which the
//! column must be numeric.

use std::{fs::File, io, path::Path};

use crate::{
  Error, Result,
  frame::{Cell, ColumnKind, Frame},
  wine::PRICE_COLUMN,
};

/// Load the wines file at `path`.
pub fn load_wines(path: impl AsRef<Path>) -> Result<Frame> {
  let path = path.as_ref();
  let frame = read_wines(File::open(path)?)?;
  tracing::info!(path = %path.display(), rows = frame.len(), "loaded wines file");
  Ok(frame)
}

/// Read wines CSV from any reader.
pub fn read_wines<R: io::Read>(reader: R) -> Result<Frame> {
  let frame = Frame::from_reader_with(reader, |header, value| {
    if header.eq_ignore_ascii_case(PRICE_COLUMN) {
      clean_price(&value)
    } else {
      value
    }
  })?;
  ensure_numeric_price(&frame)?;
  Ok(frame)
}

/// Remove currency symbols and thousands separators.
pub fn clean_price(raw: &str) -> String { raw.replace(['$', ','], "") }

fn ensure_numeric_price(frame: &Frame) -> Result<()> {
  let Some(idx) = frame.column_index(PRICE_COLUMN) else {
    return Ok(());
  };
  if frame.columns()[idx].kind != ColumnKind::Text {
    return Ok(());
  }

  // A text price column means at least one value failed to parse; report the
  // first one.
  for (row, cell) in frame.column_cells(idx).enumerate() {
    if let Cell::Text(value) = cell
      && value.parse::<f64>().map_or(true, |n| !n.is_finite())
    {
      return Err(Error::InvalidPrice {
        line:  frame.line(row).unwrap_or_default(),
        value: value.clone(),
      });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const HEADER: &str =
    "Vintage,Country,County,Designation,Points,Price,Province,Title,Variety,Winery\n";

  #[test]
  fn strips_currency_formatting() {
    assert_eq!(clean_price("$1,234.50"), "1234.50");
    assert_eq!(clean_price("45"), "45");
    assert_eq!(clean_price(""), "");
  }

  #[test]
  fn price_column_becomes_numeric() {
    let csv = format!(
      "{HEADER}2015,US,Napa,Reserve,90,\"$1,045.00\",California,Foo 2015 Merlot,Merlot,Foo Cellars\n\
       2016,US,Sonoma,,88,$20.00,California,Bar 2016 Pinot,Pinot Noir,Bar\n"
    );
    let frame = read_wines(csv.as_bytes()).unwrap();

    let idx = frame.column_index("price").unwrap();
    assert_eq!(frame.columns()[idx].kind, ColumnKind::Real);
    let prices: Vec<&Cell> = frame.column_cells(idx).collect();
    assert_eq!(prices, vec![&Cell::Real(1045.0), &Cell::Real(20.0)]);
  }

  #[test]
  fn missing_prices_are_null() {
    let csv = format!("{HEADER}2015,US,Napa,,90,,California,T,Merlot,Foo\n");
    let frame = read_wines(csv.as_bytes()).unwrap();
    let idx = frame.column_index("price").unwrap();
    assert!(frame.rows()[0][idx].is_null());
  }

  #[test]
  fn missing_value_marker_price_is_null() {
    let csv = format!(
      "{HEADER}2015,US,NA,,90,N/A,California,T,Merlot,Foo\n\
       2016,US,Napa,,88,$20.00,California,T,Merlot,Foo\n"
    );
    let frame = read_wines(csv.as_bytes()).unwrap();
    let idx = frame.column_index("price").unwrap();
    assert_eq!(frame.columns()[idx].kind, ColumnKind::Real);
    assert!(frame.rows()[0][idx].is_null());
    assert_eq!(frame.rows()[1][idx], Cell::Real(20.0));
  }

  #[test]
  fn na_county_is_null() {
    let csv = format!("{HEADER}2015,US,NA,,90,$45.00,California,T,Merlot,Foo\n");
    let frame = read_wines(csv.as_bytes()).unwrap();
    let idx = frame.column_index("county").unwrap();
    assert!(frame.rows()[0][idx].is_null());
  }

  #[test]
  fn unparseable_price_aborts_with_line() {
    let csv = format!(
      "{HEADER}2015,US,Napa,,90,$45.00,California,T,Merlot,Foo\n\
       2015,US,Napa,,90,ask,California,T,Merlot,Foo\n"
    );
    let err = read_wines(csv.as_bytes()).unwrap_err();
    match err {
      Error::InvalidPrice { line, value } => {
        assert_eq!(line, 3);
        assert_eq!(value, "ask");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn other_columns_keep_commas_and_dollars() {
    let csv = format!("{HEADER}2015,US,Napa,\"$ig, Reserve\",90,$45.00,California,T,Merlot,Foo\n");
    let frame = read_wines(csv.as_bytes()).unwrap();
    let idx = frame.column_index("designation").unwrap();
    assert_eq!(frame.rows()[0][idx], Cell::Text("$ig, Reserve".into()));
  }
}
