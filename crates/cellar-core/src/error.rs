//! Error types for `cellar-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// A price that is still not numeric after stripping `$` and `,`.
  #[error("invalid price on line {line}: {value:?}")]
  InvalidPrice { line: u64, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
