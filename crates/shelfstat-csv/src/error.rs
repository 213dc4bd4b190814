//! Error type for `shelfstat-csv`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] shelfstat_core::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("failed to read {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The data directory contains no `loan_<year>.csv` file.
  #[error("no loan_<year>.csv files in {0:?}")]
  NoLoanFiles(PathBuf),

  #[error("row {row} of {path:?}: invalid {field} value {value:?}")]
  InvalidValue {
    path:  PathBuf,
    row:   u64,
    field: &'static str,
    value: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
