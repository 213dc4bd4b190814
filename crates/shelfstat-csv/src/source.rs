//! [`CsvSource`], the CSV-directory implementation of [`DataSource`].

use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shelfstat_core::{
  checkout::{CheckoutColumns, CheckoutRow, parse_count},
  dataset::{DataSource, LoanBatch, SkippedYear},
  record::{BookMeta, LoanRecord, year_from_loan_date},
};

use crate::{
  Error, Result,
  rows::{RawBookMeta, RawLoan},
};

pub const CATALOG_FILE: &str = "book_meta.csv";
pub const CHECKOUT_FILE: &str = "loan_return_stats.csv";

/// How each loan row gets its `year`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum YearSource {
  /// The `<year>` of the `loan_<year>.csv` file name.
  #[default]
  FileName,
  /// The first four characters of `loan_date`, falling back to the file
  /// name when the date is missing or unparseable.
  LoanDate,
}

/// A directory of exported CSV files.
#[derive(Debug, Clone)]
pub struct CsvSource {
  dir:           PathBuf,
  year_source:   YearSource,
  catalog_file:  String,
  checkout_file: String,
}

impl CsvSource {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir:           dir.into(),
      year_source:   YearSource::default(),
      catalog_file:  CATALOG_FILE.to_owned(),
      checkout_file: CHECKOUT_FILE.to_owned(),
    }
  }

  pub fn with_year_source(mut self, year_source: YearSource) -> Self {
    self.year_source = year_source;
    self
  }

  pub fn with_catalog_file(mut self, name: impl Into<String>) -> Self {
    self.catalog_file = name.into();
    self
  }

  pub fn with_checkout_file(mut self, name: impl Into<String>) -> Self {
    self.checkout_file = name.into();
    self
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// `(year, path)` of every `loan_<year>.csv` in the directory, oldest
  /// first.
  pub fn loan_files(&self) -> Result<Vec<(i32, PathBuf)>> {
    let entries = fs::read_dir(&self.dir).map_err(|source| Error::Io {
      path: self.dir.clone(),
      source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|source| Error::Io {
        path: self.dir.clone(),
        source,
      })?;
      let name = entry.file_name();
      if let Some(year) = name.to_str().and_then(year_from_file_name) {
        files.push((year, entry.path()));
      }
    }
    files.sort();
    Ok(files)
  }

  fn read_year(&self, year: i32, path: &Path) -> Result<Vec<LoanRecord>> {
    let mut reader = open_reader(path)?;
    let mut records = Vec::new();
    let mut undated = 0usize;
    for row in reader.deserialize::<RawLoan>() {
      let raw = row?;
      let row_year = match self.year_source {
        YearSource::FileName => year,
        YearSource::LoanDate => raw
          .loan_date
          .as_deref()
          .and_then(year_from_loan_date)
          .unwrap_or_else(|| {
            undated += 1;
            year
          }),
      };
      records.push(raw.into_record(row_year));
    }
    if undated > 0 {
      tracing::debug!(year, undated, "loan dates unparseable; used file year");
    }
    Ok(records)
  }
}

impl DataSource for CsvSource {
  type Error = Error;

  fn load_loans(&self) -> Result<LoanBatch> {
    let files = self.loan_files()?;
    if files.is_empty() {
      return Err(Error::NoLoanFiles(self.dir.clone()));
    }

    let mut batch = LoanBatch::default();
    for (year, path) in files {
      match self.read_year(year, &path) {
        Ok(records) => {
          tracing::debug!(year, rows = records.len(), path = %path.display(), "loaded loan file");
          batch.records.extend(records);
        }
        Err(e) => {
          tracing::warn!(year, path = %path.display(), error = %e, "skipping unreadable loan file");
          batch.skipped.push(SkippedYear {
            year,
            reason: e.to_string(),
          });
        }
      }
    }
    Ok(batch)
  }

  fn load_catalog(&self) -> Result<Vec<BookMeta>> {
    let path = self.dir.join(&self.catalog_file);
    let mut reader = open_reader(&path)?;
    let catalog = reader
      .deserialize::<RawBookMeta>()
      .map(|row| row.map(BookMeta::from).map_err(Error::from))
      .collect::<Result<Vec<_>>>()?;
    tracing::debug!(entries = catalog.len(), path = %path.display(), "loaded catalog");
    Ok(catalog)
  }

  fn load_checkouts(&self) -> Result<Vec<CheckoutRow>> {
    let path = self.dir.join(&self.checkout_file);
    if !path.exists() {
      tracing::info!(path = %path.display(), "no loan/return statistics file");
      return Ok(Vec::new());
    }

    let mut reader = open_reader(&path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let columns = CheckoutColumns::resolve(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
      let record = record?;
      let field = |i: usize| record.get(i).unwrap_or_default().trim();
      let count = |i: usize, name: &'static str| {
        parse_count(field(i)).ok_or_else(|| Error::InvalidValue {
          path:  path.clone(),
          row:   index as u64 + 2,
          field: name,
          value: field(i).to_owned(),
        })
      };
      rows.push(CheckoutRow {
        institution:     field(columns.institution).to_owned(),
        patron_category: field(columns.patron_category).to_owned(),
        loan_count:      count(columns.loan_count, "loan_count")?,
        return_count:    count(columns.return_count, "return_count")?,
      });
    }
    Ok(rows)
  }
}

fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
  let file = fs::File::open(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(
    csv::ReaderBuilder::new()
      .trim(csv::Trim::Headers)
      .flexible(true)
      .from_reader(file),
  )
}

/// `loan_2023.csv` → `2023`.
fn year_from_file_name(name: &str) -> Option<i32> {
  let year = name.strip_prefix("loan_")?.strip_suffix(".csv")?;
  if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  year.parse().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_names_carry_the_year() {
    assert_eq!(year_from_file_name("loan_2023.csv"), Some(2023));
    assert_eq!(year_from_file_name("loan_23.csv"), None);
    assert_eq!(year_from_file_name("loan_2023.csv.bak"), None);
    assert_eq!(year_from_file_name("book_meta.csv"), None);
  }
}
