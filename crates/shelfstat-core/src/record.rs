//! Loan transactions, catalog entries, and their joined form.

use serde::{Deserialize, Serialize};

use crate::{recency::RecencyBucket, subject::SubjectBucket};

/// One checkout event as loaded from a yearly loan file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
  /// Catalog key; joins against [`BookMeta::registration_id`].
  pub registration_id: String,
  pub title:           String,
  /// The patron's affiliation. `None` when blank in the source.
  pub department:      Option<String>,
  pub call_number:     Option<String>,
  /// Raw date (or date-prefix) string as exported.
  pub loan_date:       Option<String>,
  pub year:            i32,
}

/// One catalog entry, unique per `registration_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMeta {
  pub registration_id:  String,
  pub publication_year: Option<i32>,
  pub author:           Option<String>,
  pub publisher:        Option<String>,
}

/// A loan left-joined to its catalog entry, plus derived buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedLoanRecord {
  pub loan:             LoanRecord,
  /// `None` when the catalog has no entry or no usable year.
  pub publication_year: Option<i32>,
  pub author:           Option<String>,
  pub publisher:        Option<String>,
  pub subject:          SubjectBucket,
  pub recency:          Option<RecencyBucket>,
}

impl EnrichedLoanRecord {
  pub fn department(&self) -> Option<&str> { self.loan.department.as_deref() }

  pub fn year(&self) -> i32 { self.loan.year }
}

/// Normalise a raw publication year.
///
/// The first four characters of the trimmed value must be ASCII digits;
/// anything else (empty, `nan`, `[n.d.]`, …) is unknown.
pub fn normalize_publication_year(raw: Option<&str>) -> Option<i32> {
  parse_year_prefix(raw?)
}

/// Derive a loan year from a date or date-prefix string such as
/// `2023-04-11` or `20230411`.
pub fn year_from_loan_date(loan_date: &str) -> Option<i32> {
  parse_year_prefix(loan_date)
}

fn parse_year_prefix(raw: &str) -> Option<i32> {
  let prefix: String = raw.trim().chars().take(4).collect();
  if prefix.len() != 4 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  prefix.parse().ok()
}

/// Treat empty or whitespace-only text as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
  value.and_then(|v| {
    let trimmed = v.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
  })
}
