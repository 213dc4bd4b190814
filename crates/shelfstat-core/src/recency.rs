//! New-vs-backlist classification.
//!
//! A title is NEW when it was published at most `window_years` before the
//! reference year, BACKLIST otherwise. The reference year is either a fixed
//! year (normally "this year") or the year of the loan itself, and callers
//! pick which through [`RecencyReference`].

use chrono::Datelike as _;
use serde::{Deserialize, Serialize};

/// Default NEW window, inclusive.
pub const DEFAULT_WINDOW_YEARS: i32 = 3;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecencyBucket {
  New,
  Backlist,
}

impl RecencyBucket {
  pub fn name(self) -> &'static str {
    match self {
      Self::New => "신간",
      Self::Backlist => "구간",
    }
  }
}

/// The year recency is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecencyReference {
  /// Measure every loan against the same year.
  Fixed { year: i32 },
  /// Measure each loan against the year it was borrowed.
  LoanYear,
}

impl RecencyReference {
  /// Fixed at the current calendar year of the local clock.
  pub fn current() -> Self {
    Self::Fixed {
      year: chrono::Local::now().year(),
    }
  }

  pub fn year_for(&self, loan_year: i32) -> i32 {
    match self {
      Self::Fixed { year } => *year,
      Self::LoanYear => loan_year,
    }
  }
}

impl Default for RecencyReference {
  fn default() -> Self { Self::current() }
}

/// Classify against an explicit reference year with the default window.
///
/// Returns `None` when the publication year is unknown; such records take
/// no part in NEW/BACKLIST views.
pub fn classify_recency(
  publication_year: Option<i32>,
  reference_year: i32,
) -> Option<RecencyBucket> {
  classify_with_window(publication_year, reference_year, DEFAULT_WINDOW_YEARS)
}

fn classify_with_window(
  publication_year: Option<i32>,
  reference_year: i32,
  window_years: i32,
) -> Option<RecencyBucket> {
  let published = publication_year?;
  if reference_year.saturating_sub(published) <= window_years {
    Some(RecencyBucket::New)
  } else {
    Some(RecencyBucket::Backlist)
  }
}

/// Reference mode plus window, applied to every loan during enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyPolicy {
  pub reference:    RecencyReference,
  pub window_years: i32,
}

impl RecencyPolicy {
  pub fn new(reference: RecencyReference) -> Self {
    Self {
      reference,
      window_years: DEFAULT_WINDOW_YEARS,
    }
  }

  pub fn classify(
    &self,
    publication_year: Option<i32>,
    loan_year: i32,
  ) -> Option<RecencyBucket> {
    classify_with_window(
      publication_year,
      self.reference.year_for(loan_year),
      self.window_years,
    )
  }
}

impl Default for RecencyPolicy {
  fn default() -> Self { Self::new(RecencyReference::default()) }
}
