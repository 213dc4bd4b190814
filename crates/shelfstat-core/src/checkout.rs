//! Loan/return statistics by patron category.
//!
//! The statistics export has no fixed header spelling, so its columns are
//! located by fuzzy substring matching. Each [`ColumnRole`] has a list of
//! patterns; headers are compared case-insensitively with whitespace
//! removed. A role that matches no header is a fatal error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnRole {
  Institution,
  PatronCategory,
  LoanCount,
  ReturnCount,
}

impl ColumnRole {
  fn patterns(self) -> &'static [&'static str] {
    match self {
      Self::Institution => &["기관", "도서관", "institution", "library"],
      Self::PatronCategory => &["구분", "이용자", "patron", "category"],
      Self::LoanCount => &["대출", "loan", "checkout"],
      Self::ReturnCount => &["반납", "return"],
    }
  }

  /// Headers carrying one of these are preferred over bare pattern matches.
  fn hints(self) -> &'static [&'static str] {
    match self {
      Self::LoanCount | Self::ReturnCount => &["건수", "횟수", "수", "count", "cnt"],
      Self::Institution | Self::PatronCategory => &[],
    }
  }
}

/// Resolution order; earlier roles claim headers first.
const RESOLUTION_ORDER: [ColumnRole; 4] = [
  ColumnRole::ReturnCount,
  ColumnRole::PatronCategory,
  ColumnRole::LoanCount,
  ColumnRole::Institution,
];

/// Column positions of the four roles within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutColumns {
  pub institution:     usize,
  pub patron_category: usize,
  pub loan_count:      usize,
  pub return_count:    usize,
}

impl CheckoutColumns {
  pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
    let normalized: Vec<String> = headers
      .iter()
      .map(|h| {
        h.as_ref()
          .chars()
          .filter(|c| !c.is_whitespace())
          .collect::<String>()
          .to_lowercase()
      })
      .collect();

    let mut claimed: HashMap<ColumnRole, usize> = HashMap::new();
    for role in RESOLUTION_ORDER {
      let free = |i: &usize| !claimed.values().any(|c| c == i);
      let matches = |i: &usize, terms: &[&str]| {
        terms.iter().any(|t| normalized[*i].contains(t))
      };
      let with_hint = (0..normalized.len()).find(|i| {
        free(i) && matches(i, role.patterns()) && matches(i, role.hints())
      });
      let found = with_hint.or_else(|| {
        (0..normalized.len()).find(|i| free(i) && matches(i, role.patterns()))
      });
      let Some(index) = found else {
        return Err(Error::MissingColumn {
          role,
          headers: headers.iter().map(|h| h.as_ref().to_owned()).collect(),
        });
      };
      tracing::debug!(%role, header = headers[index].as_ref(), "resolved column");
      claimed.insert(role, index);
    }

    Ok(Self {
      institution:     claimed[&ColumnRole::Institution],
      patron_category: claimed[&ColumnRole::PatronCategory],
      loan_count:      claimed[&ColumnRole::LoanCount],
      return_count:    claimed[&ColumnRole::ReturnCount],
    })
  }
}

/// One row of the loan/return statistics export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRow {
  pub institution:     String,
  pub patron_category: String,
  pub loan_count:      u64,
  pub return_count:    u64,
}

/// Parse a count such as `1,234`, ` 56 ` or `12.0`. Blank counts are zero.
/// Fractions, exponents, signs and anything beyond `u64` are rejected.
pub fn parse_count(raw: &str) -> Option<u64> {
  let digits: String = raw
    .chars()
    .filter(|c| !c.is_whitespace() && *c != ',')
    .collect();
  if digits.is_empty() {
    return Some(0);
  }
  let whole = match digits.split_once('.') {
    Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
    Some(_) => return None,
    None => &digits,
  };
  if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  whole.parse().ok()
}

/// Loan and return totals for one patron category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
  pub patron_category: String,
  pub loan_count:      u64,
  pub return_count:    u64,
}

/// Sum loans and returns per patron category, optionally for one
/// institution only. Highest loan count first; ties keep first-seen order.
pub fn summarize_checkouts(
  rows: &[CheckoutRow],
  institution: Option<&str>,
) -> Vec<CheckoutSummary> {
  let mut slots: HashMap<&str, usize> = HashMap::new();
  let mut summary: Vec<CheckoutSummary> = Vec::new();
  for row in rows {
    if institution.is_some_and(|i| i != row.institution) {
      continue;
    }
    let slot = *slots.entry(row.patron_category.as_str()).or_insert_with(|| {
      summary.push(CheckoutSummary {
        patron_category: row.patron_category.clone(),
        loan_count:      0,
        return_count:    0,
      });
      summary.len() - 1
    });
    let total = &mut summary[slot];
    total.loan_count = total.loan_count.saturating_add(row.loan_count);
    total.return_count = total.return_count.saturating_add(row.return_count);
  }
  summary.sort_by(|a, b| b.loan_count.cmp(&a.loan_count));
  summary
}
