//! Catalog enrichment: left-join loans to catalog entries and attach the
//! derived subject and recency buckets.

use std::collections::HashMap;

use crate::{
  recency::RecencyPolicy,
  record::{BookMeta, EnrichedLoanRecord, LoanRecord},
  subject::CodeTable,
};

/// The classifier configuration applied during enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
  pub code_table: CodeTable,
  pub recency:    RecencyPolicy,
}

/// Join `loans` against `catalog` on `registration_id`.
///
/// The join is left-preserving: every loan appears exactly once in the
/// output, in input order. Loans without a catalog entry keep a `None`
/// publication year and so an unknown recency. When the catalog repeats a
/// key, the first entry wins.
pub fn enrich(
  loans: Vec<LoanRecord>,
  catalog: &[BookMeta],
  classifier: &Classifier,
) -> Vec<EnrichedLoanRecord> {
  let mut index: HashMap<&str, &BookMeta> = HashMap::with_capacity(catalog.len());
  let mut duplicates = 0usize;
  for meta in catalog {
    if index.contains_key(meta.registration_id.as_str()) {
      duplicates += 1;
    } else {
      index.insert(meta.registration_id.as_str(), meta);
    }
  }
  if duplicates > 0 {
    tracing::debug!(duplicates, "catalog repeats registration ids; first entry kept");
  }

  let mut unmatched = 0usize;
  let enriched: Vec<_> = loans
    .into_iter()
    .map(|loan| {
      let meta = index.get(loan.registration_id.as_str()).copied();
      if meta.is_none() {
        unmatched += 1;
      }
      let publication_year = meta.and_then(|m| m.publication_year);
      EnrichedLoanRecord {
        subject: classifier.code_table.classify(loan.call_number.as_deref()),
        recency: classifier.recency.classify(publication_year, loan.year),
        publication_year,
        author: meta.and_then(|m| m.author.clone()),
        publisher: meta.and_then(|m| m.publisher.clone()),
        loan,
      }
    })
    .collect();

  tracing::debug!(
    loans = enriched.len(),
    unmatched,
    "enriched loans against catalog"
  );
  enriched
}
