//! The loaded dataset and the `DataSource` abstraction that produces it.
//!
//! A [`Dataset`] is immutable after construction and cheap to clone; every
//! view reads from the same shared records. [`DatasetCache`] loads it on
//! first access and keeps it until explicitly cleared.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  checkout::CheckoutRow,
  enrich::{Classifier, enrich},
  record::{BookMeta, EnrichedLoanRecord, LoanRecord},
};

// ─── Source ──────────────────────────────────────────────────────────────────

/// A yearly loan file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedYear {
  pub year:   i32,
  pub reason: String,
}

/// Loan records from every readable year, plus the years that were skipped.
#[derive(Debug, Clone, Default)]
pub struct LoanBatch {
  pub records: Vec<LoanRecord>,
  pub skipped: Vec<SkippedYear>,
}

/// Abstraction over wherever loan and catalog data lives.
///
/// Implemented by storage backends (e.g. `shelfstat-csv`). A failure to load
/// one year's loans should be reported through [`LoanBatch::skipped`] rather
/// than as an error.
pub trait DataSource {
  type Error: std::error::Error + Send + Sync + 'static;

  fn load_loans(&self) -> Result<LoanBatch, Self::Error>;

  fn load_catalog(&self) -> Result<Vec<BookMeta>, Self::Error>;

  /// Loan/return statistics. Sources without such data return an empty list.
  fn load_checkouts(&self) -> Result<Vec<CheckoutRow>, Self::Error>;
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Inner {
  records:   Vec<EnrichedLoanRecord>,
  checkouts: Vec<CheckoutRow>,
  skipped:   Vec<SkippedYear>,
}

/// Shared, read-only enriched loan data.
///
/// Cloning is cheap; the records are reference-counted.
#[derive(Debug, Clone)]
pub struct Dataset {
  inner: Arc<Inner>,
}

impl Dataset {
  pub fn build(
    loans: LoanBatch,
    catalog: &[BookMeta],
    checkouts: Vec<CheckoutRow>,
    classifier: &Classifier,
  ) -> Self {
    let records = enrich(loans.records, catalog, classifier);
    Self {
      inner: Arc::new(Inner {
        records,
        checkouts,
        skipped: loans.skipped,
      }),
    }
  }

  /// Load everything from `source` and enrich it.
  pub fn load<S: DataSource>(source: &S, classifier: &Classifier) -> Result<Self> {
    let source_err = |e: S::Error| Error::Source(Box::new(e));
    let loans = source.load_loans().map_err(source_err)?;
    let catalog = source.load_catalog().map_err(source_err)?;
    let checkouts = source.load_checkouts().map_err(source_err)?;
    tracing::info!(
      loans = loans.records.len(),
      catalog = catalog.len(),
      checkouts = checkouts.len(),
      skipped_years = loans.skipped.len(),
      "dataset loaded"
    );
    Ok(Self::build(loans, &catalog, checkouts, classifier))
  }

  pub fn records(&self) -> &[EnrichedLoanRecord] { &self.inner.records }

  pub fn checkouts(&self) -> &[CheckoutRow] { &self.inner.checkouts }

  pub fn skipped_years(&self) -> &[SkippedYear] { &self.inner.skipped }

  /// Loans of one department.
  pub fn for_department<'a>(
    &'a self,
    department: &'a str,
  ) -> impl Iterator<Item = &'a EnrichedLoanRecord> + 'a {
    self
      .records()
      .iter()
      .filter(move |r| r.department() == Some(department))
  }

  /// Distinct loan years, newest first.
  pub fn years(&self) -> Vec<i32> { years_desc(self.records().iter()) }
}

pub(crate) fn years_desc<'a>(
  records: impl Iterator<Item = &'a EnrichedLoanRecord>,
) -> Vec<i32> {
  let mut years: Vec<i32> = records.map(|r| r.year()).collect();
  years.sort_unstable_by(|a, b| b.cmp(a));
  years.dedup();
  years
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Load-once holder for a [`Dataset`].
///
/// The first [`get`](Self::get) loads from the source; later calls return
/// the same shared dataset until [`clear`](Self::clear) is called.
pub struct DatasetCache<S> {
  source:     S,
  classifier: Classifier,
  slot:       RwLock<Option<Dataset>>,
}

impl<S: DataSource> DatasetCache<S> {
  pub fn new(source: S, classifier: Classifier) -> Self {
    Self {
      source,
      classifier,
      slot: RwLock::new(None),
    }
  }

  pub fn get(&self) -> Result<Dataset> {
    if let Some(dataset) = self
      .slot
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
    {
      return Ok(dataset.clone());
    }

    let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(dataset) = slot.as_ref() {
      return Ok(dataset.clone());
    }
    let dataset = Dataset::load(&self.source, &self.classifier)?;
    *slot = Some(dataset.clone());
    Ok(dataset)
  }

  /// Drop the cached dataset; the next `get` reloads from the source.
  pub fn clear(&self) {
    tracing::debug!("dataset cache cleared");
    *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
  }

  pub fn source(&self) -> &S { &self.source }

  pub fn classifier(&self) -> &Classifier { &self.classifier }
}
