//! Dashboard views: each one slices the shared dataset, aggregates it and
//! returns a [`Table`].

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  aggregate::{Dimension, aggregate, aggregate_within},
  checkout::summarize_checkouts,
  dataset::{Dataset, years_desc},
  department::DepartmentFilter,
  recency::RecencyBucket,
  record::EnrichedLoanRecord,
  sink::Sink,
  sparse::{DEFAULT_SPARSE_THRESHOLD, find_sparse},
  subject::SubjectBucket,
  table::{COUNT_COLUMN, Cell, Labeller, Table},
};

// ─── Top-N ───────────────────────────────────────────────────────────────────

/// A per-view row bound, constrained to `3..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TopN(usize);

impl TopN {
  pub const MIN: usize = 3;
  pub const MAX: usize = 10;

  pub fn new(n: usize) -> Result<Self> {
    if (Self::MIN..=Self::MAX).contains(&n) {
      Ok(Self(n))
    } else {
      Err(Error::TopNOutOfRange {
        got: n,
        min: Self::MIN,
        max: Self::MAX,
      })
    }
  }

  pub fn get(self) -> usize { self.0 }
}

impl Default for TopN {
  fn default() -> Self { Self(Self::MAX) }
}

impl TryFrom<usize> for TopN {
  type Error = Error;

  fn try_from(n: usize) -> Result<Self> { Self::new(n) }
}

impl From<TopN> for usize {
  fn from(n: TopN) -> Self { n.0 }
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
  pub labeller:         Labeller,
  pub filter:           DepartmentFilter,
  pub top_n:            TopN,
  pub sparse_threshold: usize,
}

impl Default for ViewSettings {
  fn default() -> Self {
    Self {
      labeller:         Labeller::default(),
      filter:           DepartmentFilter::default(),
      top_n:            TopN::default(),
      sparse_threshold: DEFAULT_SPARSE_THRESHOLD,
    }
  }
}

/// A year whose report could not be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearFailure {
  pub year:  i32,
  pub error: String,
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Every view over one dataset. Each call recomputes from the shared
/// records; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Dashboard {
  dataset:  Dataset,
  settings: ViewSettings,
}

impl Dashboard {
  pub fn new(dataset: Dataset, settings: ViewSettings) -> Self {
    Self { dataset, settings }
  }

  pub fn dataset(&self) -> &Dataset { &self.dataset }

  pub fn settings(&self) -> &ViewSettings { &self.settings }

  fn top_n(&self) -> Option<usize> { Some(self.settings.top_n.get()) }

  fn slice<'a>(
    &'a self,
    department: &'a str,
    year: i32,
    recency: Option<RecencyBucket>,
  ) -> impl Iterator<Item = &'a EnrichedLoanRecord> + 'a {
    self
      .dataset
      .for_department(department)
      .filter(move |r| r.year() == year)
      .filter(move |r| recency.is_none() || r.recency == recency)
  }

  /// Sorted, distinct departments passing the validity filter.
  pub fn departments(&self) -> Vec<String> {
    let mut departments: Vec<String> = self
      .dataset
      .records()
      .iter()
      .filter_map(|r| r.department())
      .filter(|d| self.settings.filter.is_valid(Some(*d)))
      .map(str::to_owned)
      .collect();
    departments.sort();
    departments.dedup();
    departments
  }

  /// Years with loans for `department`, newest first.
  pub fn years(&self, department: &str) -> Vec<i32> {
    years_desc(self.dataset.for_department(department))
  }

  /// Loans per year for one department, oldest year first.
  pub fn yearly_trend(&self, department: &str) -> Table {
    let mut result = aggregate(
      self.dataset.for_department(department),
      &[Dimension::Year],
      None,
    );
    result.rows.sort_by(|a, b| a.key.cmp(&b.key));
    self
      .settings
      .labeller
      .aggregation(format!("{department}: loans per year"), &result)
  }

  /// Most-borrowed titles for one department and year.
  pub fn top_titles(&self, department: &str, year: i32) -> Table {
    let result = aggregate(
      self.slice(department, year, None),
      &[Dimension::Title],
      self.top_n(),
    );
    self
      .settings
      .labeller
      .aggregation(format!("{department} {year}: top titles"), &result)
  }

  /// Most-borrowed subjects for one department and year, optionally only
  /// among NEW or BACKLIST titles.
  pub fn subject_ranking(
    &self,
    department: &str,
    year: i32,
    recency: Option<RecencyBucket>,
  ) -> Table {
    let result = aggregate(
      self.slice(department, year, recency),
      &[Dimension::Subject],
      self.top_n(),
    );
    let scope = recency.map_or("all".to_owned(), |r| r.to_string());
    self.settings.labeller.aggregation(
      format!("{department} {year}: top subjects ({scope})"),
      &result,
    )
  }

  /// Most-borrowed titles inside one subject of the ranking.
  pub fn top_titles_in_subject(
    &self,
    department: &str,
    year: i32,
    recency: Option<RecencyBucket>,
    subject: SubjectBucket,
  ) -> Table {
    let result = aggregate(
      self
        .slice(department, year, recency)
        .filter(|r| r.subject == subject),
      &[Dimension::Title],
      self.top_n(),
    );
    let label = self
      .settings
      .labeller
      .code_table
      .label(subject, self.settings.labeller.format);
    self.settings.labeller.aggregation(
      format!("{department} {year}: top titles in {label}"),
      &result,
    )
  }

  /// Top authors or publishers (or any other dimension) of each year for
  /// one department, years ascending.
  pub fn top_per_year(&self, department: &str, dimension: Dimension) -> Table {
    let result = aggregate_within(
      self.dataset.for_department(department),
      &[Dimension::Year],
      &[dimension],
      self.top_n(),
    );
    self
      .settings
      .labeller
      .partitioned(format!("{department}: top {dimension} per year"), &result)
  }

  /// Loan counts for every valid department × recognised subject pair.
  pub fn subject_heatmap(&self) -> Table {
    let filter = &self.settings.filter;
    let mut result = aggregate(
      self
        .dataset
        .records()
        .iter()
        .filter(|r| r.subject.is_recognized() && filter.is_valid(r.department())),
      &[Dimension::Department, Dimension::Subject],
      None,
    );
    result.rows.sort_by(|a, b| a.key.cmp(&b.key));
    self
      .settings
      .labeller
      .aggregation("loans by department and subject", &result)
  }

  /// Department × subject pairs borrowed at most `sparse_threshold` times.
  pub fn sparse(&self) -> Table {
    let threshold = self.settings.sparse_threshold;
    let mut table = Table::new(
      format!("department/subject pairs with at most {threshold} loans"),
      &["department", "subject", COUNT_COLUMN],
    );
    let labeller = &self.settings.labeller;
    table.rows = find_sparse(self.dataset.records(), &self.settings.filter, threshold)
      .into_iter()
      .map(|e| {
        vec![
          Cell::Text(e.department),
          Cell::Text(labeller.code_table.label(e.subject, labeller.format)),
          e.count.into(),
        ]
      })
      .collect();
    table
  }

  /// Loan and return totals per patron category.
  pub fn checkout_summary(&self, institution: Option<&str>) -> Table {
    let title = match institution {
      Some(i) => format!("{i}: loans and returns by patron category"),
      None => "loans and returns by patron category".to_owned(),
    };
    let mut table =
      Table::new(title, &["patron_category", "loan_count", "return_count"]);
    table.rows = summarize_checkouts(self.dataset.checkouts(), institution)
      .into_iter()
      .map(|s| {
        vec![
          Cell::Text(s.patron_category),
          s.loan_count.into(),
          s.return_count.into(),
        ]
      })
      .collect();
    table
  }

  /// The tables shown for one department and year.
  pub fn year_tables(&self, department: &str, year: i32) -> Vec<Table> {
    vec![
      self.top_titles(department, year),
      self.subject_ranking(department, year, None),
      self.subject_ranking(department, year, Some(RecencyBucket::New)),
      self.subject_ranking(department, year, Some(RecencyBucket::Backlist)),
    ]
  }

  /// Emit the department report to `sink`: the yearly trend, then each
  /// year's tables newest first.
  ///
  /// A sink failure while emitting one year is logged and recorded, and the
  /// remaining years are still emitted. A failure on the trend table aborts.
  pub fn emit_report<K: Sink>(
    &self,
    department: &str,
    sink: &mut K,
  ) -> Result<Vec<YearFailure>> {
    sink
      .emit(&self.yearly_trend(department))
      .map_err(|e| Error::Sink(Box::new(e)))?;

    let mut failures = Vec::new();
    for year in self.years(department) {
      let emitted = self
        .year_tables(department, year)
        .iter()
        .try_for_each(|table| sink.emit(table));
      if let Err(e) = emitted {
        tracing::warn!(year, error = %e, "failed to emit year report; continuing");
        failures.push(YearFailure {
          year,
          error: e.to_string(),
        });
      }
    }
    Ok(failures)
  }
}
