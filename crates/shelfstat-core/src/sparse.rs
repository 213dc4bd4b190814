//! Sparse (dormant) department × subject pairings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  department::DepartmentFilter,
  record::EnrichedLoanRecord,
  subject::SubjectBucket,
};

pub const DEFAULT_SPARSE_THRESHOLD: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseEntry {
  pub department: String,
  pub subject:    SubjectBucket,
  pub count:      usize,
}

/// Find (department, subject) pairs borrowed at most `threshold` times.
///
/// Only recognised subjects and departments passing `filter` are counted.
/// Pairs never borrowed at all do not appear. Output is ordered by
/// department, then subject table order.
pub fn find_sparse<'a, I>(
  records: I,
  filter: &DepartmentFilter,
  threshold: usize,
) -> Vec<SparseEntry>
where
  I: IntoIterator<Item = &'a EnrichedLoanRecord>,
{
  let mut counts: BTreeMap<(&'a str, SubjectBucket), usize> = BTreeMap::new();
  for record in records {
    if !record.subject.is_recognized() || !filter.is_valid(record.department()) {
      continue;
    }
    if let Some(department) = record.department() {
      *counts.entry((department, record.subject)).or_default() += 1;
    }
  }

  counts
    .into_iter()
    .filter(|(_, count)| *count <= threshold)
    .map(|((department, subject), count)| SparseEntry {
      department: department.to_owned(),
      subject,
      count,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::LoanRecord;

  fn record(department: Option<&str>, subject: SubjectBucket) -> EnrichedLoanRecord {
    EnrichedLoanRecord {
      loan:             LoanRecord {
        registration_id: "r".into(),
        title:           "t".into(),
        department:      department.map(Into::into),
        call_number:     None,
        loan_date:       None,
        year:            2024,
      },
      publication_year: None,
      author:           None,
      publisher:        None,
      subject,
      recency:          None,
    }
  }

  #[test]
  fn keeps_only_pairs_at_or_below_threshold() {
    let mut records = vec![record(Some("CS"), SubjectBucket::General)];
    records.extend((0..3).map(|_| record(Some("CS"), SubjectBucket::Philosophy)));

    let sparse = find_sparse(&records, &DepartmentFilter::default(), 1);
    assert_eq!(
      sparse,
      [SparseEntry {
        department: "CS".into(),
        subject:    SubjectBucket::General,
        count:      1,
      }]
    );
  }

  #[test]
  fn skips_unknown_subjects_and_invalid_departments() {
    let records = [
      record(Some("CS"), SubjectBucket::Other),
      record(Some("도서관"), SubjectBucket::Arts),
      record(None, SubjectBucket::Arts),
      record(Some("  "), SubjectBucket::Arts),
    ];
    assert!(find_sparse(&records, &DepartmentFilter::default(), 1).is_empty());
  }

  #[test]
  fn output_is_sorted_by_department_then_subject() {
    let records = [
      record(Some("물리학과"), SubjectBucket::History),
      record(Some("기계공학과"), SubjectBucket::Literature),
      record(Some("기계공학과"), SubjectBucket::Arts),
    ];
    let pairs: Vec<_> = find_sparse(&records, &DepartmentFilter::default(), 1)
      .into_iter()
      .map(|e| (e.department, e.subject))
      .collect();
    assert_eq!(
      pairs,
      [
        ("기계공학과".to_string(), SubjectBucket::Arts),
        ("기계공학과".to_string(), SubjectBucket::Literature),
        ("물리학과".to_string(), SubjectBucket::History),
      ]
    );
  }

  #[test]
  fn higher_threshold_widens_the_net() {
    let records = [
      record(Some("CS"), SubjectBucket::Arts),
      record(Some("CS"), SubjectBucket::Arts),
    ];
    assert!(find_sparse(&records, &DepartmentFilter::default(), 1).is_empty());
    assert_eq!(find_sparse(&records, &DepartmentFilter::default(), 2).len(), 1);
  }
}
