//! Grouping, counting and top-N ranking over enriched loans.
//!
//! Groups are keyed by the values of an ordered list of [`Dimension`]s.
//! Counts use bag semantics. Rows are ranked by descending count with a
//! stable sort, so groups with equal counts keep the order in which they were
//! first seen in the input. Truncation to top-N happens after ranking and
//! therefore cuts ties at the boundary in first-seen order.

use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use serde::{Deserialize, Serialize};

use crate::{
  recency::RecencyBucket,
  record::EnrichedLoanRecord,
  subject::SubjectBucket,
};

// ─── Dimensions ──────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
  Year,
  Department,
  Subject,
  Recency,
  Author,
  Publisher,
  Title,
  RegistrationId,
}

/// The value of one dimension for one record. `Null` groups are kept as
/// their own group.
///
/// Ordering follows variant order, then value; `Null` sorts last.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum DimensionValue {
  Year(i32),
  Subject(SubjectBucket),
  Recency(RecencyBucket),
  Text(String),
  Null,
}

impl DimensionValue {
  fn text(value: Option<&str>) -> Self {
    value.map_or(Self::Null, |v| Self::Text(v.to_owned()))
  }
}

impl EnrichedLoanRecord {
  /// Project this record onto one grouping dimension.
  pub fn value(&self, dimension: Dimension) -> DimensionValue {
    match dimension {
      Dimension::Year => DimensionValue::Year(self.loan.year),
      Dimension::Department => DimensionValue::text(self.department()),
      Dimension::Subject => DimensionValue::Subject(self.subject),
      Dimension::Recency => {
        self.recency.map_or(DimensionValue::Null, DimensionValue::Recency)
      }
      Dimension::Author => DimensionValue::text(self.author.as_deref()),
      Dimension::Publisher => DimensionValue::text(self.publisher.as_deref()),
      Dimension::Title => DimensionValue::Text(self.loan.title.clone()),
      Dimension::RegistrationId => {
        DimensionValue::Text(self.loan.registration_id.clone())
      }
    }
  }

  fn key(&self, dimensions: &[Dimension]) -> AggregationKey {
    AggregationKey(dimensions.iter().map(|d| self.value(*d)).collect())
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// A tuple of dimension values, in the order the dimensions were requested.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AggregationKey(pub Vec<DimensionValue>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRow {
  pub key:   AggregationKey,
  pub count: usize,
}

/// Ranked groups, highest count first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
  pub dimensions: Vec<Dimension>,
  pub rows:       Vec<AggregationRow>,
}

impl AggregationResult {
  pub fn total(&self) -> usize { self.rows.iter().map(|r| r.count).sum() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

/// One partition of a [`PartitionedResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
  pub key:  AggregationKey,
  pub rows: Vec<AggregationRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionedResult {
  pub partition_by: Vec<Dimension>,
  pub group_by:     Vec<Dimension>,
  /// Partitions in ascending partition-key order.
  pub partitions:   Vec<Partition>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Count records per group, in first-seen group order.
fn count_groups<'a, I>(records: I, group_by: &[Dimension]) -> Vec<AggregationRow>
where
  I: IntoIterator<Item = &'a EnrichedLoanRecord>,
{
  let mut slots: HashMap<AggregationKey, usize> = HashMap::new();
  let mut rows: Vec<AggregationRow> = Vec::new();
  for record in records {
    match slots.entry(record.key(group_by)) {
      Entry::Occupied(slot) => rows[*slot.get()].count += 1,
      Entry::Vacant(slot) => {
        rows.push(AggregationRow {
          key:   slot.key().clone(),
          count: 1,
        });
        slot.insert(rows.len() - 1);
      }
    }
  }
  rows
}

fn rank(mut rows: Vec<AggregationRow>, top_n: Option<usize>) -> Vec<AggregationRow> {
  // `sort_by` is stable: equal counts keep first-seen order.
  rows.sort_by(|a, b| b.count.cmp(&a.count));
  if let Some(n) = top_n {
    rows.truncate(n);
  }
  rows
}

/// Group `records` by `group_by`, rank by descending count and keep the
/// first `top_n` rows (all rows when `top_n` is `None` or exceeds the number
/// of groups).
pub fn aggregate<'a, I>(
  records: I,
  group_by: &[Dimension],
  top_n: Option<usize>,
) -> AggregationResult
where
  I: IntoIterator<Item = &'a EnrichedLoanRecord>,
{
  AggregationResult {
    dimensions: group_by.to_vec(),
    rows:       rank(count_groups(records, group_by), top_n),
  }
}

/// Rank `group_by` groups separately inside each `partition_by` partition,
/// e.g. the top five authors of every year.
pub fn aggregate_within<'a, I>(
  records: I,
  partition_by: &[Dimension],
  group_by: &[Dimension],
  top_n: Option<usize>,
) -> PartitionedResult
where
  I: IntoIterator<Item = &'a EnrichedLoanRecord>,
{
  let mut members: BTreeMap<AggregationKey, Vec<&'a EnrichedLoanRecord>> =
    BTreeMap::new();
  for record in records {
    members.entry(record.key(partition_by)).or_default().push(record);
  }

  let partitions = members
    .into_iter()
    .map(|(key, records)| Partition {
      key,
      rows: rank(count_groups(records, group_by), top_n),
    })
    .collect();

  PartitionedResult {
    partition_by: partition_by.to_vec(),
    group_by: group_by.to_vec(),
    partitions,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::LoanRecord;

  fn record(title: &str, year: i32, author: Option<&str>) -> EnrichedLoanRecord {
    EnrichedLoanRecord {
      loan:             LoanRecord {
        registration_id: format!("reg-{title}"),
        title:           title.into(),
        department:      Some("CS".into()),
        call_number:     None,
        loan_date:       None,
        year,
      },
      publication_year: None,
      author:           author.map(Into::into),
      publisher:        None,
      subject:          SubjectBucket::Other,
      recency:          None,
    }
  }

  fn titles(result: &AggregationResult) -> Vec<(String, usize)> {
    result
      .rows
      .iter()
      .map(|r| match &r.key.0[0] {
        DimensionValue::Text(t) => (t.clone(), r.count),
        other => panic!("unexpected key {other:?}"),
      })
      .collect()
  }

  #[test]
  fn counts_and_ranks_titles() {
    let records = [
      record("T1", 2023, None),
      record("T1", 2023, None),
      record("T2", 2023, None),
    ];
    let result = aggregate(&records, &[Dimension::Title], Some(10));
    assert_eq!(titles(&result), [("T1".to_string(), 2), ("T2".to_string(), 1)]);
  }

  #[test]
  fn ties_keep_first_seen_order() {
    let records = [
      record("B", 2023, None),
      record("A", 2023, None),
      record("C", 2023, None),
      record("C", 2023, None),
      record("A", 2023, None),
      record("B", 2023, None),
    ];
    let result = aggregate(&records, &[Dimension::Title], None);
    assert_eq!(
      titles(&result),
      [("B".to_string(), 2), ("A".to_string(), 2), ("C".to_string(), 2)]
    );
  }

  #[test]
  fn truncation_cuts_ties_in_first_seen_order() {
    let records = [
      record("X", 2023, None),
      record("Y", 2023, None),
      record("Z", 2023, None),
      record("Z", 2023, None),
    ];
    let result = aggregate(&records, &[Dimension::Title], Some(2));
    assert_eq!(titles(&result), [("Z".to_string(), 2), ("X".to_string(), 1)]);
  }

  #[test]
  fn output_is_non_increasing_and_bounded() {
    let records: Vec<_> = (0..40)
      .map(|i| record(&format!("t{}", i % 7), 2020 + i % 3, None))
      .collect();
    let full = aggregate(&records, &[Dimension::Title, Dimension::Year], None);
    assert!(full.rows.windows(2).all(|w| w[0].count >= w[1].count));
    assert_eq!(full.total(), records.len());

    let top = aggregate(&records, &[Dimension::Title, Dimension::Year], Some(5));
    assert_eq!(top.rows.len(), 5);
    assert!(top.total() <= records.len());
    let smallest_kept = top.rows.last().unwrap().count;
    assert!(full.rows[5..].iter().all(|r| r.count <= smallest_kept));
  }

  #[test]
  fn oversized_top_n_returns_everything() {
    let records = [record("A", 2023, None), record("B", 2023, None)];
    assert_eq!(aggregate(&records, &[Dimension::Title], Some(10)).rows.len(), 2);
  }

  #[test]
  fn empty_input_yields_empty_result() {
    let result = aggregate(&[], &[Dimension::Title], Some(3));
    assert!(result.is_empty());
    assert_eq!(result.dimensions, [Dimension::Title]);
  }

  #[test]
  fn null_values_form_their_own_group() {
    let records = [
      record("A", 2023, None),
      record("B", 2023, Some("Kim")),
      record("C", 2023, None),
    ];
    let result = aggregate(&records, &[Dimension::Author], None);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0].key, AggregationKey(vec![DimensionValue::Null]));
    assert_eq!(result.rows[0].count, 2);
  }

  #[test]
  fn partitions_are_ranked_independently_in_key_order() {
    let records = [
      record("a", 2024, Some("Lee")),
      record("b", 2023, Some("Kim")),
      record("c", 2024, Some("Park")),
      record("d", 2024, Some("Park")),
      record("e", 2023, Some("Kim")),
      record("f", 2023, Some("Choi")),
    ];
    let result = aggregate_within(
      &records,
      &[Dimension::Year],
      &[Dimension::Author],
      Some(1),
    );
    let flat: Vec<_> = result
      .partitions
      .iter()
      .map(|p| (p.key.0[0].clone(), p.rows[0].key.0[0].clone(), p.rows[0].count))
      .collect();
    assert_eq!(
      flat,
      [
        (
          DimensionValue::Year(2023),
          DimensionValue::Text("Kim".into()),
          2
        ),
        (
          DimensionValue::Year(2024),
          DimensionValue::Text("Park".into()),
          2
        ),
      ]
    );
  }
}
