//! Display tables handed to the presentation layer.

use serde::Serialize;

use crate::{
  aggregate::{AggregationResult, Dimension, DimensionValue, PartitionedResult},
  subject::{CodeTable, LabelFormat},
};

/// Name of the count column in every aggregation table.
pub const COUNT_COLUMN: &str = "count";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
  Int(i64),
  Text(String),
  Null,
}

impl std::fmt::Display for Cell {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{n}"),
      Self::Text(s) => f.write_str(s),
      Self::Null => f.write_str("-"),
    }
  }
}

impl From<usize> for Cell {
  fn from(n: usize) -> Self { Self::Int(i64::try_from(n).unwrap_or(i64::MAX)) }
}

impl From<u64> for Cell {
  fn from(n: u64) -> Self { Self::Int(i64::try_from(n).unwrap_or(i64::MAX)) }
}

impl From<String> for Cell {
  fn from(s: String) -> Self { Self::Text(s) }
}

/// An ordered sequence of rows with named columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
  pub title:   String,
  pub columns: Vec<String>,
  pub rows:    Vec<Vec<Cell>>,
}

impl Table {
  pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
    Self {
      title:   title.into(),
      columns: columns.iter().map(|c| c.to_string()).collect(),
      rows:    Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Cells of one named column.
  pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
    let index = self.columns.iter().position(|c| c == name)?;
    Some(self.rows.iter().map(|r| &r[index]).collect())
  }
}

/// Renders dimension values for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Labeller {
  pub code_table: CodeTable,
  pub format:     LabelFormat,
}

impl Labeller {
  pub fn cell(&self, value: &DimensionValue) -> Cell {
    match value {
      DimensionValue::Year(y) => Cell::Int(i64::from(*y)),
      DimensionValue::Subject(b) => Cell::Text(self.code_table.label(*b, self.format)),
      DimensionValue::Recency(r) => Cell::Text(match self.format {
        LabelFormat::Code => r.to_string(),
        LabelFormat::Name => r.name().to_owned(),
      }),
      DimensionValue::Text(s) => Cell::Text(s.clone()),
      DimensionValue::Null => Cell::Null,
    }
  }

  /// One row per group: the key columns followed by `count`.
  pub fn aggregation(&self, title: impl Into<String>, result: &AggregationResult) -> Table {
    let mut columns = column_names(&result.dimensions);
    columns.push(COUNT_COLUMN.to_owned());
    Table {
      title: title.into(),
      columns,
      rows: result
        .rows
        .iter()
        .map(|row| {
          let mut cells: Vec<Cell> = row.key.0.iter().map(|v| self.cell(v)).collect();
          cells.push(row.count.into());
          cells
        })
        .collect(),
    }
  }

  /// Partitions concatenated in order: partition key columns, group key
  /// columns, `count`.
  pub fn partitioned(&self, title: impl Into<String>, result: &PartitionedResult) -> Table {
    let mut columns = column_names(&result.partition_by);
    columns.extend(column_names(&result.group_by));
    columns.push(COUNT_COLUMN.to_owned());

    let mut rows = Vec::new();
    for partition in &result.partitions {
      for row in &partition.rows {
        let mut cells: Vec<Cell> = partition
          .key
          .0
          .iter()
          .chain(&row.key.0)
          .map(|v| self.cell(v))
          .collect();
        cells.push(row.count.into());
        rows.push(cells);
      }
    }
    Table {
      title: title.into(),
      columns,
      rows,
    }
  }
}

fn column_names(dimensions: &[Dimension]) -> Vec<String> {
  dimensions.iter().map(|d| d.to_string()).collect()
}
