//! Terminal presentation sinks.

use std::io::{self, Write};

use shelfstat_core::{sink::Sink, table::Table};

/// Aligned plain-text tables.
pub struct TextSink<W> {
  out: W,
}

impl<W: Write> TextSink<W> {
  pub fn new(out: W) -> Self { Self { out } }
}

impl<W: Write> Sink for TextSink<W> {
  type Error = io::Error;

  fn emit(&mut self, table: &Table) -> io::Result<()> {
    let cells: Vec<Vec<String>> = table
      .rows
      .iter()
      .map(|row| row.iter().map(|c| c.to_string()).collect())
      .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| display_width(c)).collect();
    for row in &cells {
      for (width, cell) in widths.iter_mut().zip(row) {
        *width = (*width).max(display_width(cell));
      }
    }

    writeln!(self.out, "## {}", table.title)?;
    write_row(&mut self.out, &table.columns, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut self.out, &rule, &widths)?;
    if cells.is_empty() {
      writeln!(self.out, "(no data)")?;
    }
    for row in &cells {
      write_row(&mut self.out, row, &widths)?;
    }
    writeln!(self.out)
  }
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
  let mut line = String::new();
  for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
    if i > 0 {
      line.push_str("  ");
    }
    line.push_str(cell);
    line.extend(std::iter::repeat_n(' ', width.saturating_sub(display_width(cell))));
  }
  writeln!(out, "{}", line.trim_end())
}

/// Terminal column width: Hangul and CJK take two cells.
fn display_width(s: &str) -> usize {
  s.chars()
    .map(|c| match c as u32 {
      0x1100..=0x115F
      | 0x2E80..=0xA4CF
      | 0xAC00..=0xD7A3
      | 0xF900..=0xFAFF
      | 0xFF00..=0xFF60 => 2,
      _ => 1,
    })
    .sum()
}

/// One JSON object per table, one table per line.
pub struct JsonSink<W> {
  out: W,
}

impl<W: Write> JsonSink<W> {
  pub fn new(out: W) -> Self { Self { out } }
}

impl<W: Write> Sink for JsonSink<W> {
  type Error = io::Error;

  fn emit(&mut self, table: &Table) -> io::Result<()> {
    serde_json::to_writer(&mut self.out, table)?;
    writeln!(self.out)
  }
}
