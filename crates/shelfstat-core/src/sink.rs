//! The presentation sink that receives computed tables.

use std::convert::Infallible;

use crate::table::Table;

/// Receives finished tables for display. Rendering is entirely the
/// implementor's concern.
pub trait Sink {
  type Error: std::error::Error + Send + Sync + 'static;

  fn emit(&mut self, table: &Table) -> Result<(), Self::Error>;
}

/// Collects tables in memory.
impl Sink for Vec<Table> {
  type Error = Infallible;

  fn emit(&mut self, table: &Table) -> Result<(), Self::Error> {
    self.push(table.clone());
    Ok(())
  }
}
