//! CSV backend for shelfstat.
//!
//! Reads a data directory laid out as the library exports it:
//!
//! ```text
//! data/
//!   loan_2022.csv
//!   loan_2023.csv
//!   book_meta.csv
//!   loan_return_stats.csv   (optional)
//! ```
//!
//! Headers may be English (`registration_id`, `title`, …) or the Korean
//! export names (`등록번호`, `서명`, …).

mod rows;
mod source;

pub mod error;

pub use error::{Error, Result};
pub use source::{CATALOG_FILE, CHECKOUT_FILE, CsvSource, YearSource};

#[cfg(test)]
mod tests;
