//! Raw row shapes as they appear in the exported CSV files, and their
//! conversion into core records.

use serde::Deserialize;
use shelfstat_core::record::{
  BookMeta, LoanRecord, non_blank, normalize_publication_year,
};

/// One row of `loan_<year>.csv`. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
pub struct RawLoan {
  #[serde(alias = "등록번호")]
  pub registration_id: String,
  #[serde(alias = "서명", default)]
  pub title:           String,
  #[serde(alias = "소속", default)]
  pub department:      Option<String>,
  #[serde(alias = "청구기호", default)]
  pub call_number:     Option<String>,
  #[serde(alias = "대출일자", alias = "대출일", default)]
  pub loan_date:       Option<String>,
}

impl RawLoan {
  pub fn into_record(self, year: i32) -> LoanRecord {
    LoanRecord {
      registration_id: self.registration_id.trim().to_owned(),
      title: self.title.trim().to_owned(),
      department: non_blank(self.department),
      call_number: non_blank(self.call_number),
      loan_date: non_blank(self.loan_date),
      year,
    }
  }
}

/// One row of `book_meta.csv`.
#[derive(Debug, Deserialize)]
pub struct RawBookMeta {
  #[serde(alias = "등록번호")]
  pub registration_id:  String,
  #[serde(alias = "출판년도", alias = "발행년도", default)]
  pub publication_year: Option<String>,
  #[serde(alias = "저자", default)]
  pub author:           Option<String>,
  #[serde(alias = "출판사", alias = "발행자", default)]
  pub publisher:        Option<String>,
}

impl From<RawBookMeta> for BookMeta {
  fn from(raw: RawBookMeta) -> Self {
    BookMeta {
      registration_id:  raw.registration_id.trim().to_owned(),
      publication_year: normalize_publication_year(raw.publication_year.as_deref()),
      author:           non_blank(raw.author),
      publisher:        non_blank(raw.publisher),
    }
  }
}
