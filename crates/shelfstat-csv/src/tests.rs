//! Loader tests against fixture directories under the system temp dir.

use std::{
  fs,
  path::{Path, PathBuf},
};

use shelfstat_core::{
  dataset::{DataSource, Dataset},
  enrich::Classifier,
  recency::{RecencyBucket, RecencyPolicy, RecencyReference},
  subject::{CodeTable, SubjectBucket},
  table::Cell,
  view::{Dashboard, ViewSettings},
};

use crate::{CsvSource, Error, YearSource};

/// A fresh, empty fixture directory, removed on drop.
struct Fixture {
  dir: PathBuf,
}

impl Fixture {
  fn new(name: &str) -> Self {
    let dir = std::env::temp_dir()
      .join(format!("shelfstat-csv-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create fixture dir");
    Self { dir }
  }

  fn write(&self, file: &str, contents: &str) -> &Self {
    fs::write(self.dir.join(file), contents).expect("write fixture file");
    self
  }

  fn path(&self) -> &Path { &self.dir }
}

impl Drop for Fixture {
  fn drop(&mut self) { let _ = fs::remove_dir_all(&self.dir); }
}

const CATALOG: &str = "\
registration_id,publication_year,author,publisher
R1,2022,Kim,Hanbit
R2,1999.,Lee,
R3,nan,,
";

// ─── Loans ───────────────────────────────────────────────────────────────────

#[test]
fn loads_every_year_file_in_order() {
  let fx = Fixture::new("years");
  fx.write(
    "loan_2024.csv",
    "registration_id,title,department,call_number,loan_date\n\
     R1,Rust,CS,005.1,2024-03-01\n",
  )
  .write(
    "loan_2023.csv",
    "registration_id,title,department,call_number,loan_date\n\
     R2,Poems,CS,811,2023-05-01\n\
     R2,Poems,,811,2023-05-02\n",
  )
  .write("notes.txt", "ignored");

  let batch = CsvSource::new(fx.path()).load_loans().unwrap();
  let years: Vec<_> = batch.records.iter().map(|r| r.year).collect();
  assert_eq!(years, [2023, 2023, 2024]);
  assert_eq!(batch.records[1].department, None);
  assert!(batch.skipped.is_empty());
}

#[test]
fn korean_headers_are_accepted() {
  let fx = Fixture::new("korean");
  fx.write(
    "loan_2023.csv",
    "등록번호,서명,소속,청구기호,대출일자,비고\nR1,러스트 프로그래밍,컴퓨터공학과,005.13,2023-09-01,x\n",
  )
  .write(
    "book_meta.csv",
    "등록번호,출판년도,저자,출판사\nR1,2021년,홍길동,한빛\n",
  );

  let source = CsvSource::new(fx.path());
  let loans = source.load_loans().unwrap().records;
  assert_eq!(loans[0].registration_id, "R1");
  assert_eq!(loans[0].department.as_deref(), Some("컴퓨터공학과"));
  assert_eq!(loans[0].call_number.as_deref(), Some("005.13"));

  let catalog = source.load_catalog().unwrap();
  assert_eq!(catalog[0].publication_year, Some(2021));
  assert_eq!(catalog[0].publisher.as_deref(), Some("한빛"));
}

#[test]
fn loan_date_year_source_falls_back_to_file_year() {
  let fx = Fixture::new("loan-date");
  fx.write(
    "loan_2023.csv",
    "registration_id,title,department,call_number,loan_date\n\
     R1,A,CS,100,2022-12-31\n\
     R1,A,CS,100,\n",
  );

  let batch = CsvSource::new(fx.path())
    .with_year_source(YearSource::LoanDate)
    .load_loans()
    .unwrap();
  let years: Vec<_> = batch.records.iter().map(|r| r.year).collect();
  assert_eq!(years, [2022, 2023]);
}

#[test]
fn unreadable_year_is_skipped_not_fatal() {
  let fx = Fixture::new("skip");
  fx.write(
    "loan_2022.csv",
    "title,department\nmissing key column,CS\n",
  )
  .write(
    "loan_2023.csv",
    "registration_id,title,department,call_number,loan_date\nR1,A,CS,100,\n",
  );

  let batch = CsvSource::new(fx.path()).load_loans().unwrap();
  assert_eq!(batch.records.len(), 1);
  assert_eq!(batch.skipped.len(), 1);
  assert_eq!(batch.skipped[0].year, 2022);
}

#[test]
fn empty_directory_is_an_error() {
  let fx = Fixture::new("empty");
  let err = CsvSource::new(fx.path()).load_loans().unwrap_err();
  assert!(matches!(err, Error::NoLoanFiles(_)));
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[test]
fn catalog_normalizes_publication_years() {
  let fx = Fixture::new("catalog");
  fx.write("book_meta.csv", CATALOG);

  let catalog = CsvSource::new(fx.path()).load_catalog().unwrap();
  let years: Vec<_> = catalog.iter().map(|m| m.publication_year).collect();
  assert_eq!(years, [Some(2022), Some(1999), None]);
  assert_eq!(catalog[1].publisher, None);
  assert_eq!(catalog[2].author, None);
}

#[test]
fn missing_catalog_is_an_io_error() {
  let fx = Fixture::new("no-catalog");
  let err = CsvSource::new(fx.path()).load_catalog().unwrap_err();
  assert!(matches!(err, Error::Io { .. }));
}

// ─── Loan/return statistics ──────────────────────────────────────────────────

#[test]
fn checkout_file_is_optional() {
  let fx = Fixture::new("no-checkouts");
  assert!(CsvSource::new(fx.path()).load_checkouts().unwrap().is_empty());
}

#[test]
fn checkout_columns_are_matched_fuzzily() {
  let fx = Fixture::new("checkouts");
  fx.write(
    "loan_return_stats.csv",
    "도서관 명,이용자 구분,대출 건수,반납 건수\n본관,학부생,\"1,204\",1100\n본관,교직원,88,90\n",
  );

  let rows = CsvSource::new(fx.path()).load_checkouts().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].institution, "본관");
  assert_eq!(rows[0].patron_category, "학부생");
  assert_eq!(rows[0].loan_count, 1204);
  assert_eq!(rows[1].return_count, 90);
}

#[test]
fn checkout_file_without_return_column_is_fatal() {
  let fx = Fixture::new("checkouts-missing");
  fx.write("loan_return_stats.csv", "기관,구분,대출건수\n본관,학부생,3\n");

  let err = CsvSource::new(fx.path()).load_checkouts().unwrap_err();
  assert!(matches!(
    err,
    Error::Core(shelfstat_core::Error::MissingColumn { .. })
  ));
}

#[test]
fn checkout_with_garbled_count_is_reported() {
  let fx = Fixture::new("checkouts-garbled");
  fx.write("loan_return_stats.csv", "기관,구분,대출건수,반납건수\n본관,학부생,many,3\n");

  let err = CsvSource::new(fx.path()).load_checkouts().unwrap_err();
  match err {
    Error::InvalidValue { row, field, .. } => {
      assert_eq!(row, 2);
      assert_eq!(field, "loan_count");
    }
    other => panic!("unexpected error {other}"),
  }
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[test]
fn directory_to_dashboard() {
  let fx = Fixture::new("e2e");
  fx.write(
    "loan_2023.csv",
    "registration_id,title,department,call_number,loan_date\n\
     R1,T1,CS,813.7,2023-03-01\n\
     R1,T1,CS,813.7,2023-03-09\n\
     R2,T2,CS,005.1,2023-04-01\n\
     R3,T3,도서관,100,2023-04-02\n",
  )
  .write("book_meta.csv", CATALOG);

  let classifier = Classifier {
    code_table: CodeTable::default(),
    recency:    RecencyPolicy::new(RecencyReference::Fixed { year: 2025 }),
  };
  let dataset = Dataset::load(&CsvSource::new(fx.path()), &classifier).unwrap();
  assert_eq!(dataset.records().len(), 4);
  assert_eq!(dataset.records()[0].subject, SubjectBucket::Literature);
  assert_eq!(dataset.records()[0].recency, Some(RecencyBucket::New));
  assert_eq!(dataset.records()[2].recency, Some(RecencyBucket::Backlist));
  assert_eq!(dataset.records()[3].recency, None);

  let board = Dashboard::new(dataset, ViewSettings::default());
  assert_eq!(board.departments(), ["CS"]);
  let top = board.top_titles("CS", 2023);
  assert_eq!(
    top.rows,
    [
      vec![Cell::Text("T1".into()), Cell::Int(2)],
      vec![Cell::Text("T2".into()), Cell::Int(1)],
    ]
  );
}
