//! Layered configuration: TOML file, then `SHELFSTAT_*` environment
//! variables, then command-line overrides applied by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use shelfstat_core::{
  department::DepartmentFilter,
  enrich::Classifier,
  recency::{DEFAULT_WINDOW_YEARS, RecencyPolicy, RecencyReference},
  sparse::DEFAULT_SPARSE_THRESHOLD,
  subject::{CodeTable, CodeTableKind, LabelFormat},
  table::Labeller,
  view::{TopN, ViewSettings},
};
use shelfstat_csv::{CATALOG_FILE, CHECKOUT_FILE, CsvSource, YearSource};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub data_dir:          PathBuf,
  pub reference:         RecencyReference,
  pub new_window_years:  i32,
  pub top_n:             TopN,
  pub code_table:        CodeTableKind,
  pub label:             LabelFormat,
  pub department_filter: DepartmentFilter,
  pub year_source:       YearSource,
  pub sparse_threshold:  usize,
  pub catalog_file:      String,
  pub checkout_file:     String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir:          PathBuf::from("."),
      reference:         RecencyReference::current(),
      new_window_years:  DEFAULT_WINDOW_YEARS,
      top_n:             TopN::default(),
      code_table:        CodeTableKind::default(),
      label:             LabelFormat::default(),
      department_filter: DepartmentFilter::default(),
      year_source:       YearSource::default(),
      sparse_threshold:  DEFAULT_SPARSE_THRESHOLD,
      catalog_file:      CATALOG_FILE.to_owned(),
      checkout_file:     CHECKOUT_FILE.to_owned(),
    }
  }
}

impl Settings {
  /// Read `path` (if it exists) and the `SHELFSTAT_*` environment. Nested
  /// keys use a double underscore, e.g. `SHELFSTAT_REFERENCE__MODE`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with(path, environment())
  }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn classifier(&self) -> Classifier {
    Classifier {
      code_table: CodeTable::new(self.code_table),
      recency:    RecencyPolicy {
        reference:    self.reference,
        window_years: self.new_window_years,
      },
    }
  }

  pub fn view_settings(&self) -> ViewSettings {
    ViewSettings {
      labeller:         Labeller {
        code_table: CodeTable::new(self.code_table),
        format:     self.label,
      },
      filter:           self.department_filter.clone(),
      top_n:            self.top_n,
      sparse_threshold: self.sparse_threshold,
    }
  }

  pub fn source(&self) -> CsvSource {
    CsvSource::new(&self.data_dir)
      .with_year_source(self.year_source)
      .with_catalog_file(&self.catalog_file)
      .with_checkout_file(&self.checkout_file)
  }
}

/// `SHELFSTAT_TOP_N`, `SHELFSTAT_REFERENCE__MODE`, ...
fn environment() -> config::Environment {
  config::Environment::with_prefix("SHELFSTAT")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(toml: &str) -> Settings {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_yields_defaults() {
    let settings = from_toml("");
    assert_eq!(settings.top_n, TopN::default());
    assert_eq!(settings.code_table, CodeTableKind::Digit);
    assert_eq!(settings.department_filter, DepartmentFilter::default());
    assert_eq!(settings.new_window_years, 3);
  }

  #[test]
  fn every_option_is_recognised() {
    let settings = from_toml(
      r#"
        data_dir = "/srv/loans"
        new_window_years = 2
        top_n = 5
        code_table = "letter"
        label = "code"
        year_source = "loan_date"
        sparse_threshold = 2

        [reference]
        mode = "loan_year"

        [department_filter]
        kind = "forbid_keywords"
        terms = ["center", "total"]
      "#,
    );
    assert_eq!(settings.data_dir, PathBuf::from("/srv/loans"));
    assert_eq!(settings.top_n.get(), 5);
    assert_eq!(settings.code_table, CodeTableKind::Letter);
    assert_eq!(settings.label, LabelFormat::Code);
    assert_eq!(settings.year_source, YearSource::LoanDate);
    assert_eq!(settings.reference, RecencyReference::LoanYear);
    assert_eq!(
      settings.department_filter,
      DepartmentFilter::ForbidKeywords(vec!["center".into(), "total".into()])
    );
    assert_eq!(settings.classifier().recency.window_years, 2);
    assert_eq!(settings.view_settings().sparse_threshold, 2);
  }

  #[test]
  fn fixed_reference_year() {
    let settings = from_toml("[reference]\nmode = \"fixed\"\nyear = 2025\n");
    assert_eq!(settings.reference, RecencyReference::Fixed { year: 2025 });
  }

  #[test]
  fn top_n_outside_range_is_rejected() {
    let result = config::Config::builder()
      .add_source(config::File::from_str("top_n = 20", config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize::<Settings>();
    assert!(result.is_err());
  }

  #[test]
  fn environment_overrides_file() {
    let dir = std::env::temp_dir()
      .join(format!("shelfstat-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("shelfstat.toml");
    std::fs::write(&path, "top_n = 7\nlabel = \"code\"\n").unwrap();

    let vars: config::Map<String, String> = [
      ("SHELFSTAT_TOP_N", "4"),
      ("SHELFSTAT_CODE_TABLE", "letter"),
      ("SHELFSTAT_REFERENCE__MODE", "loan_year"),
      ("OTHER_TOP_N", "9"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();
    let settings = Settings::load_with(&path, environment().source(Some(vars)));
    let _ = std::fs::remove_dir_all(&dir);

    let settings = settings.unwrap();
    assert_eq!(settings.top_n.get(), 4);
    assert_eq!(settings.code_table, CodeTableKind::Letter);
    assert_eq!(settings.reference, RecencyReference::LoanYear);
    assert_eq!(settings.label, LabelFormat::Code);
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let settings = Settings::load_with(
      Path::new("/nonexistent/shelfstat.toml"),
      environment().source(Some(config::Map::new())),
    )
    .unwrap();
    assert_eq!(settings.top_n, TopN::default());
  }
}
