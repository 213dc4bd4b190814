//! Department validity filtering.
//!
//! Loan exports mix academic departments with administrative units (the
//! library itself, admissions, HR, …) and summary rows. Two exclusion
//! strategies are supported: an enumerated list of organisation names, and a
//! list of forbidden keyword fragments. Both compare with all whitespace
//! removed, so `"AI·DX 센터"` and `"AI·DX센터"` are the same organisation.

use serde::{Deserialize, Serialize};

/// Administrative units excluded from the department selector by default.
pub const DEFAULT_EXCLUDED_ORGS: &[&str] = &[
  "AI.DX센터",
  "AI·DX 센터",
  "AI·DX센터",
  "AIㆍDX센터",
  "교무처",
  "교수학습지원센터",
  "기타",
  "기획처",
  "도서관",
  "보건실",
  "사무처",
  "산학융복합교육센터",
  "산학협력단",
  "입학학생처(입학)",
  "입학학생처(학생)",
  "취장업지원처",
  "학생상담실",
  "혁신지원사업팀",
];

/// Keyword fragments marking non-department rows in summary exports.
pub const DEFAULT_FORBIDDEN_KEYWORDS: &[&str] = &[
  "도서관", "합계", "비율", "센터", "library", "total", "ratio", "center",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "terms", rename_all = "snake_case")]
pub enum DepartmentFilter {
  /// Reject names containing any listed organisation, case-sensitively.
  ExcludeOrgs(Vec<String>),
  /// Reject names containing any keyword fragment, ignoring case.
  ForbidKeywords(Vec<String>),
}

impl DepartmentFilter {
  pub fn default_orgs() -> Self {
    Self::ExcludeOrgs(DEFAULT_EXCLUDED_ORGS.iter().map(|s| s.to_string()).collect())
  }

  pub fn default_keywords() -> Self {
    Self::ForbidKeywords(
      DEFAULT_FORBIDDEN_KEYWORDS
        .iter()
        .map(|s| s.to_string())
        .collect(),
    )
  }

  pub fn is_valid(&self, name: Option<&str>) -> bool {
    let Some(name) = name.map(strip_whitespace).filter(|n| !n.is_empty())
    else {
      return false;
    };
    match self {
      Self::ExcludeOrgs(orgs) => !orgs
        .iter()
        .map(|o| strip_whitespace(o))
        .any(|o| !o.is_empty() && name.contains(&o)),
      Self::ForbidKeywords(keywords) => {
        let name = name.to_lowercase();
        !keywords
          .iter()
          .map(|k| strip_whitespace(k).to_lowercase())
          .any(|k| !k.is_empty() && name.contains(&k))
      }
    }
  }
}

impl Default for DepartmentFilter {
  fn default() -> Self { Self::default_orgs() }
}

fn strip_whitespace(s: &str) -> String {
  s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_names_are_invalid() {
    let filter = DepartmentFilter::default();
    assert!(!filter.is_valid(None));
    assert!(!filter.is_valid(Some("")));
    assert!(!filter.is_valid(Some(" \t")));
  }

  #[test]
  fn spacing_variants_are_excluded() {
    let filter = DepartmentFilter::default();
    assert!(!filter.is_valid(Some("AI·DX 센터")));
    assert!(!filter.is_valid(Some("AI · DX센터")));
    assert!(!filter.is_valid(Some("중앙 도서관")));
    assert!(!filter.is_valid(Some("입학학생처 (입학)")));
  }

  #[test]
  fn academic_departments_pass() {
    let filter = DepartmentFilter::default();
    assert!(filter.is_valid(Some("기계공학과")));
    assert!(filter.is_valid(Some("스마트전기전자공학과")));
  }

  #[test]
  fn org_matching_is_case_sensitive() {
    let filter = DepartmentFilter::ExcludeOrgs(vec!["Library".into()]);
    assert!(!filter.is_valid(Some("Central Library")));
    assert!(filter.is_valid(Some("central library")));
  }

  #[test]
  fn keyword_matching_ignores_case() {
    let filter = DepartmentFilter::default_keywords();
    assert!(!filter.is_valid(Some("TOTAL")));
    assert!(!filter.is_valid(Some("Loan Ratio")));
    assert!(!filter.is_valid(Some("학과 합계")));
    assert!(filter.is_valid(Some("Computer Science")));
  }

  #[test]
  fn empty_terms_never_match() {
    let filter = DepartmentFilter::ExcludeOrgs(vec![" ".into()]);
    assert!(filter.is_valid(Some("기계공학과")));
  }

  #[test]
  fn deserializes_from_tagged_form() {
    let filter: DepartmentFilter = serde_json::from_str(
      r#"{"kind":"forbid_keywords","terms":["center"]}"#,
    )
    .unwrap();
    assert_eq!(filter, DepartmentFilter::ForbidKeywords(vec!["center".into()]));
  }
}
