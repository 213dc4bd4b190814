//! Call-number → subject classification.
//!
//! A call number's leading character encodes one of ten top-level subject
//! classes. Two key alphabets are in use across the library's exports: the
//! decimal digits `0`–`9` and the letters `A`–`J`. Both map onto the same ten
//! [`SubjectBucket`]s, in the same order; anything else lands in
//! [`SubjectBucket::Other`].

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

// ─── Buckets ─────────────────────────────────────────────────────────────────

/// A coarse subject class derived from a call number. Never null: unknown or
/// missing call numbers classify as [`SubjectBucket::Other`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumIter,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubjectBucket {
  General,
  Philosophy,
  Religion,
  SocialScience,
  NaturalScience,
  Technology,
  Arts,
  Language,
  Literature,
  History,
  Other,
}

impl SubjectBucket {
  /// The ten classified buckets, in table order.
  pub fn recognized() -> impl Iterator<Item = Self> {
    Self::iter().filter(|b| b.is_recognized())
  }

  pub fn is_recognized(self) -> bool { self != Self::Other }

  /// Human-readable name as printed in the library's catalog.
  pub fn name(self) -> &'static str {
    match self {
      Self::General => "총류",
      Self::Philosophy => "철학",
      Self::Religion => "종교",
      Self::SocialScience => "사회과학",
      Self::NaturalScience => "자연과학",
      Self::Technology => "기술과학",
      Self::Arts => "예술",
      Self::Language => "언어",
      Self::Literature => "문학",
      Self::History => "역사",
      Self::Other => "기타",
    }
  }

  /// Position in the ten-entry code table; `None` for `Other`.
  fn index(self) -> Option<usize> {
    Self::recognized().position(|b| b == self)
  }
}

// ─── Table configuration ─────────────────────────────────────────────────────

/// Which key alphabet a [`CodeTable`] reads from the call number.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CodeTableKind {
  /// `0`–`9`; codes render as `000`, `100`, … `900`.
  #[default]
  Digit,
  /// `A`–`J`; codes render as the letter itself.
  Letter,
}

/// How a bucket is rendered for display.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LabelFormat {
  Code,
  #[default]
  Name,
}

const DIGIT_KEYS: [char; 10] =
  ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];
const LETTER_KEYS: [char; 10] =
  ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Code rendered for [`SubjectBucket::Other`] under every table.
pub const UNKNOWN_CODE: &str = "ETC";

/// A ten-entry call-number code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeTable {
  kind: CodeTableKind,
}

impl CodeTable {
  pub const fn new(kind: CodeTableKind) -> Self { Self { kind } }

  pub fn kind(&self) -> CodeTableKind { self.kind }

  fn keys(&self) -> &'static [char; 10] {
    match self.kind {
      CodeTableKind::Digit => &DIGIT_KEYS,
      CodeTableKind::Letter => &LETTER_KEYS,
    }
  }

  /// Classify a call number by its first non-whitespace character.
  ///
  /// Missing, blank and unrecognised call numbers all yield
  /// [`SubjectBucket::Other`].
  pub fn classify(&self, call_number: Option<&str>) -> SubjectBucket {
    let Some(lead) = call_number.and_then(|s| s.trim_start().chars().next())
    else {
      return SubjectBucket::Other;
    };
    let lead = normalize_key(lead);
    self
      .keys()
      .iter()
      .position(|k| *k == lead)
      .and_then(|i| SubjectBucket::recognized().nth(i))
      .unwrap_or(SubjectBucket::Other)
  }

  /// The short code for `bucket` under this table.
  pub fn code(&self, bucket: SubjectBucket) -> String {
    let Some(key) = bucket.index().map(|i| self.keys()[i]) else {
      return UNKNOWN_CODE.to_owned();
    };
    match self.kind {
      CodeTableKind::Digit => format!("{key}00"),
      CodeTableKind::Letter => key.to_string(),
    }
  }

  pub fn label(&self, bucket: SubjectBucket, format: LabelFormat) -> String {
    match format {
      LabelFormat::Code => self.code(bucket),
      LabelFormat::Name => bucket.name().to_owned(),
    }
  }

  /// Classify and render in one step.
  pub fn classify_label(
    &self,
    call_number: Option<&str>,
    format: LabelFormat,
  ) -> String {
    self.label(self.classify(call_number), format)
  }

  /// Resolve a user-supplied label back to a bucket. Accepts this table's
  /// codes and bare key characters, catalog names, and the snake_case
  /// bucket identifiers.
  pub fn parse_label(&self, input: &str) -> Option<SubjectBucket> {
    let input = input.trim();
    let mut chars = input.chars();
    let key = match (chars.next(), chars.next()) {
      (Some(c), None) => Some(normalize_key(c)),
      _ => None,
    };
    SubjectBucket::iter().find(|b| {
      input == b.name()
        || input.eq_ignore_ascii_case(&self.code(*b))
        || input.eq_ignore_ascii_case(&b.to_string())
        || key.is_some_and(|k| b.index().is_some_and(|i| self.keys()[i] == k))
    })
  }
}

/// Fold full-width ASCII forms onto ASCII and upper-case letters.
fn normalize_key(c: char) -> char {
  let c = match c {
    '\u{FF01}'..='\u{FF5E}' => {
      char::from_u32(c as u32 - 0xFF01 + 0x21).unwrap_or(c)
    }
    _ => c,
  };
  c.to_ascii_uppercase()
}
