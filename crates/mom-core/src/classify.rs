//! Answer classification: mapping a raw (question, answer) pair onto a
//! canonical field of the minutes record.
//!
//! Rules are evaluated in a fixed order and the first match wins. The phrase
//! groups overlap ("What is the name of the company?" would otherwise also
//! hit later groups), so order is part of the contract.

use serde::{Serialize, ser::SerializeMap};
use strum::{AsRefStr, Display};

use crate::record::QaPair;

/// The normalised keys a question can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
  CompanyName,
  Attendees,
  Location,
  Duration,
  Employees,
  ManagementLevels,
}

struct Rule {
  phrases: &'static [&'static str],
  field:   CanonicalField,
}

const RULES: &[Rule] = &[
  Rule {
    phrases: &["company name", "name of the company", "what is the name"],
    field:   CanonicalField::CompanyName,
  },
  Rule { phrases: &["present", "attendees"], field: CanonicalField::Attendees },
  Rule { phrases: &["place", "location"], field: CanonicalField::Location },
  Rule { phrases: &["last", "duration"], field: CanonicalField::Duration },
  Rule { phrases: &["employee"], field: CanonicalField::Employees },
  Rule { phrases: &["management"], field: CanonicalField::ManagementLevels },
];

/// The outcome of classifying one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classified {
  pub field: String,
  pub value: String,
}

/// Find the canonical field for `question`, if any rule matches.
pub fn canonical_field(question: &str) -> Option<CanonicalField> {
  let key = question.to_lowercase();
  RULES
    .iter()
    .find(|rule| rule.phrases.iter().any(|p| key.contains(p)))
    .map(|rule| rule.field)
}

/// Classify `answer` by the wording of `question`.
///
/// Unmatched questions become their own field: lower-cased, with `?` removed
/// and surrounding whitespace trimmed.
pub fn classify(question: &str, answer: &str) -> Classified {
  match canonical_field(question) {
    Some(CanonicalField::CompanyName) => Classified {
      field: CanonicalField::CompanyName.to_string(),
      value: answer.trim().to_string(),
    },
    Some(field) => Classified {
      field: field.to_string(),
      value: answer.to_string(),
    },
    None => Classified {
      field: question.to_lowercase().replace('?', "").trim().to_string(),
      value: answer.to_string(),
    },
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Classified answers for one session, in first-seen field order.
///
/// A later answer for a field replaces the earlier value in place, so the
/// field keeps the position where it first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedRecord {
  entries: Vec<(String, String)>,
}

impl ClassifiedRecord {
  pub fn new() -> Self { Self::default() }

  /// Fold `pairs` in the order given; the last answer per field wins.
  pub fn from_pairs(pairs: &[QaPair]) -> Self {
    let mut record = Self::new();
    for pair in pairs {
      record.insert(classify(&pair.question, &pair.answer));
    }
    record
  }

  pub fn insert(&mut self, classified: Classified) {
    let Classified { field, value } = classified;
    match self.entries.iter_mut().find(|(f, _)| *f == field) {
      Some((_, existing)) => *existing = value,
      None => self.entries.push((field, value)),
    }
  }

  pub fn get(&self, field: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(f, _)| f == field)
      .map(|(_, v)| v.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(f, v)| (f.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Render as `field: value` lines joined by newlines. Empty when there are
  /// no entries.
  pub fn render(&self) -> String {
    self
      .iter()
      .map(|(f, v)| format!("{f}: {v}"))
      .collect::<Vec<_>>()
      .join("\n")
  }
}

impl Serialize for ClassifiedRecord {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (field, value) in &self.entries {
      map.serialize_entry(field, value)?;
    }
    map.end()
  }
}
