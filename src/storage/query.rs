//! Conjunctive exact-match query language shared by loaders and stores.
//!
//! A query is `field == "value"` conditions joined by ` AND `; a condition over several
//! values renders as `(field == "a" OR field == "b")`. Values escape `"` and `\`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
  Equals { field: String, value: String },
  AnyOf { field: String, values: Vec<String> },
}

impl Condition {
  pub fn field(&self) -> &str {
    match self {
      Condition::Equals { field, .. } | Condition::AnyOf { field, .. } => field,
    }
  }

  fn matches(&self, entity: &serde_json::Value) -> bool {
    let Some(actual) = lookup(entity, self.field()) else {
      return false;
    };
    match self {
      Condition::Equals { value, .. } => actual == *value,
      Condition::AnyOf { values, .. } => values.iter().any(|v| *v == actual),
    }
  }
}

impl fmt::Display for Condition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Condition::Equals { field, value } => write!(f, "{} == \"{}\"", field, escape(value)),
      Condition::AnyOf { field, values } => {
        let parts: Vec<String> = values
          .iter()
          .map(|v| format!("{} == \"{}\"", field, escape(v)))
          .collect();
        write!(f, "({})", parts.join(" OR "))
      }
    }
  }
}

/// Conjunction of conditions. An empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
  conditions: Vec<Condition>,
}

impl Query {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn and_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
    self.conditions.push(Condition::Equals {
      field: field.into(),
      value: value.into(),
    });
    self
  }

  pub fn and_any_of(mut self, field: impl Into<String>, values: Vec<String>) -> Self {
    self.conditions.push(Condition::AnyOf {
      field: field.into(),
      values,
    });
    self
  }

  pub fn push(&mut self, condition: Condition) {
    self.conditions.push(condition);
  }

  pub fn conditions(&self) -> &[Condition] {
    &self.conditions
  }

  pub fn is_empty(&self) -> bool {
    self.conditions.is_empty()
  }

  /// True if every condition holds for the JSON form of an entity.
  pub fn matches(&self, entity: &serde_json::Value) -> bool {
    self.conditions.iter().all(|c| c.matches(entity))
  }

  /// Parses the rendered form back into conditions.
  pub fn parse(query: &str) -> Result<Self, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidQuery {
      query: query.to_string(),
      reason: reason.to_string(),
    };
    let trimmed = query.trim();
    if trimmed.is_empty() || trimmed == "cql.allRecords=1" {
      return Ok(Self::new());
    }
    let mut parsed = Self::new();
    for conjunct in split_top_level(trimmed, " AND ") {
      let conjunct = conjunct.trim();
      match conjunct.strip_prefix('(').and_then(|c| c.strip_suffix(')')) {
        Some(inner) => {
          let mut field: Option<String> = None;
          let mut values = vec![];
          for atom in split_top_level(inner, " OR ") {
            let (f, v) = parse_atom(atom.trim()).ok_or_else(|| invalid("malformed condition"))?;
            if field.as_deref().is_some_and(|existing| existing != f) {
              return Err(invalid("OR group mixes fields"));
            }
            field = Some(f);
            values.push(v);
          }
          let field = field.ok_or_else(|| invalid("empty OR group"))?;
          parsed.push(Condition::AnyOf { field, values });
        }
        None => {
          let (field, value) = parse_atom(conjunct).ok_or_else(|| invalid("malformed condition"))?;
          parsed.push(Condition::Equals { field, value });
        }
      }
    }
    Ok(parsed)
  }
}

impl fmt::Display for Query {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
    f.write_str(&parts.join(" AND "))
  }
}

fn escape(value: &str) -> String {
  value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  let mut chars = value.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(next) = chars.next() {
        out.push(next);
      }
    } else {
      out.push(c);
    }
  }
  out
}

fn atom_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"^([\p{L}_][\p{L}\p{N}_.]*)\s*==\s*"((?:[^"\\]|\\.)*)"$"#)
      .unwrap_or_else(|e| panic!("atom regex: {e}"))
  })
}

fn parse_atom(atom: &str) -> Option<(String, String)> {
  let caps = atom_regex().captures(atom)?;
  Some((caps[1].to_string(), unescape(&caps[2])))
}

/// Splits on `sep` outside of double-quoted strings.
pub(crate) fn split_top_level<'a>(s: &'a str, sep: &str) -> Vec<&'a str> {
  let mut parts = vec![];
  let mut start = 0;
  let mut in_quotes = false;
  let mut escaped = false;
  let mut i = 0;
  let bytes = s.as_bytes();
  while i < bytes.len() {
    let b = bytes[i];
    if escaped {
      escaped = false;
    } else if b == b'\\' && in_quotes {
      escaped = true;
    } else if b == b'"' {
      in_quotes = !in_quotes;
    } else if !in_quotes && bytes[i..].starts_with(sep.as_bytes()) {
      parts.push(&s[start..i]);
      i += sep.len();
      start = i;
      continue;
    }
    i += 1;
  }
  parts.push(&s[start..]);
  parts
}

/// Resolves a dotted path in a JSON document to its string form.
fn lookup(entity: &serde_json::Value, path: &str) -> Option<String> {
  let mut current = entity;
  for segment in path.split('.') {
    current = current.get(segment)?;
  }
  match current {
    serde_json::Value::String(s) => Some(s.clone()),
    serde_json::Value::Number(n) => Some(n.to_string()),
    serde_json::Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
