//! Typed value produced by readers.

/// Value read from a record by a match or mapping reader.
///
/// `Missing` is its own variant: an empty string is a value that was present and
/// empty, which downstream validation treats differently from "no value at all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  String(String),
  List(Vec<String>),
  Missing,
}

impl Value {
  pub fn of(s: impl Into<String>) -> Self {
    Value::String(s.into())
  }

  pub fn is_missing(&self) -> bool {
    matches!(self, Value::Missing)
  }

  /// Single string form; `None` for lists and missing values.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  /// Collapses a list of one element to a string and an empty list to missing.
  pub fn normalized(self) -> Self {
    match self {
      Value::List(mut l) if l.len() == 1 => Value::String(l.remove(0)),
      Value::List(l) if l.is_empty() => Value::Missing,
      other => other,
    }
  }
}

impl From<Option<String>> for Value {
  fn from(v: Option<String>) -> Self {
    v.map(Value::String).unwrap_or(Value::Missing)
  }
}
