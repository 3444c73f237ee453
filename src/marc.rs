//! Read access to MARC records as stored in the payload context.
//!
//! The context holds a source record (`{"id", "parsedRecord": {"content"}}`) whose
//! content is MARC-in-JSON: a `leader` and a `fields` list of single-key objects keyed
//! by tag. Content may be embedded as an object or as a JSON string.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Source record as carried under a MARC entity key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarcRecord {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub parsed_record: Option<ParsedRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
  #[serde(default)]
  pub content: serde_json::Value,
}

impl MarcRecord {
  pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(raw)
  }

  /// Decoded MARC content, if the record carries any.
  pub fn content(&self) -> Result<Option<MarcContent>, serde_json::Error> {
    let Some(parsed) = &self.parsed_record else {
      return Ok(None);
    };
    match &parsed.content {
      serde_json::Value::Null => Ok(None),
      serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
      serde_json::Value::String(s) => serde_json::from_str(s).map(Some),
      other => MarcContent::deserialize(other).map(Some),
    }
  }
}

/// Subfield code/value pair of a data field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
  pub code: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarcField {
  Control {
    tag: String,
    value: String,
  },
  Data {
    tag: String,
    ind1: String,
    ind2: String,
    subfields: Vec<Subfield>,
  },
}

impl MarcField {
  pub fn tag(&self) -> &str {
    match self {
      MarcField::Control { tag, .. } | MarcField::Data { tag, .. } => tag,
    }
  }
}

#[derive(Deserialize)]
struct RawDataField {
  #[serde(default)]
  ind1: String,
  #[serde(default)]
  ind2: String,
  #[serde(default)]
  subfields: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawContent {
  #[serde(default)]
  leader: Option<String>,
  #[serde(default)]
  fields: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Parsed MARC content with fields in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawContent")]
pub struct MarcContent {
  pub leader: Option<String>,
  pub fields: Vec<MarcField>,
}

impl TryFrom<RawContent> for MarcContent {
  type Error = String;

  fn try_from(raw: RawContent) -> Result<Self, Self::Error> {
    let mut fields = vec![];
    for entry in raw.fields {
      for (tag, body) in entry {
        fields.push(match body {
          serde_json::Value::String(value) => MarcField::Control { tag, value },
          serde_json::Value::Object(_) => {
            let data: RawDataField =
              serde_json::from_value(body).map_err(|e| format!("field {tag}: {e}"))?;
            let subfields = data
              .subfields
              .into_iter()
              .flat_map(|sf| sf.into_iter())
              .map(|(code, v)| Subfield {
                code,
                value: scalar(v),
              })
              .collect();
            MarcField::Data {
              tag,
              ind1: data.ind1,
              ind2: data.ind2,
              subfields,
            }
          }
          other => return Err(format!("field {tag}: unexpected value {other}")),
        });
      }
    }
    Ok(Self {
      leader: raw.leader,
      fields,
    })
  }
}

fn scalar(v: serde_json::Value) -> String {
  match v {
    serde_json::Value::String(s) => s,
    other => other.to_string(),
  }
}

/// Indicator filter: `None`, empty and `*` match any indicator.
fn indicator_matches(filter: Option<&str>, actual: &str) -> bool {
  match filter {
    None => true,
    Some(f) if f.is_empty() || f == "*" => true,
    Some(f) => f.trim() == actual.trim(),
  }
}

impl MarcContent {
  /// Value of the first control field with `tag`.
  pub fn control_field(&self, tag: &str) -> Option<&str> {
    self.fields.iter().find_map(|f| match f {
      MarcField::Control { tag: t, value } if t == tag => Some(value.as_str()),
      _ => None,
    })
  }

  /// Values of subfield `code` across data fields `tag` with matching indicators.
  #[instrument(level = "trace", skip(self))]
  pub fn subfield_values(
    &self,
    tag: &str,
    ind1: Option<&str>,
    ind2: Option<&str>,
    code: &str,
  ) -> Vec<String> {
    let mut out = vec![];
    for field in &self.fields {
      if let MarcField::Data {
        tag: t,
        ind1: i1,
        ind2: i2,
        subfields,
      } = field
        && t == tag
        && indicator_matches(ind1, i1)
        && indicator_matches(ind2, i2)
      {
        out.extend(
          subfields
            .iter()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.value.clone()),
        );
      }
    }
    out
  }

  /// Values addressed by tag, indicators and subfield; control fields ignore the rest.
  pub fn values(&self, tag: &str, ind1: Option<&str>, ind2: Option<&str>, code: Option<&str>) -> Vec<String> {
    match (self.control_field(tag), code) {
      (Some(value), _) => vec![value.to_string()],
      (None, Some(code)) => self.subfield_values(tag, ind1, ind2, code),
      (None, None) => vec![],
    }
  }
}
