//! Profile records carried as node content in a profile snapshot.

use serde::{Deserialize, Serialize};

use super::EntityType;

/// Top-level job profile (root of a snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProfile {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub data_type: Option<String>,
}

/// What an action profile does with its target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
  Create,
  Update,
  Modify,
  Delete,
  Replace,
}

/// Action profile: an operation on one kind of inventory record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionProfile {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub action: Option<Action>,
  #[serde(default)]
  pub folio_record: Option<EntityType>,
}

/// Criterion applied between the incoming and the existing value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchCriterion {
  #[default]
  ExactlyMatches,
}

/// Where the value of a match expression comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataValueType {
  #[default]
  ValueFromRecord,
  StaticValue,
}

/// Labelled component of a match expression (`field`, `indicator1`, `recordSubfield`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
  pub label: String,
  pub value: String,
}

impl Field {
  pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      value: value.into(),
    }
  }
}

/// Expression addressing a value in either the incoming or the existing record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchExpression {
  #[serde(default)]
  pub data_value_type: DataValueType,
  #[serde(default)]
  pub fields: Vec<Field>,
}

impl MatchExpression {
  /// Value of the field labelled `label`, if present.
  pub fn field(&self, label: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|f| f.label == label)
      .map(|f| f.value.as_str())
  }
}

/// One matching rule of a match profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
  #[serde(default)]
  pub match_criterion: MatchCriterion,
  #[serde(default)]
  pub incoming_record_type: Option<EntityType>,
  #[serde(default)]
  pub existing_record_type: Option<EntityType>,
  #[serde(default)]
  pub incoming_match_expression: Option<MatchExpression>,
  #[serde(default)]
  pub existing_match_expression: Option<MatchExpression>,
}

/// Match profile: how to find an existing record for the incoming one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProfile {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub incoming_record_type: Option<EntityType>,
  #[serde(default)]
  pub existing_record_type: Option<EntityType>,
  #[serde(default)]
  pub match_details: Vec<MatchDetail>,
}

/// One mapping rule: read `value` from the incoming record, write it to `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
  pub path: String,
  pub value: String,
  #[serde(default = "enabled_default")]
  pub enabled: String,
  #[serde(default)]
  pub name: Option<String>,
}

fn enabled_default() -> String {
  "true".to_string()
}

impl MappingRule {
  pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      value: value.into(),
      enabled: enabled_default(),
      name: None,
    }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled.trim().eq_ignore_ascii_case("true")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDetail {
  #[serde(default)]
  pub mapping_fields: Vec<MappingRule>,
}

/// Mapping profile: rules that populate a target entity from the incoming record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingProfile {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub incoming_record_type: Option<EntityType>,
  #[serde(default)]
  pub existing_record_type: Option<EntityType>,
  #[serde(default)]
  pub mapping_details: MappingDetail,
}
