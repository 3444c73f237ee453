//! Builds the existing-record query for a match profile.

use tracing::instrument;

use crate::error::HandlerError;
use crate::storage::{Condition, Query};
use crate::types::{DataImportEventPayload, EntityType, MatchDetail, Value};

/// Existing-record field a detail compares against, without the `<entity>.` prefix.
pub(crate) fn existing_field(detail: &MatchDetail, existing: EntityType) -> Result<String, HandlerError> {
  let field = detail
    .existing_match_expression
    .as_ref()
    .and_then(|e| e.field("field"))
    .filter(|f| !f.is_empty())
    .ok_or_else(|| HandlerError::InvalidMatchDetail("existing match expression has no field".to_string()))?;
  let prefix = format!("{}.", existing.field_prefix());
  Ok(field.strip_prefix(&prefix).unwrap_or(field).to_string())
}

/// Condition for one read value; `None` for a missing value.
pub(crate) fn condition(field: String, value: Value) -> Option<Condition> {
  match value {
    Value::String(value) => Some(Condition::Equals { field, value }),
    Value::List(values) if values.is_empty() => None,
    Value::List(values) => Some(Condition::AnyOf { field, values }),
    Value::Missing => None,
  }
}

/// Id of an `existing` entity an earlier match left in the context, if any.
pub(crate) fn sub_match_id(
  payload: &DataImportEventPayload,
  existing: EntityType,
) -> Result<Option<String>, HandlerError> {
  let Some(raw) = payload.context_entity(existing) else {
    return Ok(None);
  };
  let entity: serde_json::Value = serde_json::from_str(raw)?;
  Ok(
    entity
      .get("id")
      .and_then(|id| id.as_str())
      .filter(|id| !id.is_empty())
      .map(str::to_string),
  )
}

/// Conjoins the per-detail conditions and narrows to a sub-match id when present.
#[instrument(level = "trace", skip(conditions))]
pub(crate) fn build_query(conditions: Vec<Condition>, sub_match: Option<String>) -> Query {
  let mut query = Query::new();
  for c in conditions {
    query.push(c);
  }
  match sub_match {
    Some(id) => query.and_equals("id", id),
    None => query,
  }
}
