//! Match value readers: extract the incoming side of a match detail from the payload.

use tracing::{instrument, warn};

use crate::error::HandlerError;
use crate::marc::MarcRecord;
use crate::types::{DataImportEventPayload, DataValueType, EntityType, MatchDetail, Value};

/// Reads the incoming value a match detail compares against existing records.
pub trait MatchValueReader: Send + Sync {
  /// True if this reader understands records of `entity_type`.
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool;

  /// Reads the value; `Value::Missing` when the record has nothing at the expression.
  fn read(&self, payload: &DataImportEventPayload, detail: &MatchDetail) -> Result<Value, HandlerError>;
}

/// Reads MARC tag/indicator/subfield expressions from a MARC source record.
///
/// Expression fields: `field` (tag), `indicator1`, `indicator2`, `recordSubfield`.
/// A `STATIC_VALUE` expression yields its `value` field verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarcValueReader;

impl MarcValueReader {
  pub fn new() -> Self {
    Self
  }
}

/// Values from one MARC record at a tag/indicator/subfield address.
#[instrument(level = "trace", skip(record))]
pub(crate) fn read_marc_values(
  record: &MarcRecord,
  tag: &str,
  ind1: Option<&str>,
  ind2: Option<&str>,
  subfield: Option<&str>,
) -> Result<Value, HandlerError> {
  let Some(content) = record.content()? else {
    return Ok(Value::Missing);
  };
  let values: Vec<String> = content
    .values(tag, ind1, ind2, subfield)
    .into_iter()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
    .collect();
  Ok(Value::List(values).normalized())
}

impl MatchValueReader for MarcValueReader {
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool {
    entity_type.is_marc()
  }

  fn read(&self, payload: &DataImportEventPayload, detail: &MatchDetail) -> Result<Value, HandlerError> {
    let expression = detail
      .incoming_match_expression
      .as_ref()
      .ok_or_else(|| HandlerError::InvalidMatchDetail("no incoming match expression".to_string()))?;
    if expression.data_value_type == DataValueType::StaticValue {
      return Ok(expression.field("value").map(Value::of).unwrap_or(Value::Missing));
    }
    let record_type = detail
      .incoming_record_type
      .unwrap_or(EntityType::MarcBibliographic);
    let Some(raw) = payload.context_entity(record_type) else {
      warn!(entity_type = %record_type, "no incoming record to read match value from");
      return Ok(Value::Missing);
    };
    let Some(tag) = expression.field("field").filter(|t| !t.is_empty()) else {
      return Err(HandlerError::InvalidMatchDetail(
        "incoming match expression has no field".to_string(),
      ));
    };
    let record = MarcRecord::from_json(raw)?;
    read_marc_values(
      &record,
      tag,
      expression.field("indicator1"),
      expression.field("indicator2"),
      expression.field("recordSubfield").filter(|s| !s.is_empty()),
    )
  }
}
