//! Mapping readers: resolve a rule's value expression against the incoming record.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::HandlerError;
use crate::marc::{MarcContent, MarcRecord};
use crate::types::{DataImportEventPayload, EntityType, Value};

/// Reads rule values from one incoming record.
pub trait MappingReader: Send {
  fn read(&self, expression: &str) -> Result<Value, HandlerError>;
}

/// Creates a [MappingReader] over the payload's record of a given type.
pub trait ReaderFactory: Send + Sync {
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool;

  fn create_reader(
    &self,
    payload: &DataImportEventPayload,
    entity_type: EntityType,
  ) -> Result<Box<dyn MappingReader>, HandlerError>;
}

/// Reader over a MARC bibliographic record.
///
/// Understands `"literal"` and `TAG` / `TAG$code` references; anything else reads as
/// missing.
#[derive(Debug, Default)]
pub struct MarcBibReader {
  content: Option<MarcContent>,
}

impl MarcBibReader {
  pub fn new(content: Option<MarcContent>) -> Self {
    Self { content }
  }
}

fn reference_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^(\d{3})(?:\$([A-Za-z0-9]))?$").unwrap_or_else(|e| panic!("reference regex: {e}"))
  })
}

/// Unquotes a `"..."` literal; `None` if `expression` is not one.
pub(crate) fn quoted_literal(expression: &str) -> Option<&str> {
  expression
    .strip_prefix('"')
    .and_then(|rest| rest.strip_suffix('"'))
}

impl MappingReader for MarcBibReader {
  fn read(&self, expression: &str) -> Result<Value, HandlerError> {
    let expression = expression.trim();
    if expression.len() >= 2
      && let Some(literal) = quoted_literal(expression)
    {
      return Ok(Value::of(literal));
    }
    let (Some(caps), Some(content)) = (reference_regex().captures(expression), &self.content) else {
      return Ok(Value::Missing);
    };
    let tag = &caps[1];
    let code = caps.get(2).map(|m| m.as_str());
    let values = content.values(tag, None, None, code);
    Ok(Value::List(values).normalized())
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarcBibReaderFactory;

impl ReaderFactory for MarcBibReaderFactory {
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool {
    entity_type == EntityType::MarcBibliographic
  }

  fn create_reader(
    &self,
    payload: &DataImportEventPayload,
    entity_type: EntityType,
  ) -> Result<Box<dyn MappingReader>, HandlerError> {
    let content = match payload.context_entity(entity_type) {
      Some(raw) => MarcRecord::from_json(raw)?.content()?,
      None => None,
    };
    Ok(Box::new(MarcBibReader::new(content)))
  }
}
