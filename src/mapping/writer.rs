//! Mapping writers: assemble a candidate entity document from mapped values.

use serde_json::{Map, Value as Json};

use crate::error::HandlerError;
use crate::types::{EntityType, Value};

/// Accumulates mapped values into one entity document.
pub trait Writer: Send {
  fn write(&mut self, path: &str, value: Value) -> Result<(), HandlerError>;

  fn finish(self: Box<Self>) -> Json;
}

/// Creates a [Writer] for a target entity type.
pub trait WriterFactory: Send + Sync {
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool;

  fn create_writer(&self, entity_type: EntityType) -> Box<dyn Writer>;
}

/// Writes dotted paths (`item.status.name`) as nested JSON objects.
///
/// The leading `<entity>.` segment is dropped; missing values are skipped.
#[derive(Debug)]
pub struct EntityWriter {
  prefix: String,
  document: Map<String, Json>,
}

impl EntityWriter {
  pub fn new(entity_type: EntityType) -> Self {
    Self {
      prefix: format!("{}.", entity_type.field_prefix()),
      document: Map::new(),
    }
  }
}

impl Writer for EntityWriter {
  fn write(&mut self, path: &str, value: Value) -> Result<(), HandlerError> {
    let json = match value {
      Value::String(s) => Json::String(s),
      Value::List(l) => Json::Array(l.into_iter().map(Json::String).collect()),
      Value::Missing => return Ok(()),
    };
    let relative = path.strip_prefix(&self.prefix).unwrap_or(path);
    let segments: Vec<&str> = relative.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
      return Err(HandlerError::InvalidProfile(format!("mapping path '{path}'")));
    }
    let (last, parents) = segments
      .split_last()
      .ok_or_else(|| HandlerError::InvalidProfile(format!("mapping path '{path}'")))?;
    let mut target = &mut self.document;
    for segment in parents {
      let slot = target
        .entry(segment.to_string())
        .or_insert_with(|| Json::Object(Map::new()));
      if !slot.is_object() {
        *slot = Json::Object(Map::new());
      }
      target = match slot {
        Json::Object(map) => map,
        _ => return Err(HandlerError::InvalidProfile(format!("mapping path '{path}'"))),
      };
    }
    target.insert(last.to_string(), json);
    Ok(())
  }

  fn finish(self: Box<Self>) -> Json {
    Json::Object(self.document)
  }
}

/// Factory for [EntityWriter]s of one target entity type.
#[derive(Debug, Clone, Copy)]
pub struct EntityWriterFactory {
  entity_type: EntityType,
}

impl EntityWriterFactory {
  pub fn new(entity_type: EntityType) -> Self {
    Self { entity_type }
  }
}

impl WriterFactory for EntityWriterFactory {
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool {
    entity_type == self.entity_type
  }

  fn create_writer(&self, entity_type: EntityType) -> Box<dyn Writer> {
    Box::new(EntityWriter::new(entity_type))
  }
}
