//! Mapping manager: runs a mapping profile's rules from an incoming record into a
//! candidate entity document.

mod reader;
mod writer;

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::HandlerError;
use crate::types::{DataImportEventPayload, EntityType, MappingProfile};

pub use reader::{MappingReader, MarcBibReader, MarcBibReaderFactory, ReaderFactory};
pub use writer::{EntityWriter, EntityWriterFactory, Writer, WriterFactory};

/// Reader factories keyed by incoming record type, writer factories by target type.
#[derive(Default)]
pub struct MappingManager {
  reader_factories: Vec<Arc<dyn ReaderFactory>>,
  writer_factories: Vec<Arc<dyn WriterFactory>>,
}

impl MappingManager {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register_reader_factory(&mut self, factory: impl ReaderFactory + 'static) {
    self.reader_factories.push(Arc::new(factory));
  }

  pub fn register_writer_factory(&mut self, factory: impl WriterFactory + 'static) {
    self.writer_factories.push(Arc::new(factory));
  }

  pub fn clear(&mut self) {
    self.reader_factories.clear();
    self.writer_factories.clear();
  }

  /// Maps the payload's incoming record through the enabled rules of `profile`.
  ///
  /// The incoming type defaults to MARC bibliographic; the target type is the profile's
  /// existing record type.
  #[instrument(level = "trace", skip_all, fields(profile = ?profile.id))]
  pub fn map(
    &self,
    payload: &DataImportEventPayload,
    profile: &MappingProfile,
  ) -> Result<serde_json::Value, HandlerError> {
    let incoming = profile
      .incoming_record_type
      .unwrap_or(EntityType::MarcBibliographic);
    let target = profile.existing_record_type.ok_or_else(|| {
      HandlerError::InvalidProfile("mapping profile has no existing record type".to_string())
    })?;
    let reader_factory = self
      .reader_factories
      .iter()
      .find(|f| f.is_eligible_for_entity_type(incoming))
      .ok_or(HandlerError::NoReader(incoming))?;
    let writer_factory = self
      .writer_factories
      .iter()
      .find(|f| f.is_eligible_for_entity_type(target))
      .ok_or(HandlerError::NoWriter(target))?;

    let reader = reader_factory.create_reader(payload, incoming)?;
    let mut writer = writer_factory.create_writer(target);
    for rule in profile
      .mapping_details
      .mapping_fields
      .iter()
      .filter(|r| r.is_enabled())
    {
      let value = reader.read(&rule.value)?;
      debug!(path = %rule.path, missing = value.is_missing(), "mapped rule");
      writer.write(&rule.path, value)?;
    }
    Ok(writer.finish())
  }
}
