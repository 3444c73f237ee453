//! Pluggable match value readers and loaders, looked up by entity type.
//!
//! A registry is an owned object built at setup time and handed to the handlers that
//! use it. Lookup returns the first registered strategy eligible for the entity type.

mod loader;
mod reader;

use std::sync::Arc;

use tracing::debug;

use crate::error::HandlerError;
use crate::types::EntityType;

pub use loader::{
  CollectionLoader, HoldingsLoader, InstanceLoader, ItemLoader, LoadResult, MatchValueLoader,
};
pub use reader::{MarcValueReader, MatchValueReader};
pub(crate) use reader::read_marc_values;

/// Readers keyed by incoming record type and loaders keyed by existing record type.
#[derive(Default)]
pub struct MatchValueRegistry {
  readers: Vec<Arc<dyn MatchValueReader>>,
  loaders: Vec<Arc<dyn MatchValueLoader>>,
}

impl MatchValueRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register_reader(&mut self, reader: impl MatchValueReader + 'static) {
    self.readers.push(Arc::new(reader));
  }

  pub fn register_loader(&mut self, loader: impl MatchValueLoader + 'static) {
    self.loaders.push(Arc::new(loader));
  }

  /// Removes every registered reader and loader.
  pub fn clear(&mut self) {
    debug!(
      readers = self.readers.len(),
      loaders = self.loaders.len(),
      "clearing match value registry"
    );
    self.readers.clear();
    self.loaders.clear();
  }

  pub fn get_reader(&self, incoming: EntityType) -> Result<Arc<dyn MatchValueReader>, HandlerError> {
    self
      .readers
      .iter()
      .find(|r| r.is_eligible_for_entity_type(incoming))
      .cloned()
      .ok_or(HandlerError::NoReader(incoming))
  }

  pub fn get_loader(&self, existing: EntityType) -> Result<Arc<dyn MatchValueLoader>, HandlerError> {
    self
      .loaders
      .iter()
      .find(|l| l.is_eligible_for_entity_type(existing))
      .cloned()
      .ok_or(HandlerError::NoLoader(existing))
  }
}
