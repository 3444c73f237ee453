//! Event outcome emitter: the one place a successful handler changes the payload.

use tracing::info;

use crate::types::{DataImportEventPayload, DataImportEventType, EntityType};

/// Terminal success of a handler: the event to emit and context entries to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
  pub event_type: DataImportEventType,
  pub context: Vec<(EntityType, String)>,
}

impl Outcome {
  pub fn new(event_type: DataImportEventType) -> Self {
    Self {
      event_type,
      context: vec![],
    }
  }

  pub fn with_entity(mut self, entity_type: EntityType, serialized: String) -> Self {
    self.context.push((entity_type, serialized));
    self
  }
}

/// Produces the next payload: the incoming event type is appended to the chain, the
/// event type becomes the outcome's, and context entries are written.
///
/// The input payload is never touched, so a handler that fails leaves it as it was.
pub fn emit(payload: &DataImportEventPayload, outcome: Outcome) -> DataImportEventPayload {
  let mut next = payload.clone();
  next.events_chain.push(payload.event_type.clone());
  next.event_type = outcome.event_type.as_str().to_string();
  for (entity_type, serialized) in outcome.context {
    next.put_context_entity(entity_type, serialized);
  }
  info!(
    from = %payload.event_type,
    to = %next.event_type,
    chain_len = next.events_chain.len(),
    "event emitted"
  );
  next
}
