//! Routes a payload to the first registered handler eligible for it.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::EventHandler;
use crate::error::HandlerError;
use crate::types::DataImportEventPayload;

/// Ordered list of handlers; registration order decides ties.
#[derive(Default)]
pub struct EventDispatcher {
  handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, handler: impl EventHandler + 'static) {
    self.handlers.push(Arc::new(handler));
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }

  /// First handler eligible for the payload, if any.
  #[instrument(level = "trace", skip_all)]
  pub fn handler_for(&self, payload: &DataImportEventPayload) -> Option<Arc<dyn EventHandler>> {
    self.handlers.iter().find(|h| h.is_eligible(payload)).cloned()
  }

  /// Runs the first eligible handler; returns its name with the resulting payload.
  pub async fn dispatch(
    &self,
    payload: &DataImportEventPayload,
  ) -> Result<(String, DataImportEventPayload), HandlerError> {
    let Some(handler) = self.handler_for(payload) else {
      let node = payload
        .current_node
        .as_ref()
        .map(|n| n.display_id())
        .unwrap_or_else(|| "<none>".to_string());
      return Err(HandlerError::NoEligibleHandler(node));
    };
    debug!(handler = handler.name(), "dispatching");
    let next = handler.handle(payload).await?;
    Ok((handler.name().to_string(), next))
  }
}
