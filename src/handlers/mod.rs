//! Event handlers of the import pipeline and the dispatcher that selects them.
//!
//! A handler decides eligibility from the payload's current node alone and, when run,
//! either returns the next payload or fails leaving the input payload untouched.

mod create_item;
#[cfg(test)]
mod create_item_test;
mod dispatcher;
mod eligibility;
#[cfg(test)]
mod eligibility_test;
mod match_entity;
mod match_query;
mod outcome;
#[cfg(test)]
mod outcome_test;
#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::types::DataImportEventPayload;

pub use create_item::{
  CreateItemEventHandler, HOLDINGS_ID_SOURCES, HoldingsIdSource, holdings_id_from_context,
  holdings_id_from_record,
};
pub use dispatcher::EventDispatcher;
pub use eligibility::Target;
pub use match_entity::{MatchEventHandler, MatchState};
pub use outcome::{Outcome, emit};

/// One pipeline node's behaviour.
#[async_trait]
pub trait EventHandler: Send + Sync {
  fn name(&self) -> &str;

  /// Pure check against the payload's current node.
  fn is_eligible(&self, payload: &DataImportEventPayload) -> bool;

  /// Processes the payload into the next one. Exactly one result per call.
  async fn handle(
    &self,
    payload: &DataImportEventPayload,
  ) -> Result<DataImportEventPayload, HandlerError>;
}
