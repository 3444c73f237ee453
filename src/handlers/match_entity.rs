//! Match handlers: look up the existing inventory record for the incoming record.
//!
//! Runs `Start -> ValueRead -> QueryIssued -> {ZeroMatch | OneMatch | ManyMatch |
//! QueryFailed}`. A missing value short-cuts to `ZeroMatch` without a query.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::eligibility::{Target, is_eligible_for};
use super::match_query::{build_query, condition, existing_field, sub_match_id};
use super::outcome::{Outcome, emit};
use super::EventHandler;
use crate::error::HandlerError;
use crate::registry::MatchValueRegistry;
use crate::storage::StoreError;
use crate::types::{ContentType, DataImportEventPayload, DataImportEventType, EntityType};

/// Matching state, logged on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
  Start,
  ValueRead,
  QueryIssued,
  ZeroMatch,
  OneMatch,
  ManyMatch,
  QueryFailed,
}

impl fmt::Display for MatchState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      MatchState::Start => "START",
      MatchState::ValueRead => "VALUE_READ",
      MatchState::QueryIssued => "QUERY_ISSUED",
      MatchState::ZeroMatch => "ZERO_MATCH",
      MatchState::OneMatch => "ONE_MATCH",
      MatchState::ManyMatch => "MANY_MATCH",
      MatchState::QueryFailed => "QUERY_FAILED",
    };
    f.write_str(s)
  }
}

fn transition(node_id: &str, from: MatchState, to: MatchState) -> MatchState {
  debug!(node_id = %node_id, from = %from, to = %to, "match state");
  to
}

/// Matches incoming records against one existing record type.
pub struct MatchEventHandler {
  name: String,
  target: Target,
  existing: EntityType,
  matched: DataImportEventType,
  not_matched: DataImportEventType,
  registry: Arc<MatchValueRegistry>,
}

impl MatchEventHandler {
  pub fn new(
    name: impl Into<String>,
    existing: EntityType,
    matched: DataImportEventType,
    not_matched: DataImportEventType,
    registry: Arc<MatchValueRegistry>,
  ) -> Self {
    Self {
      name: name.into(),
      target: Target::ExistingRecord(existing),
      existing,
      matched,
      not_matched,
      registry,
    }
  }

  pub fn instance(registry: Arc<MatchValueRegistry>) -> Self {
    Self::new(
      "match-instance",
      EntityType::Instance,
      DataImportEventType::InventoryInstanceMatched,
      DataImportEventType::InventoryInstanceNotMatched,
      registry,
    )
  }

  pub fn holdings(registry: Arc<MatchValueRegistry>) -> Self {
    Self::new(
      "match-holdings",
      EntityType::Holdings,
      DataImportEventType::InventoryHoldingMatched,
      DataImportEventType::InventoryHoldingNotMatched,
      registry,
    )
  }

  pub fn item(registry: Arc<MatchValueRegistry>) -> Self {
    Self::new(
      "match-item",
      EntityType::Item,
      DataImportEventType::InventoryItemMatched,
      DataImportEventType::InventoryItemNotMatched,
      registry,
    )
  }
}

#[async_trait]
impl EventHandler for MatchEventHandler {
  fn name(&self) -> &str {
    &self.name
  }

  fn is_eligible(&self, payload: &DataImportEventPayload) -> bool {
    is_eligible_for(&self.target, payload)
  }

  async fn handle(
    &self,
    payload: &DataImportEventPayload,
  ) -> Result<DataImportEventPayload, HandlerError> {
    let node = payload.current_node.as_ref().ok_or(HandlerError::NoCurrentNode)?;
    let profile = node.match_profile().ok_or(HandlerError::UnexpectedNode {
      expected: ContentType::MatchProfile,
      actual: node.content_type(),
    })?;
    let node_id = node.display_id();
    if profile.match_details.is_empty() {
      return Err(HandlerError::NoMatchDetails);
    }

    let mut state = MatchState::Start;
    let mut conditions = Vec::with_capacity(profile.match_details.len());
    for detail in &profile.match_details {
      let incoming = detail
        .incoming_record_type
        .or(profile.incoming_record_type)
        .unwrap_or(EntityType::MarcBibliographic);
      let field = existing_field(detail, self.existing)?;
      let value = self.registry.get_reader(incoming)?.read(payload, detail)?;
      match condition(field, value) {
        Some(c) => conditions.push(c),
        None => {
          transition(&node_id, state, MatchState::ZeroMatch);
          info!(node_id = %node_id, entity_type = %self.existing, "no incoming value to match on");
          return Ok(emit(payload, Outcome::new(self.not_matched)));
        }
      }
    }
    state = transition(&node_id, state, MatchState::ValueRead);

    let query = build_query(conditions, sub_match_id(payload, self.existing)?);
    let loader = self.registry.get_loader(self.existing)?;
    state = transition(&node_id, state, MatchState::QueryIssued);
    let loaded = match loader.load(&query, payload).await {
      Ok(loaded) => loaded,
      Err(e) => {
        transition(&node_id, state, MatchState::QueryFailed);
        warn!(node_id = %node_id, query = %query, error = %e, "match query failed");
        return Err(e);
      }
    };

    match loaded.total_records {
      0 => {
        transition(&node_id, state, MatchState::ZeroMatch);
        info!(node_id = %node_id, entity_type = %self.existing, query = %query, "no match");
        Ok(emit(payload, Outcome::new(self.not_matched)))
      }
      1 => {
        transition(&node_id, state, MatchState::OneMatch);
        let record = loaded
          .records
          .into_iter()
          .next()
          .ok_or_else(|| {
            StoreError::Rejected("store counted one match but returned no record".to_string())
          })?;
        info!(node_id = %node_id, entity_type = %self.existing, query = %query, "matched");
        Ok(emit(
          payload,
          Outcome::new(self.matched).with_entity(self.existing, record),
        ))
      }
      count => {
        transition(&node_id, state, MatchState::ManyMatch);
        warn!(node_id = %node_id, entity_type = %self.existing, count, "ambiguous match");
        Err(HandlerError::AmbiguousMatch {
          entity_type: self.existing,
          count,
        })
      }
    }
  }
}
