//! Tests for the event outcome emitter.

use super::{Outcome, emit};
use crate::types::{DataImportEventPayload, DataImportEventType, EntityType};

#[test]
fn appends_incoming_type_then_switches() {
  let mut payload = DataImportEventPayload::new("DI_INVENTORY_INSTANCE_MATCHED");
  payload.events_chain.push("DI_SRS_MARC_BIB_RECORD_CREATED".to_string());

  let next = emit(
    &payload,
    Outcome::new(DataImportEventType::InventoryItemCreated)
      .with_entity(EntityType::Item, r#"{"id":"x"}"#.to_string()),
  );

  assert_eq!(next.event_type, "DI_INVENTORY_ITEM_CREATED");
  assert_eq!(
    next.events_chain,
    vec![
      "DI_SRS_MARC_BIB_RECORD_CREATED".to_string(),
      "DI_INVENTORY_INSTANCE_MATCHED".to_string()
    ]
  );
  assert_eq!(next.context_entity(EntityType::Item), Some(r#"{"id":"x"}"#));
  assert_eq!(payload.events_chain.len(), 1);
  assert!(payload.context_entity(EntityType::Item).is_none());
}

#[test]
fn keeps_existing_context_entries() {
  let payload = DataImportEventPayload::new("E")
    .with_context_entry(EntityType::MarcBibliographic, "{}");
  let next = emit(&payload, Outcome::new(DataImportEventType::InventoryInstanceNotMatched));
  assert_eq!(next.context_entity(EntityType::MarcBibliographic), Some("{}"));
  assert_eq!(next.context.len(), 1);
}
