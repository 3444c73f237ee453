//! Tests for `CreateItemEventHandler`.

use std::sync::Arc;

use serde_json::json;

use super::test_support::{
  CONTENT_WITH_HOLDING_ID, CONTENT_WITHOUT_HOLDING_ID, HOLDINGS_ID, LOAN_TYPE_ID, MATERIAL_TYPE_ID,
  action, create_item_snapshot, incoming_payload, item_mapping, mapping_manager, match_snapshot,
};
use super::{CreateItemEventHandler, EventHandler};
use crate::error::{ErrorKind, HandlerError};
use crate::storage::{Failure, FailureMode, InMemoryStorage, Item, StoreError, StoreSeed};
use crate::types::{
  Action, DataImportEventPayload, EntityType, JobProfile, MappingRule, ProfileContent,
  ProfileSnapshotWrapper,
};

fn handler(storage: &Arc<InMemoryStorage>) -> CreateItemEventHandler {
  CreateItemEventHandler::new(mapping_manager(), storage.clone())
}

fn created_item(payload: &DataImportEventPayload) -> serde_json::Value {
  serde_json::from_str(payload.context_entity(EntityType::Item).unwrap()).unwrap()
}

#[tokio::test]
async fn creates_item_linked_to_context_holdings() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITHOUT_HOLDING_ID)
    .with_context_entry(EntityType::Holdings, json!({"id": "h-ctx"}).to_string());

  let out = handler(&storage).handle(&payload).await.unwrap();

  assert_eq!(out.event_type, "DI_INVENTORY_ITEM_CREATED");
  assert_eq!(out.events_chain, vec!["DI_SRS_MARC_BIB_RECORD_CREATED".to_string()]);
  let item = created_item(&out);
  assert_eq!(item["status"]["name"], "Available");
  assert_eq!(item["permanentLoanTypeId"], LOAN_TYPE_ID);
  assert_eq!(item["materialTypeId"], MATERIAL_TYPE_ID);
  assert_eq!(item["holdingId"], "h-ctx");
  assert!(item["id"].as_str().is_some_and(|id| !id.is_empty()));
  assert_eq!(storage.items().add_calls(), 1);
  assert_eq!(storage.items().len(), 1);
}

#[tokio::test]
async fn falls_back_to_holdings_id_in_record() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("In process", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let out = handler(&storage).handle(&payload).await.unwrap();
  assert_eq!(created_item(&out)["holdingId"], HOLDINGS_ID);
}

#[tokio::test]
async fn empty_context_holdings_falls_through_to_record() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID)
    .with_context_entry(EntityType::Holdings, "{}");

  let out = handler(&storage).handle(&payload).await.unwrap();
  assert_eq!(created_item(&out)["holdingId"], HOLDINGS_ID);
}

#[tokio::test]
async fn fails_without_any_holdings_id() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITHOUT_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::MissingLinkId(EntityType::Holdings)));
  assert_eq!(err.kind(), ErrorKind::MissingInput);
  assert_eq!(storage.items().find_calls(), 0);
  assert_eq!(storage.items().add_calls(), 0);
}

#[tokio::test]
async fn rejects_empty_status_without_writing() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(err.to_string(), "invalid or missing required field: status.name");
  assert_eq!(storage.items().add_calls(), 0);
}

#[tokio::test]
async fn rejects_unrecognized_status_without_writing() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("Invalid status", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::InvalidField(ref f) if f == "status.name"));
  assert_eq!(storage.items().add_calls(), 0);
  assert_eq!(storage.items().find_calls(), 0);
}

#[tokio::test]
async fn rejects_missing_loan_type() {
  let storage = Arc::new(InMemoryStorage::new());
  let mut mapping = item_mapping("Available", vec![]);
  mapping.mapping_details.mapping_fields.retain(|r| r.path != "item.permanentLoanType.id");
  let (root, node) = create_item_snapshot(Some(mapping));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::InvalidField(ref f) if f == "permanentLoanType.id"));
  assert_eq!(storage.items().add_calls(), 0);
}

#[tokio::test]
async fn duplicate_barcode_is_a_conflict() {
  let storage = Arc::new(InMemoryStorage::from_seed(StoreSeed {
    items: vec![Item {
      id: Some("existing".to_string()),
      barcode: Some("123".to_string()),
      ..Default::default()
    }],
    ..Default::default()
  }));
  let (root, node) = create_item_snapshot(Some(item_mapping(
    "Available",
    vec![MappingRule::new("item.barcode", r#""123""#)],
  )));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::DuplicateKey { ref value, .. } if value == "123"));
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(storage.items().find_calls(), 1);
  assert_eq!(storage.items().add_calls(), 0);
  assert_eq!(storage.items().queries(), vec![r#"barcode == "123""#.to_string()]);
}

#[tokio::test]
async fn unique_barcode_is_checked_then_created() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping(
    "Available",
    vec![MappingRule::new("item.barcode", r#""456""#)],
  )));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let out = handler(&storage).handle(&payload).await.unwrap();
  assert_eq!(created_item(&out)["barcode"], "456");
  assert_eq!(storage.items().find_calls(), 1);
  assert_eq!(storage.items().add_calls(), 1);
}

#[tokio::test]
async fn several_mapped_barcodes_are_rejected_before_store_access() {
  let storage = Arc::new(InMemoryStorage::from_seed(StoreSeed {
    items: vec![Item {
      id: Some("existing".to_string()),
      barcode: Some("111".to_string()),
      ..Default::default()
    }],
    ..Default::default()
  }));
  let content = json!({
    "leader": "01314nam  22003851a 4500",
    "fields": [
      {"001": "ybp7406411"},
      {"876": {"ind1": " ", "ind2": " ", "subfields": [{"p": "111"}]}},
      {"876": {"ind1": " ", "ind2": " ", "subfields": [{"p": "222"}]}},
      {"999": {"ind1": "f", "ind2": "f", "subfields": [{"h": HOLDINGS_ID}]}}
    ]
  })
  .to_string();
  let (root, node) = create_item_snapshot(Some(item_mapping(
    "Available",
    vec![MappingRule::new("item.barcode", "876$p")],
  )));
  let payload = incoming_payload(root, node, &content);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::InvalidField(ref f) if f == "barcode"));
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert_eq!(storage.items().find_calls(), 0);
  assert_eq!(storage.items().add_calls(), 0);
  assert_eq!(storage.items().len(), 1);
}

#[tokio::test]
async fn fails_before_store_access_without_source_record() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = DataImportEventPayload::new("DI_SRS_MARC_BIB_RECORD_CREATED").at_node(root, node);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(
    err,
    HandlerError::MissingSourceRecord(EntityType::MarcBibliographic)
  ));
  assert_eq!(storage.items().find_calls(), 0);
  assert_eq!(storage.items().add_calls(), 0);
}

#[tokio::test]
async fn fails_without_mapping_profile() {
  let storage = Arc::new(InMemoryStorage::new());
  let (root, node) = create_item_snapshot(None);
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::NoMappingProfile));
  assert_eq!(storage.items().add_calls(), 0);
}

#[tokio::test]
async fn store_failure_propagates_and_leaves_payload_untouched() {
  let storage = Arc::new(InMemoryStorage::new());
  storage
    .items()
    .set_add_mode(FailureMode::Fail(Failure::new("Internal Server Error", 500)));
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Infrastructure);
  assert!(matches!(err, HandlerError::Store(StoreError::Failure(_))));
  assert_eq!(payload.event_type, "DI_SRS_MARC_BIB_RECORD_CREATED");
  assert!(payload.events_chain.is_empty());
  assert!(payload.context_entity(EntityType::Item).is_none());
  assert!(storage.items().is_empty());
}

#[tokio::test]
async fn store_throw_propagates() {
  let storage = Arc::new(InMemoryStorage::new());
  storage
    .items()
    .set_add_mode(FailureMode::Throw("connection reset".to_string()));
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::Store(StoreError::Rejected(_))));
}

#[tokio::test]
async fn abandoned_store_call_is_infrastructure_failure() {
  let storage = Arc::new(InMemoryStorage::new());
  storage.items().set_add_mode(FailureMode::DropCallbacks);
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);

  let err = handler(&storage).handle(&payload).await.unwrap_err();
  assert!(matches!(err, HandlerError::Store(StoreError::Abandoned)));
}

#[test]
fn eligibility_requires_create_item_action() {
  let storage = Arc::new(InMemoryStorage::new());
  let h = handler(&storage);
  let (root, node) = create_item_snapshot(Some(item_mapping("Available", vec![])));
  let payload = incoming_payload(root, node, CONTENT_WITH_HOLDING_ID);
  assert!(h.is_eligible(&payload));

  let update = Arc::new(action(Action::Update, EntityType::Item));
  let job = Arc::new(ProfileSnapshotWrapper::new(ProfileContent::Job(JobProfile::default())));
  assert!(!h.is_eligible(&payload.clone().at_node(Arc::clone(&job), update)));

  let instance = Arc::new(action(Action::Create, EntityType::Instance));
  assert!(!h.is_eligible(&payload.clone().at_node(Arc::clone(&job), instance)));

  let (match_root, match_node) = match_snapshot(EntityType::Item, vec![]);
  assert!(!h.is_eligible(&payload.clone().at_node(match_root, match_node)));

  assert!(!h.is_eligible(&DataImportEventPayload::new("E")));
}
