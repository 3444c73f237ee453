//! Shared fixtures for handler tests.

use std::sync::Arc;

use serde_json::json;

use crate::mapping::{EntityWriterFactory, MappingManager, MarcBibReaderFactory};
use crate::registry::{HoldingsLoader, InstanceLoader, ItemLoader, MarcValueReader, MatchValueRegistry};
use crate::storage::InMemoryStorage;
use crate::types::{
  Action, ActionProfile, DataImportEventPayload, DataValueType, EntityType, Field, JobProfile,
  MappingDetail, MappingProfile, MappingRule, MatchDetail, MatchExpression, MatchProfile,
  ProfileContent, ProfileSnapshotWrapper,
};

pub(crate) const HOLDINGS_ID: &str = "957985c6-97e3-4038-b0e7-343ecd0b8120";
pub(crate) const LOAN_TYPE_ID: &str = "2b94c631-fca9-4892-a730-03ee529ffe27";
pub(crate) const MATERIAL_TYPE_ID: &str = "1a54b431-2e4f-452d-9cae-9cee66c9a892";

pub(crate) const CONTENT_WITH_HOLDING_ID: &str = r#"{ "leader": "01314nam  22003851a 4500", "fields":[ {"001":"ybp7406411"}, {"999": {"ind1":"f", "ind2":"f", "subfields":[ { "h": "957985c6-97e3-4038-b0e7-343ecd0b8120"} ] } } ] }"#;
pub(crate) const CONTENT_WITHOUT_HOLDING_ID: &str = r#"{ "leader": "01314nam  22003851a 4500", "fields":[ {"001":"ybp7406411"} ] }"#;

pub(crate) fn marc_record(content: &str) -> String {
  json!({"id": "5e525f1e-d373-4a07-9aff-b80856bacfef", "parsedRecord": {"content": content}}).to_string()
}

/// Item mapping rules with the given status literal, plus any extra rules.
pub(crate) fn item_mapping(status: &str, extra: Vec<MappingRule>) -> MappingProfile {
  let mut rules = vec![
    MappingRule::new("item.status.name", format!("\"{status}\"")),
    MappingRule::new("item.permanentLoanType.id", format!("\"{LOAN_TYPE_ID}\"")),
    MappingRule::new("item.materialType.id", format!("\"{MATERIAL_TYPE_ID}\"")),
  ];
  rules.extend(extra);
  MappingProfile {
    id: Some("mapping-item".to_string()),
    incoming_record_type: Some(EntityType::MarcBibliographic),
    existing_record_type: Some(EntityType::Item),
    mapping_details: MappingDetail {
      mapping_fields: rules,
    },
    ..Default::default()
  }
}

pub(crate) fn action(action: Action, folio_record: EntityType) -> ProfileSnapshotWrapper {
  ProfileSnapshotWrapper::new(ProfileContent::Action(ActionProfile {
    action: Some(action),
    folio_record: Some(folio_record),
    ..Default::default()
  }))
}

/// Job -> ACTION(CREATE, ITEM) -> mapping; returns root and the action node.
pub(crate) fn create_item_snapshot(
  mapping: Option<MappingProfile>,
) -> (Arc<ProfileSnapshotWrapper>, Arc<ProfileSnapshotWrapper>) {
  let mut create = action(Action::Create, EntityType::Item).with_id("create-item");
  if let Some(mapping) = mapping {
    create = create.with_children(vec![
      ProfileSnapshotWrapper::new(ProfileContent::Mapping(mapping)).with_id("mapping"),
    ]);
  }
  let root = Arc::new(
    ProfileSnapshotWrapper::new(ProfileContent::Job(JobProfile::default()))
      .with_id("job")
      .with_children(vec![create]),
  );
  let node = Arc::clone(&root.children()[0]);
  (root, node)
}

pub(crate) fn hrid_detail(existing: EntityType, existing_field: &str) -> MatchDetail {
  MatchDetail {
    incoming_record_type: Some(EntityType::MarcBibliographic),
    existing_record_type: Some(existing),
    incoming_match_expression: Some(MatchExpression {
      data_value_type: DataValueType::ValueFromRecord,
      fields: vec![
        Field::new("field", "001"),
        Field::new("indicator1", ""),
        Field::new("indicator2", ""),
        Field::new("recordSubfield", ""),
      ],
    }),
    existing_match_expression: Some(MatchExpression {
      data_value_type: DataValueType::ValueFromRecord,
      fields: vec![Field::new("field", existing_field)],
    }),
    ..Default::default()
  }
}

pub(crate) fn match_node(existing: EntityType, details: Vec<MatchDetail>) -> ProfileSnapshotWrapper {
  ProfileSnapshotWrapper::new(ProfileContent::Match(MatchProfile {
    id: Some(format!("match-{}", existing.field_prefix())),
    incoming_record_type: Some(EntityType::MarcBibliographic),
    existing_record_type: Some(existing),
    match_details: details,
    ..Default::default()
  }))
  .with_id(format!("match-{}", existing.field_prefix()))
}

/// Job -> MATCH(existing); returns root and the match node.
pub(crate) fn match_snapshot(
  existing: EntityType,
  details: Vec<MatchDetail>,
) -> (Arc<ProfileSnapshotWrapper>, Arc<ProfileSnapshotWrapper>) {
  let root = Arc::new(
    ProfileSnapshotWrapper::new(ProfileContent::Job(JobProfile::default()))
      .with_id("job")
      .with_children(vec![match_node(existing, details)]),
  );
  let node = Arc::clone(&root.children()[0]);
  (root, node)
}

pub(crate) fn incoming_payload(
  root: Arc<ProfileSnapshotWrapper>,
  node: Arc<ProfileSnapshotWrapper>,
  content: &str,
) -> DataImportEventPayload {
  DataImportEventPayload::new("DI_SRS_MARC_BIB_RECORD_CREATED")
    .at_node(root, node)
    .with_context_entry(EntityType::MarcBibliographic, marc_record(content))
}

pub(crate) fn mapping_manager() -> Arc<MappingManager> {
  let mut m = MappingManager::new();
  m.register_reader_factory(MarcBibReaderFactory);
  m.register_writer_factory(EntityWriterFactory::new(EntityType::Item));
  Arc::new(m)
}

pub(crate) fn registry(storage: Arc<InMemoryStorage>) -> Arc<MatchValueRegistry> {
  let mut r = MatchValueRegistry::new();
  r.register_reader(MarcValueReader::new());
  r.register_loader(InstanceLoader::new(storage.clone()));
  r.register_loader(HoldingsLoader::new(storage.clone()));
  r.register_loader(ItemLoader::new(storage));
  Arc::new(r)
}
