//! Tests for the eligibility gate.

use std::sync::Arc;

use proptest::prelude::*;

use super::eligibility::{Target, is_eligible_for};
use super::test_support::{action, match_node};
use crate::types::{
  Action, DataImportEventPayload, EntityType, JobProfile, MappingProfile, ProfileContent,
  ProfileSnapshotWrapper,
};

const ACTIONS: [Action; 5] = [
  Action::Create,
  Action::Update,
  Action::Modify,
  Action::Delete,
  Action::Replace,
];

fn at(node: ProfileSnapshotWrapper) -> DataImportEventPayload {
  let node = Arc::new(node);
  let root = Arc::new(ProfileSnapshotWrapper::new(ProfileContent::Job(JobProfile::default())));
  DataImportEventPayload::new("DI_SRS_MARC_BIB_RECORD_CREATED").at_node(root, node)
}

fn node_strategy() -> impl Strategy<Value = ProfileSnapshotWrapper> {
  prop_oneof![
    (0..ACTIONS.len(), 0..EntityType::ALL.len())
      .prop_map(|(a, e)| action(ACTIONS[a], EntityType::ALL[e])),
    (0..EntityType::ALL.len()).prop_map(|e| match_node(EntityType::ALL[e], vec![])),
    Just(ProfileSnapshotWrapper::new(ProfileContent::Job(JobProfile::default()))),
    Just(ProfileSnapshotWrapper::new(ProfileContent::Mapping(MappingProfile::default()))),
  ]
}

fn target_strategy() -> impl Strategy<Value = Target> {
  prop_oneof![
    (0..ACTIONS.len(), 0..EntityType::ALL.len()).prop_map(|(a, e)| Target::Action {
      action: ACTIONS[a],
      folio_record: EntityType::ALL[e],
    }),
    (0..EntityType::ALL.len()).prop_map(|e| Target::ExistingRecord(EntityType::ALL[e])),
  ]
}

proptest! {
  #[test]
  fn eligible_iff_content_type_and_target_match(node in node_strategy(), target in target_strategy()) {
    let payload = at(node.clone());
    let expected = match (&target, &node.content) {
      (Target::Action { action, folio_record }, ProfileContent::Action(p)) => {
        p.action == Some(*action) && p.folio_record == Some(*folio_record)
      }
      (Target::ExistingRecord(existing), ProfileContent::Match(p)) => {
        p.existing_record_type == Some(*existing)
      }
      _ => false,
    };
    let before = serde_json::to_string(&payload).unwrap();
    prop_assert_eq!(is_eligible_for(&target, &payload), expected);
    prop_assert_eq!(serde_json::to_string(&payload).unwrap(), before);
  }
}

#[test]
fn no_current_node_is_never_eligible() {
  let payload = DataImportEventPayload::new("E");
  assert!(!is_eligible_for(
    &Target::ExistingRecord(EntityType::Instance),
    &payload
  ));
}

#[test]
fn action_without_target_fields_is_not_eligible() {
  let payload = at(ProfileSnapshotWrapper::new(ProfileContent::Action(Default::default())));
  assert!(!is_eligible_for(
    &Target::Action {
      action: Action::Create,
      folio_record: EntityType::Item
    },
    &payload
  ));
}
