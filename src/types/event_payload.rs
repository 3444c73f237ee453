//! Event payload passed between pipeline nodes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{EntityType, ProfileSnapshotWrapper};

/// Unit of work carried through the import pipeline.
///
/// `current_node` shares its allocation with a node inside `profile_snapshot`; handlers
/// only ever change `event_type`, `context` and `events_chain`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataImportEventPayload {
  #[serde(default)]
  pub event_type: String,
  /// Entity-type key -> serialized entity.
  #[serde(default)]
  pub context: HashMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile_snapshot: Option<Arc<ProfileSnapshotWrapper>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_node: Option<Arc<ProfileSnapshotWrapper>>,
  #[serde(default)]
  pub events_chain: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub okapi_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tenant: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub token: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub job_execution_id: Option<String>,
}

impl DataImportEventPayload {
  pub fn new(event_type: impl Into<String>) -> Self {
    Self {
      event_type: event_type.into(),
      ..Default::default()
    }
  }

  /// Sets the snapshot and positions the current node on one of its nodes.
  pub fn at_node(
    mut self,
    snapshot: Arc<ProfileSnapshotWrapper>,
    node: Arc<ProfileSnapshotWrapper>,
  ) -> Self {
    self.profile_snapshot = Some(snapshot);
    self.current_node = Some(node);
    self
  }

  pub fn with_context_entry(mut self, key: EntityType, value: impl Into<String>) -> Self {
    self.context.insert(key.as_str().to_string(), value.into());
    self
  }

  pub fn context_entity(&self, key: EntityType) -> Option<&str> {
    self.context.get(key.as_str()).map(String::as_str)
  }

  pub(crate) fn put_context_entity(&mut self, key: EntityType, value: String) {
    self.context.insert(key.as_str().to_string(), value);
  }

  /// Re-points a deserialized `current_node` at the equal node inside the snapshot.
  ///
  /// JSON carries the current node as a separate copy; after loading, the two must
  /// share one allocation again. Returns false if no equal node exists in the snapshot.
  pub fn relink_current_node(&mut self) -> bool {
    let (Some(root), Some(current)) = (&self.profile_snapshot, &self.current_node) else {
      return false;
    };
    if Arc::ptr_eq(root, current) || root.contains(current) {
      return true;
    }
    if **root == **current {
      self.current_node = Some(Arc::clone(root));
      return true;
    }
    match find_equal(root, current) {
      Some(found) => {
        self.current_node = Some(found);
        true
      }
      None => false,
    }
  }
}

fn find_equal(
  node: &ProfileSnapshotWrapper,
  target: &ProfileSnapshotWrapper,
) -> Option<Arc<ProfileSnapshotWrapper>> {
  for child in node.children() {
    if **child == *target {
      return Some(Arc::clone(child));
    }
    if let Some(found) = find_equal(child, target) {
      return Some(found);
    }
  }
  None
}
