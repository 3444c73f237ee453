//! Eligibility gate: does a handler apply to the payload's current node.

use tracing::instrument;

use crate::types::{Action, ContentType, DataImportEventPayload, EntityType, ProfileSnapshotWrapper};

/// Target a handler declares next to its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  /// Action profile performing `action` on `folio_record`.
  Action { action: Action, folio_record: EntityType },
  /// Match profile whose existing record type is this entity type.
  ExistingRecord(EntityType),
}

impl Target {
  pub fn content_type(&self) -> ContentType {
    match self {
      Target::Action { .. } => ContentType::ActionProfile,
      Target::ExistingRecord(_) => ContentType::MatchProfile,
    }
  }

  /// True if `node` has this target's content type and its content names this target.
  pub fn accepts(&self, node: &ProfileSnapshotWrapper) -> bool {
    if node.content_type() != self.content_type() {
      return false;
    }
    match self {
      Target::Action {
        action,
        folio_record,
      } => node
        .action_profile()
        .is_some_and(|p| p.action == Some(*action) && p.folio_record == Some(*folio_record)),
      Target::ExistingRecord(existing) => node
        .match_profile()
        .is_some_and(|p| p.existing_record_type == Some(*existing)),
    }
  }
}

/// True iff the payload has a current node that `target` accepts.
#[instrument(level = "trace", skip(payload))]
pub(crate) fn is_eligible_for(target: &Target, payload: &DataImportEventPayload) -> bool {
  payload
    .current_node
    .as_deref()
    .is_some_and(|node| target.accepts(node))
}
