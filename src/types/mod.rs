//! Data model of an import run: payloads, profile snapshots, profiles and values.
//!
//! Wire-facing types (de)serialize to the camelCase JSON used by the import pipeline.

mod entity_type;
#[cfg(test)]
mod entity_type_test;
mod event_payload;
mod event_type;
mod import_log;
mod profile;
mod profile_snapshot;
mod value;

pub use entity_type::EntityType;
pub use event_payload::DataImportEventPayload;
pub use event_type::DataImportEventType;
pub use import_log::{ImportLog, ImportStep, StepStatus};
pub use profile::{
  Action, ActionProfile, DataValueType, Field, JobProfile, MappingDetail, MappingProfile,
  MappingRule, MatchCriterion, MatchDetail, MatchExpression, MatchProfile,
};
pub use profile_snapshot::{ContentType, ProfileContent, ProfileSnapshotWrapper, ReactTo};
pub use value::Value;
