//! Errors surfaced by event handlers.

use thiserror::Error;

use crate::storage::StoreError;
use crate::types::{ContentType, EntityType};

/// Broad class of a handler failure, for callers that route on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Required input was absent from the payload or profile.
  MissingInput,
  /// Candidate entity failed required-field validation.
  Validation,
  /// Matching returned more than one record.
  AmbiguousMatch,
  /// An entity with the same uniqueness key already exists.
  Conflict,
  /// The collection store failed.
  Infrastructure,
  /// No strategy registered, or profile content unusable.
  Configuration,
}

/// Failure of a single `handle` call.
#[derive(Debug, Error)]
pub enum HandlerError {
  #[error("no current node in event payload")]
  NoCurrentNode,
  #[error("current node is {actual}, expected {expected}")]
  UnexpectedNode {
    expected: ContentType,
    actual: ContentType,
  },
  #[error("no {0} source record in event payload")]
  MissingSourceRecord(EntityType),
  #[error("no {0} link id in event payload")]
  MissingLinkId(EntityType),
  #[error("match profile has no match details")]
  NoMatchDetails,
  #[error("no mapping profile under action profile")]
  NoMappingProfile,
  #[error("invalid match detail: {0}")]
  InvalidMatchDetail(String),
  #[error("invalid profile: {0}")]
  InvalidProfile(String),
  #[error("invalid or missing required field: {0}")]
  InvalidField(String),
  #[error("found {count} records matching the specified conditions for {entity_type}")]
  AmbiguousMatch { entity_type: EntityType, count: usize },
  #[error("duplicate key: {entity_type} with {field} '{value}' already exists")]
  DuplicateKey {
    entity_type: EntityType,
    field: String,
    value: String,
  },
  #[error("no reader available for entity type {0}")]
  NoReader(EntityType),
  #[error("no loader available for entity type {0}")]
  NoLoader(EntityType),
  #[error("no writer available for entity type {0}")]
  NoWriter(EntityType),
  #[error("no handler eligible for node {0}")]
  NoEligibleHandler(String),
  #[error("store failure: {0}")]
  Store(#[from] StoreError),
  #[error("malformed entity json: {0}")]
  Json(#[from] serde_json::Error),
}

impl HandlerError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      HandlerError::NoCurrentNode
      | HandlerError::MissingSourceRecord(_)
      | HandlerError::MissingLinkId(_)
      | HandlerError::NoMatchDetails
      | HandlerError::NoMappingProfile => ErrorKind::MissingInput,
      HandlerError::InvalidField(_) => ErrorKind::Validation,
      HandlerError::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
      HandlerError::DuplicateKey { .. } => ErrorKind::Conflict,
      HandlerError::Store(_) => ErrorKind::Infrastructure,
      HandlerError::UnexpectedNode { .. }
      | HandlerError::InvalidMatchDetail(_)
      | HandlerError::InvalidProfile(_)
      | HandlerError::NoReader(_)
      | HandlerError::NoLoader(_)
      | HandlerError::NoWriter(_)
      | HandlerError::NoEligibleHandler(_)
      | HandlerError::Json(_) => ErrorKind::Configuration,
    }
  }
}
