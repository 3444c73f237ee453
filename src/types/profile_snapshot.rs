//! Profile snapshot tree and read-only navigation over it.
//!
//! A snapshot is built once per import run and shared by reference: children are held
//! as `Arc`s so a payload's current node can point into the tree without copying it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use tracing::instrument;

use super::{ActionProfile, JobProfile, MappingProfile, MatchProfile};

/// Discriminator of a snapshot node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
  JobProfile,
  ActionProfile,
  MatchProfile,
  MappingProfile,
}

impl fmt::Display for ContentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ContentType::JobProfile => write!(f, "JOB_PROFILE"),
      ContentType::ActionProfile => write!(f, "ACTION_PROFILE"),
      ContentType::MatchProfile => write!(f, "MATCH_PROFILE"),
      ContentType::MappingProfile => write!(f, "MAPPING_PROFILE"),
    }
  }
}

/// Which outcome of the parent match a child node reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactTo {
  Match,
  NonMatch,
}

/// Typed node content; the variant is the node's content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileContent {
  Job(JobProfile),
  Action(ActionProfile),
  Match(MatchProfile),
  Mapping(MappingProfile),
}

impl ProfileContent {
  pub fn content_type(&self) -> ContentType {
    match self {
      ProfileContent::Job(_) => ContentType::JobProfile,
      ProfileContent::Action(_) => ContentType::ActionProfile,
      ProfileContent::Match(_) => ContentType::MatchProfile,
      ProfileContent::Mapping(_) => ContentType::MappingProfile,
    }
  }

  /// Decodes raw JSON content for the given content type. `null` yields an empty profile.
  pub fn from_json(
    content_type: ContentType,
    content: serde_json::Value,
  ) -> Result<Self, serde_json::Error> {
    let content = if content.is_null() {
      serde_json::Value::Object(serde_json::Map::new())
    } else {
      content
    };
    Ok(match content_type {
      ContentType::JobProfile => ProfileContent::Job(serde_json::from_value(content)?),
      ContentType::ActionProfile => ProfileContent::Action(serde_json::from_value(content)?),
      ContentType::MatchProfile => ProfileContent::Match(serde_json::from_value(content)?),
      ContentType::MappingProfile => ProfileContent::Mapping(serde_json::from_value(content)?),
    })
  }

}

/// Serializes the bare profile; the content type travels beside it.
impl Serialize for ProfileContent {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      ProfileContent::Job(p) => p.serialize(serializer),
      ProfileContent::Action(p) => p.serialize(serializer),
      ProfileContent::Match(p) => p.serialize(serializer),
      ProfileContent::Mapping(p) => p.serialize(serializer),
    }
  }
}

/// One node of a profile snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSnapshotWrapper")]
pub struct ProfileSnapshotWrapper {
  pub id: Option<String>,
  pub profile_id: Option<String>,
  pub order: u32,
  pub react_to: Option<ReactTo>,
  pub content: ProfileContent,
  pub child_snapshot_wrappers: Vec<Arc<ProfileSnapshotWrapper>>,
}

/// Wire shape: `contentType` next to an untyped `content` object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshotWrapper {
  #[serde(default)]
  id: Option<String>,
  #[serde(default)]
  profile_id: Option<String>,
  #[serde(default)]
  order: u32,
  #[serde(default)]
  react_to: Option<ReactTo>,
  content_type: ContentType,
  #[serde(default)]
  content: serde_json::Value,
  #[serde(default)]
  child_snapshot_wrappers: Vec<Arc<ProfileSnapshotWrapper>>,
}

impl TryFrom<RawSnapshotWrapper> for ProfileSnapshotWrapper {
  type Error = serde_json::Error;

  fn try_from(raw: RawSnapshotWrapper) -> Result<Self, Self::Error> {
    Ok(Self {
      id: raw.id,
      profile_id: raw.profile_id,
      order: raw.order,
      react_to: raw.react_to,
      content: ProfileContent::from_json(raw.content_type, raw.content)?,
      child_snapshot_wrappers: raw.child_snapshot_wrappers,
    })
  }
}

/// Borrowed wire shape used for serialization.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotWrapperRef<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  id: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  profile_id: Option<&'a str>,
  order: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  react_to: Option<ReactTo>,
  content_type: ContentType,
  content: &'a ProfileContent,
  child_snapshot_wrappers: &'a [Arc<ProfileSnapshotWrapper>],
}

impl Serialize for ProfileSnapshotWrapper {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    SnapshotWrapperRef {
      id: self.id.as_deref(),
      profile_id: self.profile_id.as_deref(),
      order: self.order,
      react_to: self.react_to,
      content_type: self.content.content_type(),
      content: &self.content,
      child_snapshot_wrappers: &self.child_snapshot_wrappers,
    }
    .serialize(serializer)
  }
}

impl ProfileSnapshotWrapper {
  pub fn new(content: ProfileContent) -> Self {
    Self {
      id: None,
      profile_id: None,
      order: 0,
      react_to: None,
      content,
      child_snapshot_wrappers: vec![],
    }
  }

  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn with_react_to(mut self, react_to: ReactTo) -> Self {
    self.react_to = Some(react_to);
    self
  }

  /// Appends children in evaluation order.
  pub fn with_children(mut self, children: Vec<ProfileSnapshotWrapper>) -> Self {
    self
      .child_snapshot_wrappers
      .extend(children.into_iter().map(Arc::new));
    self
  }

  pub fn content_type(&self) -> ContentType {
    self.content.content_type()
  }

  pub fn children(&self) -> &[Arc<ProfileSnapshotWrapper>] {
    &self.child_snapshot_wrappers
  }

  /// Id used in logs: node id, else profile id, else content type.
  pub fn display_id(&self) -> String {
    self
      .id
      .clone()
      .or_else(|| self.profile_id.clone())
      .unwrap_or_else(|| self.content_type().to_string())
  }

  pub fn job_profile(&self) -> Option<&JobProfile> {
    match &self.content {
      ProfileContent::Job(p) => Some(p),
      _ => None,
    }
  }

  pub fn action_profile(&self) -> Option<&ActionProfile> {
    match &self.content {
      ProfileContent::Action(p) => Some(p),
      _ => None,
    }
  }

  pub fn match_profile(&self) -> Option<&MatchProfile> {
    match &self.content {
      ProfileContent::Match(p) => Some(p),
      _ => None,
    }
  }

  pub fn mapping_profile(&self) -> Option<&MappingProfile> {
    match &self.content {
      ProfileContent::Mapping(p) => Some(p),
      _ => None,
    }
  }

  /// First direct child with the given content type.
  pub fn first_child_of(&self, content_type: ContentType) -> Option<&Arc<ProfileSnapshotWrapper>> {
    self
      .child_snapshot_wrappers
      .iter()
      .find(|c| c.content_type() == content_type)
  }

  /// Children that run after this match node produced `outcome`, in order.
  ///
  /// Children without `reactTo` run after either outcome. Mapping children are never
  /// returned; they are consumed by their parent action.
  pub fn children_reacting_to(&self, outcome: ReactTo) -> Vec<Arc<ProfileSnapshotWrapper>> {
    self
      .child_snapshot_wrappers
      .iter()
      .filter(|c| c.content_type() != ContentType::MappingProfile)
      .filter(|c| c.react_to.is_none_or(|r| r == outcome))
      .cloned()
      .collect()
  }

  /// True if `node` is this node's descendant (by identity, not by value).
  pub fn contains(&self, node: &Arc<ProfileSnapshotWrapper>) -> bool {
    self.path_to(node).is_some()
  }

  /// Ancestors of `node` from this root down to its direct parent.
  #[instrument(level = "trace", skip_all)]
  pub fn path_to(&self, node: &Arc<ProfileSnapshotWrapper>) -> Option<Vec<&ProfileSnapshotWrapper>> {
    for child in &self.child_snapshot_wrappers {
      if Arc::ptr_eq(child, node) {
        return Some(vec![self]);
      }
      if let Some(mut rest) = child.path_to(node) {
        rest.insert(0, self);
        return Some(rest);
      }
    }
    None
  }

  /// Direct parent of `node` within this tree.
  pub fn parent_of(&self, node: &Arc<ProfileSnapshotWrapper>) -> Option<&ProfileSnapshotWrapper> {
    self.path_to(node).and_then(|path| path.last().copied())
  }

  /// Nearest enclosing job profile of `node`.
  pub fn job_profile_of(&self, node: &Arc<ProfileSnapshotWrapper>) -> Option<&JobProfile> {
    self
      .path_to(node)?
      .into_iter()
      .rev()
      .find_map(|n| n.job_profile())
  }
}
