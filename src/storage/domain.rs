//! Inventory domain entities and the result envelopes the collection store speaks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity with a store-assigned identity.
pub trait StoredEntity: Clone + Serialize + Send + Sync + 'static {
  fn id(&self) -> Option<&str>;
  fn set_id(&mut self, id: String);
}

/// Recognized item status names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatusName {
  AgedToLost,
  Available,
  AwaitingPickup,
  AwaitingDelivery,
  CheckedOut,
  ClaimedReturned,
  DeclaredLost,
  InProcess,
  InProcessNonRequestable,
  InTransit,
  IntellectualItem,
  LongMissing,
  LostAndPaid,
  Missing,
  OnOrder,
  OrderClosed,
  Paged,
  Restricted,
  Unavailable,
  Unknown,
  Withdrawn,
}

impl ItemStatusName {
  pub const ALL: [ItemStatusName; 21] = [
    ItemStatusName::AgedToLost,
    ItemStatusName::Available,
    ItemStatusName::AwaitingPickup,
    ItemStatusName::AwaitingDelivery,
    ItemStatusName::CheckedOut,
    ItemStatusName::ClaimedReturned,
    ItemStatusName::DeclaredLost,
    ItemStatusName::InProcess,
    ItemStatusName::InProcessNonRequestable,
    ItemStatusName::InTransit,
    ItemStatusName::IntellectualItem,
    ItemStatusName::LongMissing,
    ItemStatusName::LostAndPaid,
    ItemStatusName::Missing,
    ItemStatusName::OnOrder,
    ItemStatusName::OrderClosed,
    ItemStatusName::Paged,
    ItemStatusName::Restricted,
    ItemStatusName::Unavailable,
    ItemStatusName::Unknown,
    ItemStatusName::Withdrawn,
  ];

  pub fn value(&self) -> &'static str {
    match self {
      ItemStatusName::AgedToLost => "Aged to lost",
      ItemStatusName::Available => "Available",
      ItemStatusName::AwaitingPickup => "Awaiting pickup",
      ItemStatusName::AwaitingDelivery => "Awaiting delivery",
      ItemStatusName::CheckedOut => "Checked out",
      ItemStatusName::ClaimedReturned => "Claimed returned",
      ItemStatusName::DeclaredLost => "Declared lost",
      ItemStatusName::InProcess => "In process",
      ItemStatusName::InProcessNonRequestable => "In process (non-requestable)",
      ItemStatusName::InTransit => "In transit",
      ItemStatusName::IntellectualItem => "Intellectual item",
      ItemStatusName::LongMissing => "Long missing",
      ItemStatusName::LostAndPaid => "Lost and paid",
      ItemStatusName::Missing => "Missing",
      ItemStatusName::OnOrder => "On order",
      ItemStatusName::OrderClosed => "Order closed",
      ItemStatusName::Paged => "Paged",
      ItemStatusName::Restricted => "Restricted",
      ItemStatusName::Unavailable => "Unavailable",
      ItemStatusName::Unknown => "Unknown",
      ItemStatusName::Withdrawn => "Withdrawn",
    }
  }

  /// Exact-name lookup; unrecognized names yield `None`.
  pub fn from_value(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.value() == name)
  }
}

impl fmt::Display for ItemStatusName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.value())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatus {
  pub name: String,
}

impl From<ItemStatusName> for ItemStatus {
  fn from(name: ItemStatusName) -> Self {
    Self {
      name: name.value().to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hrid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub barcode: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<ItemStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub material_type_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub permanent_loan_type_id: Option<String>,
  /// Link to the owning holdings record, `holdingId` on the wire.
  #[serde(
    default,
    rename = "holdingId",
    alias = "holdingsRecordId",
    skip_serializing_if = "Option::is_none"
  )]
  pub holdings_record_id: Option<String>,
}

impl StoredEntity for Item {
  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: String) {
    self.id = Some(id);
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hrid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub instance_type_id: Option<String>,
}

impl StoredEntity for Instance {
  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: String) {
    self.id = Some(id);
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holdings {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hrid: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub instance_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub permanent_location_id: Option<String>,
}

impl StoredEntity for Holdings {
  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: String) {
    self.id = Some(id);
  }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleRecords<T> {
  pub records: Vec<T>,
  pub total_records: usize,
}

impl<T> MultipleRecords<T> {
  pub fn new(records: Vec<T>, total_records: usize) -> Self {
    Self {
      records,
      total_records,
    }
  }

  pub fn empty() -> Self {
    Self {
      records: vec![],
      total_records: 0,
    }
  }
}

/// Successful store completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
  pub result: T,
}

impl<T> Success<T> {
  pub fn new(result: T) -> Self {
    Self { result }
  }
}

/// Failed store completion as reported through the failure callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
  pub reason: String,
  pub status_code: u16,
}

impl Failure {
  pub fn new(reason: impl Into<String>, status_code: u16) -> Self {
    Self {
      reason: reason.into(),
      status_code,
    }
  }
}

impl fmt::Display for Failure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} (status {})", self.reason, self.status_code)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingParameters {
  pub limit: u32,
  pub offset: u32,
}

impl PagingParameters {
  pub fn new(limit: u32, offset: u32) -> Self {
    Self { limit, offset }
  }
}

impl Default for PagingParameters {
  fn default() -> Self {
    Self {
      limit: 10,
      offset: 0,
    }
  }
}
