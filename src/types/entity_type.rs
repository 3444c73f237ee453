//! Record and entity types that flow through an import.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of an incoming record or an inventory entity.
///
/// The string form doubles as the key under which a serialized entity is stored in the
/// payload context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
  MarcBibliographic,
  MarcHoldings,
  MarcAuthority,
  Instance,
  Holdings,
  Item,
  Order,
  Invoice,
}

impl EntityType {
  pub const ALL: [EntityType; 8] = [
    EntityType::MarcBibliographic,
    EntityType::MarcHoldings,
    EntityType::MarcAuthority,
    EntityType::Instance,
    EntityType::Holdings,
    EntityType::Item,
    EntityType::Order,
    EntityType::Invoice,
  ];

  /// Context key / wire token for this type.
  pub fn as_str(&self) -> &'static str {
    match self {
      EntityType::MarcBibliographic => "MARC_BIBLIOGRAPHIC",
      EntityType::MarcHoldings => "MARC_HOLDINGS",
      EntityType::MarcAuthority => "MARC_AUTHORITY",
      EntityType::Instance => "INSTANCE",
      EntityType::Holdings => "HOLDINGS",
      EntityType::Item => "ITEM",
      EntityType::Order => "ORDER",
      EntityType::Invoice => "INVOICE",
    }
  }

  /// Prefix used by field expressions that address this entity (`instance.hrid`).
  pub fn field_prefix(&self) -> &'static str {
    match self {
      EntityType::MarcBibliographic => "marc_bibliographic",
      EntityType::MarcHoldings => "marc_holdings",
      EntityType::MarcAuthority => "marc_authority",
      EntityType::Instance => "instance",
      EntityType::Holdings => "holdingsrecord",
      EntityType::Item => "item",
      EntityType::Order => "order",
      EntityType::Invoice => "invoice",
    }
  }

  pub fn is_marc(&self) -> bool {
    matches!(
      self,
      EntityType::MarcBibliographic | EntityType::MarcHoldings | EntityType::MarcAuthority
    )
  }
}

impl fmt::Display for EntityType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
