//! Event-type tokens emitted and consumed by the inventory handlers.

use std::fmt;

/// Data-import event types known to this crate.
///
/// Payloads carry the event type as a plain string so that tokens owned by other
/// pipeline modules pass through untouched; this enum only names the ones handlers here
/// consume or emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataImportEventType {
  SrsMarcBibRecordCreated,
  InventoryInstanceMatched,
  InventoryInstanceNotMatched,
  InventoryHoldingMatched,
  InventoryHoldingNotMatched,
  InventoryItemMatched,
  InventoryItemNotMatched,
  InventoryItemCreated,
}

impl DataImportEventType {
  pub const ALL: [DataImportEventType; 8] = [
    DataImportEventType::SrsMarcBibRecordCreated,
    DataImportEventType::InventoryInstanceMatched,
    DataImportEventType::InventoryInstanceNotMatched,
    DataImportEventType::InventoryHoldingMatched,
    DataImportEventType::InventoryHoldingNotMatched,
    DataImportEventType::InventoryItemMatched,
    DataImportEventType::InventoryItemNotMatched,
    DataImportEventType::InventoryItemCreated,
  ];

  /// Parses a known token; foreign tokens yield `None`.
  pub fn from_token(token: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|t| t.as_str() == token)
  }

  /// True for the "not matched" outcome of a match handler.
  pub fn is_not_matched(&self) -> bool {
    matches!(
      self,
      DataImportEventType::InventoryInstanceNotMatched
        | DataImportEventType::InventoryHoldingNotMatched
        | DataImportEventType::InventoryItemNotMatched
    )
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      DataImportEventType::SrsMarcBibRecordCreated => "DI_SRS_MARC_BIB_RECORD_CREATED",
      DataImportEventType::InventoryInstanceMatched => "DI_INVENTORY_INSTANCE_MATCHED",
      DataImportEventType::InventoryInstanceNotMatched => "DI_INVENTORY_INSTANCE_NOT_MATCHED",
      DataImportEventType::InventoryHoldingMatched => "DI_INVENTORY_HOLDING_MATCHED",
      DataImportEventType::InventoryHoldingNotMatched => "DI_INVENTORY_HOLDING_NOT_MATCHED",
      DataImportEventType::InventoryItemMatched => "DI_INVENTORY_ITEM_MATCHED",
      DataImportEventType::InventoryItemNotMatched => "DI_INVENTORY_ITEM_NOT_MATCHED",
      DataImportEventType::InventoryItemCreated => "DI_INVENTORY_ITEM_CREATED",
    }
  }
}

impl fmt::Display for DataImportEventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<DataImportEventType> for String {
  fn from(t: DataImportEventType) -> Self {
    t.as_str().to_string()
  }
}
