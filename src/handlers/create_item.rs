//! Item creation from an incoming MARC record under a CREATE/ITEM action profile.
//!
//! Every step gates the next: source record, holdings link, mapping, validation,
//! barcode uniqueness, then the store write. Nothing is written on a failed step.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as Json;
use tracing::{debug, info, instrument, warn};

use super::eligibility::{Target, is_eligible_for};
use super::outcome::{Outcome, emit};
use super::EventHandler;
use crate::error::HandlerError;
use crate::mapping::MappingManager;
use crate::marc::MarcRecord;
use crate::registry::read_marc_values;
use crate::storage::{
  Item, ItemStatus, ItemStatusName, PagingParameters, Query, Storage, StorageContext, add,
  find_by_query,
};
use crate::types::{
  Action, ContentType, DataImportEventPayload, DataImportEventType, EntityType, Value,
};

/// One way of finding the holdings record a new item belongs to.
pub type HoldingsIdSource = fn(&DataImportEventPayload) -> Result<Option<String>, HandlerError>;

/// Holdings id sources, tried in order.
pub const HOLDINGS_ID_SOURCES: [(&str, HoldingsIdSource); 2] = [
  ("context holdings", holdings_id_from_context),
  ("record 999ff$h", holdings_id_from_record),
];

/// Id of the holdings entity in the payload context.
pub fn holdings_id_from_context(payload: &DataImportEventPayload) -> Result<Option<String>, HandlerError> {
  let Some(raw) = payload.context_entity(EntityType::Holdings) else {
    return Ok(None);
  };
  if raw.trim().is_empty() {
    return Ok(None);
  }
  let holdings: Json = serde_json::from_str(raw)?;
  Ok(non_empty_str(&holdings, &["id"]))
}

/// Holdings id embedded in the MARC source record, field 999 ind1 `f` ind2 `f` subfield `h`.
pub fn holdings_id_from_record(payload: &DataImportEventPayload) -> Result<Option<String>, HandlerError> {
  let Some(raw) = payload.context_entity(EntityType::MarcBibliographic) else {
    return Ok(None);
  };
  let record = MarcRecord::from_json(raw)?;
  Ok(
    match read_marc_values(&record, "999", Some("f"), Some("f"), Some("h"))? {
      Value::String(id) => Some(id),
      Value::List(ids) => ids.into_iter().next(),
      Value::Missing => None,
    },
  )
}

#[instrument(level = "trace", skip(payload))]
pub(crate) fn resolve_holdings_id(payload: &DataImportEventPayload) -> Result<String, HandlerError> {
  for (name, source) in HOLDINGS_ID_SOURCES {
    if let Some(id) = source(payload)? {
      debug!(source = name, holdings_id = %id, "resolved holdings id");
      return Ok(id);
    }
  }
  Err(HandlerError::MissingLinkId(EntityType::Holdings))
}

fn non_empty_str(doc: &Json, path: &[&str]) -> Option<String> {
  let mut current = doc;
  for segment in path {
    current = current.get(segment)?;
  }
  current
    .as_str()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// Barcode of a mapped document; several mapped values cannot be arbitrated.
fn mapped_barcode(doc: &Json) -> Result<Option<String>, HandlerError> {
  match doc.get("barcode") {
    None | Some(Json::Null) => Ok(None),
    Some(Json::String(_)) => Ok(non_empty_str(doc, &["barcode"])),
    Some(_) => Err(HandlerError::InvalidField("barcode".to_string())),
  }
}

/// Converts a mapped item document into an [Item] linked to `holdings_id`.
///
/// Reference fields are accepted nested (`permanentLoanType.id`) or flat
/// (`permanentLoanTypeId`).
pub(crate) fn item_from_mapped(doc: &Json, holdings_id: String) -> Result<Item, HandlerError> {
  let nested_or_flat = |object: &str, flat: &str| {
    non_empty_str(doc, &[object, "id"]).or_else(|| non_empty_str(doc, &[flat]))
  };
  Ok(Item {
    id: non_empty_str(doc, &["id"]),
    hrid: non_empty_str(doc, &["hrid"]),
    barcode: mapped_barcode(doc)?,
    status: doc
      .get("status")
      .and_then(|s| s.get("name"))
      .and_then(Json::as_str)
      .map(|name| ItemStatus {
        name: name.trim().to_string(),
      }),
    material_type_id: nested_or_flat("materialType", "materialTypeId"),
    permanent_loan_type_id: nested_or_flat("permanentLoanType", "permanentLoanTypeId"),
    holdings_record_id: Some(holdings_id),
  })
}

/// Required-field check; the error names the first offending field.
#[instrument(level = "trace", skip(item))]
pub(crate) fn validate_item(item: &Item) -> Result<(), HandlerError> {
  let status_ok = item
    .status
    .as_ref()
    .is_some_and(|s| ItemStatusName::from_value(&s.name).is_some());
  if !status_ok {
    return Err(HandlerError::InvalidField("status.name".to_string()));
  }
  if item.permanent_loan_type_id.as_deref().is_none_or(str::is_empty) {
    return Err(HandlerError::InvalidField("permanentLoanType.id".to_string()));
  }
  if item.material_type_id.as_deref().is_none_or(str::is_empty) {
    return Err(HandlerError::InvalidField("materialType.id".to_string()));
  }
  Ok(())
}

/// Creates items for ACTION_PROFILE(CREATE, ITEM) nodes.
pub struct CreateItemEventHandler {
  target: Target,
  mapping: Arc<MappingManager>,
  storage: Arc<dyn Storage>,
  paging: PagingParameters,
}

impl CreateItemEventHandler {
  pub fn new(mapping: Arc<MappingManager>, storage: Arc<dyn Storage>) -> Self {
    Self {
      target: Target::Action {
        action: Action::Create,
        folio_record: EntityType::Item,
      },
      mapping,
      storage,
      paging: PagingParameters::default(),
    }
  }

  /// Paging used by the duplicate barcode lookup.
  pub fn with_paging(mut self, paging: PagingParameters) -> Self {
    self.paging = paging;
    self
  }
}

#[async_trait]
impl EventHandler for CreateItemEventHandler {
  fn name(&self) -> &str {
    "create-item"
  }

  fn is_eligible(&self, payload: &DataImportEventPayload) -> bool {
    is_eligible_for(&self.target, payload)
  }

  async fn handle(
    &self,
    payload: &DataImportEventPayload,
  ) -> Result<DataImportEventPayload, HandlerError> {
    let node = payload.current_node.as_ref().ok_or(HandlerError::NoCurrentNode)?;
    if node.content_type() != ContentType::ActionProfile {
      return Err(HandlerError::UnexpectedNode {
        expected: ContentType::ActionProfile,
        actual: node.content_type(),
      });
    }
    let node_id = node.display_id();

    if payload
      .context_entity(EntityType::MarcBibliographic)
      .is_none_or(|r| r.trim().is_empty())
    {
      return Err(HandlerError::MissingSourceRecord(EntityType::MarcBibliographic));
    }
    let holdings_id = resolve_holdings_id(payload)?;

    let mapping_profile = node
      .first_child_of(ContentType::MappingProfile)
      .and_then(|m| m.mapping_profile())
      .ok_or(HandlerError::NoMappingProfile)?;
    let mapped = self.mapping.map(payload, mapping_profile)?;
    let item = item_from_mapped(&mapped, holdings_id)?;
    validate_item(&item)?;

    let ctx = StorageContext::from_payload(payload);
    let items = self.storage.item_collection(&ctx);
    if let Some(barcode) = item.barcode.as_deref() {
      let query = Query::new().and_equals("barcode", barcode).to_string();
      let existing = find_by_query(items.as_ref(), &query, self.paging).await?;
      if existing.total_records > 0 {
        warn!(node_id = %node_id, barcode = %barcode, "item barcode already exists");
        return Err(HandlerError::DuplicateKey {
          entity_type: EntityType::Item,
          field: "barcode".to_string(),
          value: barcode.to_string(),
        });
      }
    }

    let created = add(items.as_ref(), item).await?;
    info!(
      node_id = %node_id,
      item_id = created.id.as_deref().unwrap_or_default(),
      holdings_id = created.holdings_record_id.as_deref().unwrap_or_default(),
      "item created"
    );
    let serialized = serde_json::to_string(&created)?;
    Ok(emit(
      payload,
      Outcome::new(DataImportEventType::InventoryItemCreated).with_entity(EntityType::Item, serialized),
    ))
  }
}
