//! Tests for `EntityType`.

use super::EntityType;

#[test]
fn as_str_matches_wire_token() {
  assert_eq!(EntityType::MarcBibliographic.as_str(), "MARC_BIBLIOGRAPHIC");
  assert_eq!(EntityType::Holdings.as_str(), "HOLDINGS");
  assert_eq!(EntityType::Item.to_string(), "ITEM");
}

#[test]
fn serde_uses_screaming_snake_case() {
  for t in EntityType::ALL {
    let json = serde_json::to_string(&t).unwrap();
    assert_eq!(json, format!("\"{}\"", t.as_str()));
    let back: EntityType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);
  }
}

#[test]
fn marc_types() {
  assert!(EntityType::MarcBibliographic.is_marc());
  assert!(EntityType::MarcHoldings.is_marc());
  assert!(!EntityType::Instance.is_marc());
}

#[test]
fn field_prefix_for_inventory_entities() {
  assert_eq!(EntityType::Instance.field_prefix(), "instance");
  assert_eq!(EntityType::Item.field_prefix(), "item");
  assert_eq!(EntityType::Holdings.field_prefix(), "holdingsrecord");
}
