//! Event payload and store seed save/load (JSON).

use std::io;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::storage::StoreSeed;
use crate::types::DataImportEventPayload;

fn invalid_data(e: serde_json::Error) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidData, e)
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), io::Error> {
  let json = serde_json::to_string_pretty(value).map_err(invalid_data)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, io::Error> {
  let bytes = std::fs::read(path)?;
  serde_json::from_slice(&bytes).map_err(invalid_data)
}

/// Saves a payload to `path`, creating parent directories.
#[instrument(level = "trace", skip(path, payload))]
pub fn save_payload(path: &Path, payload: &DataImportEventPayload) -> Result<(), io::Error> {
  save_json(path, payload)
}

/// Loads a payload and re-links its current node into its snapshot.
#[instrument(level = "trace", skip(path))]
pub fn load_payload(path: &Path) -> Result<DataImportEventPayload, io::Error> {
  let mut payload: DataImportEventPayload = load_json(path)?;
  if payload.current_node.is_some() && !payload.relink_current_node() {
    warn!(path = %path.display(), "current node not found in profile snapshot");
    return Err(io::Error::new(
      io::ErrorKind::InvalidData,
      "currentNode is not part of profileSnapshot",
    ));
  }
  Ok(payload)
}

/// Loads initial contents for the in-memory store.
#[instrument(level = "trace", skip(path))]
pub fn load_store_seed(path: &Path) -> Result<StoreSeed, io::Error> {
  load_json(path)
}
