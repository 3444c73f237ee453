//! Collection store contract and its bridge from callbacks to futures.
//!
//! Stores report completion through one of two callbacks, possibly on another thread.
//! [find_by_query] and [add] wrap that into a single future that resolves exactly once:
//! the first callback wins, a second one is ignored, and a store that drops both
//! callbacks without calling either resolves to [StoreError::Abandoned].

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{Failure, Holdings, Instance, Item, MultipleRecords, PagingParameters, Success};
use crate::types::DataImportEventPayload;

pub type SuccessCallback<T> = Box<dyn FnOnce(Success<T>) + Send + 'static>;
pub type FailureCallback = Box<dyn FnOnce(Failure) + Send + 'static>;

/// Failure of a collection store call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
  /// The store invoked its failure callback.
  #[error("{0}")]
  Failure(Failure),
  /// The store call failed before it could register the callbacks.
  #[error("store call rejected: {0}")]
  Rejected(String),
  /// The store dropped both callbacks without invoking either.
  #[error("store completed without invoking a callback")]
  Abandoned,
  /// The query could not be understood by the store.
  #[error("invalid query '{query}': {reason}")]
  InvalidQuery { query: String, reason: String },
}

/// Tenant addressing for store calls, taken from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageContext {
  pub okapi_url: Option<String>,
  pub tenant: Option<String>,
  pub token: Option<String>,
}

impl StorageContext {
  pub fn from_payload(payload: &DataImportEventPayload) -> Self {
    Self {
      okapi_url: payload.okapi_url.clone(),
      tenant: payload.tenant.clone(),
      token: payload.token.clone(),
    }
  }
}

/// Callback-style collection of one entity type.
///
/// Returning `Err` models a store that throws synchronously; callbacks are dropped
/// uncalled in that case.
pub trait Collection<T>: Send + Sync {
  fn find_by_query(
    &self,
    query: &str,
    paging: PagingParameters,
    on_success: SuccessCallback<MultipleRecords<T>>,
    on_failure: FailureCallback,
  ) -> Result<(), StoreError>;

  fn add(
    &self,
    entity: T,
    on_success: SuccessCallback<T>,
    on_failure: FailureCallback,
  ) -> Result<(), StoreError>;
}

/// Access to the per-entity collections of one tenant.
pub trait Storage: Send + Sync {
  fn instance_collection(&self, ctx: &StorageContext) -> Arc<dyn Collection<Instance>>;
  fn holdings_collection(&self, ctx: &StorageContext) -> Arc<dyn Collection<Holdings>>;
  fn item_collection(&self, ctx: &StorageContext) -> Arc<dyn Collection<Item>>;
}

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, StoreError>>>>>;

fn take_sender<T>(slot: &Slot<T>) -> Option<oneshot::Sender<Result<T, StoreError>>> {
  slot.lock().ok().and_then(|mut guard| guard.take())
}

/// Builds a callback pair sharing one completion slot.
pub(crate) fn completion<T: Send + 'static>() -> (
  SuccessCallback<T>,
  FailureCallback,
  oneshot::Receiver<Result<T, StoreError>>,
) {
  let (tx, rx) = oneshot::channel();
  let slot: Slot<T> = Arc::new(Mutex::new(Some(tx)));
  let success_slot = Arc::clone(&slot);
  let on_success: SuccessCallback<T> = Box::new(move |success: Success<T>| {
    match take_sender(&success_slot) {
      Some(tx) => {
        let _ = tx.send(Ok(success.result));
      }
      None => warn!("store invoked success callback after completion; ignored"),
    }
  });
  let on_failure: FailureCallback = Box::new(move |failure: Failure| match take_sender(&slot) {
    Some(tx) => {
      let _ = tx.send(Err(StoreError::Failure(failure)));
    }
    None => warn!(reason = %failure, "store invoked failure callback after completion; ignored"),
  });
  (on_success, on_failure, rx)
}

async fn await_completion<T>(
  rx: oneshot::Receiver<Result<T, StoreError>>,
) -> Result<T, StoreError> {
  rx.await.map_err(|_| StoreError::Abandoned)?
}

/// Runs a query and resolves once the store calls back.
pub async fn find_by_query<T, C>(
  collection: &C,
  query: &str,
  paging: PagingParameters,
) -> Result<MultipleRecords<T>, StoreError>
where
  T: Send + 'static,
  C: Collection<T> + ?Sized,
{
  debug!(query = %query, limit = paging.limit, "find_by_query");
  let (on_success, on_failure, rx) = completion();
  collection.find_by_query(query, paging, on_success, on_failure)?;
  await_completion(rx).await
}

/// Adds an entity and resolves with the stored copy once the store calls back.
pub async fn add<T, C>(collection: &C, entity: T) -> Result<T, StoreError>
where
  T: Send + 'static,
  C: Collection<T> + ?Sized,
{
  let (on_success, on_failure, rx) = completion();
  collection.add(entity, on_success, on_failure)?;
  await_completion(rx).await
}
