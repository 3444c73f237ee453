//! In-memory collection store honouring the callback contract.
//!
//! Callbacks are delivered from a spawned task when a tokio runtime is available, so
//! completion happens off the caller's stack the way a remote store would. Each
//! collection counts its calls and can be told to fail, throw or drop its callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
  Collection, Failure, FailureCallback, Holdings, Instance, Item, MultipleRecords,
  PagingParameters, Query, Storage, StorageContext, StoreError, StoredEntity, Success,
  SuccessCallback,
};

/// How the next calls of one operation complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FailureMode {
  #[default]
  None,
  /// Invoke the failure callback with this failure.
  Fail(Failure),
  /// Return an error synchronously without registering the callbacks.
  Throw(String),
  /// Drop both callbacks without invoking either.
  DropCallbacks,
  /// Invoke the success callback and then the failure callback.
  BothCallbacks,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn deliver(f: impl FnOnce() + Send + 'static) {
  match tokio::runtime::Handle::try_current() {
    Ok(handle) => {
      handle.spawn(async move { f() });
    }
    Err(_) => f(),
  }
}

/// Collection of one entity type held in memory.
pub struct InMemoryCollection<T> {
  records: Mutex<Vec<T>>,
  find_mode: Mutex<FailureMode>,
  add_mode: Mutex<FailureMode>,
  find_calls: AtomicUsize,
  add_calls: AtomicUsize,
  queries: Mutex<Vec<String>>,
}

impl<T: StoredEntity> Default for InMemoryCollection<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: StoredEntity> InMemoryCollection<T> {
  pub fn new() -> Self {
    Self::with_records(vec![])
  }

  pub fn with_records(records: Vec<T>) -> Self {
    Self {
      records: Mutex::new(records),
      find_mode: Mutex::new(FailureMode::None),
      add_mode: Mutex::new(FailureMode::None),
      find_calls: AtomicUsize::new(0),
      add_calls: AtomicUsize::new(0),
      queries: Mutex::new(vec![]),
    }
  }

  pub fn insert(&self, record: T) {
    lock(&self.records).push(record);
  }

  pub fn records(&self) -> Vec<T> {
    lock(&self.records).clone()
  }

  pub fn len(&self) -> usize {
    lock(&self.records).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn set_find_mode(&self, mode: FailureMode) {
    *lock(&self.find_mode) = mode;
  }

  pub fn set_add_mode(&self, mode: FailureMode) {
    *lock(&self.add_mode) = mode;
  }

  /// Number of `find_by_query` calls, including ones that failed.
  pub fn find_calls(&self) -> usize {
    self.find_calls.load(Ordering::SeqCst)
  }

  /// Number of `add` calls, including ones that failed.
  pub fn add_calls(&self) -> usize {
    self.add_calls.load(Ordering::SeqCst)
  }

  /// Query strings received, in call order.
  pub fn queries(&self) -> Vec<String> {
    lock(&self.queries).clone()
  }

  fn select(&self, query: &Query, paging: PagingParameters) -> Result<MultipleRecords<T>, StoreError> {
    let records = lock(&self.records);
    let mut matched = vec![];
    for record in records.iter() {
      let json = serde_json::to_value(record).map_err(|e| StoreError::Rejected(e.to_string()))?;
      if query.matches(&json) {
        matched.push(record.clone());
      }
    }
    let total = matched.len();
    let page = matched
      .into_iter()
      .skip(paging.offset as usize)
      .take(paging.limit as usize)
      .collect();
    Ok(MultipleRecords::new(page, total))
  }
}

/// Completes a call according to `mode`; `result` is only computed on the success path.
fn complete<R: Send + 'static>(
  mode: FailureMode,
  result: impl FnOnce() -> Result<R, StoreError>,
  on_success: SuccessCallback<R>,
  on_failure: FailureCallback,
) -> Result<(), StoreError> {
  match mode {
    FailureMode::None => {
      let result = result()?;
      deliver(move || on_success(Success::new(result)));
    }
    FailureMode::Fail(failure) => deliver(move || on_failure(failure)),
    FailureMode::Throw(reason) => return Err(StoreError::Rejected(reason)),
    FailureMode::DropCallbacks => {
      deliver(move || {
        drop(on_success);
        drop(on_failure);
      });
    }
    FailureMode::BothCallbacks => {
      let result = result()?;
      deliver(move || {
        on_success(Success::new(result));
        on_failure(Failure::new("late failure", 500));
      });
    }
  }
  Ok(())
}

impl<T: StoredEntity> Collection<T> for InMemoryCollection<T> {
  fn find_by_query(
    &self,
    query: &str,
    paging: PagingParameters,
    on_success: SuccessCallback<MultipleRecords<T>>,
    on_failure: FailureCallback,
  ) -> Result<(), StoreError> {
    self.find_calls.fetch_add(1, Ordering::SeqCst);
    lock(&self.queries).push(query.to_string());
    let mode = lock(&self.find_mode).clone();
    let parsed = Query::parse(query)?;
    complete(
      mode,
      || {
        let found = self.select(&parsed, paging)?;
        debug!(query = %query, total = found.total_records, "in-memory find");
        Ok(found)
      },
      on_success,
      on_failure,
    )
  }

  fn add(
    &self,
    mut entity: T,
    on_success: SuccessCallback<T>,
    on_failure: FailureCallback,
  ) -> Result<(), StoreError> {
    self.add_calls.fetch_add(1, Ordering::SeqCst);
    let mode = lock(&self.add_mode).clone();
    complete(
      mode,
      || {
        if entity.id().is_none_or(str::is_empty) {
          entity.set_id(uuid::Uuid::new_v4().to_string());
        }
        lock(&self.records).push(entity.clone());
        Ok(entity)
      },
      on_success,
      on_failure,
    )
  }
}

/// Initial contents of an [InMemoryStorage].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSeed {
  #[serde(default)]
  pub instances: Vec<Instance>,
  #[serde(default)]
  pub holdings: Vec<Holdings>,
  #[serde(default)]
  pub items: Vec<Item>,
}

/// One tenant's instance, holdings and item collections.
#[derive(Default)]
pub struct InMemoryStorage {
  instances: Arc<InMemoryCollection<Instance>>,
  holdings: Arc<InMemoryCollection<Holdings>>,
  items: Arc<InMemoryCollection<Item>>,
}

impl InMemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_seed(seed: StoreSeed) -> Self {
    Self {
      instances: Arc::new(InMemoryCollection::with_records(seed.instances)),
      holdings: Arc::new(InMemoryCollection::with_records(seed.holdings)),
      items: Arc::new(InMemoryCollection::with_records(seed.items)),
    }
  }

  pub fn instances(&self) -> &Arc<InMemoryCollection<Instance>> {
    &self.instances
  }

  pub fn holdings(&self) -> &Arc<InMemoryCollection<Holdings>> {
    &self.holdings
  }

  pub fn items(&self) -> &Arc<InMemoryCollection<Item>> {
    &self.items
  }
}

impl Storage for InMemoryStorage {
  fn instance_collection(&self, _ctx: &StorageContext) -> Arc<dyn Collection<Instance>> {
    self.instances.clone()
  }

  fn holdings_collection(&self, _ctx: &StorageContext) -> Arc<dyn Collection<Holdings>> {
    self.holdings.clone()
  }

  fn item_collection(&self, _ctx: &StorageContext) -> Arc<dyn Collection<Item>> {
    self.items.clone()
  }
}
