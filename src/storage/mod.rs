//! Collection store interface for inventory entities, with an in-memory implementation.

mod collection;
mod domain;
mod memory;
mod query;

pub use collection::{
  Collection, FailureCallback, Storage, StorageContext, StoreError, SuccessCallback, add,
  find_by_query,
};
pub use domain::{
  Failure, Holdings, Instance, Item, ItemStatus, ItemStatusName, MultipleRecords,
  PagingParameters, StoredEntity, Success,
};
pub use memory::{FailureMode, InMemoryCollection, InMemoryStorage, StoreSeed};
pub use query::{Condition, Query};
