//! Match value loaders: run a match query against the existing-record collection.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::HandlerError;
use crate::storage::{
  Collection, Holdings, Instance, Item, PagingParameters, Query, Storage, StorageContext,
  find_by_query,
};
use crate::types::{DataImportEventPayload, EntityType};

/// Records found by a loader, serialized for the payload context.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
  pub entity_type: EntityType,
  /// Serialized records of the first page.
  pub records: Vec<String>,
  /// Total number of records matching, across pages.
  pub total_records: usize,
}

/// Loads existing records of one entity type by query.
#[async_trait]
pub trait MatchValueLoader: Send + Sync {
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool;

  async fn load(
    &self,
    query: &Query,
    payload: &DataImportEventPayload,
  ) -> Result<LoadResult, HandlerError>;
}

type CollectionFor<T> = fn(&dyn Storage, &StorageContext) -> Arc<dyn Collection<T>>;

/// Loader backed by one collection of a [Storage].
pub struct CollectionLoader<T> {
  entity_type: EntityType,
  storage: Arc<dyn Storage>,
  collection: CollectionFor<T>,
  paging: PagingParameters,
  _entity: PhantomData<fn() -> T>,
}

pub type InstanceLoader = CollectionLoader<Instance>;
pub type HoldingsLoader = CollectionLoader<Holdings>;
pub type ItemLoader = CollectionLoader<Item>;

fn instances(storage: &dyn Storage, ctx: &StorageContext) -> Arc<dyn Collection<Instance>> {
  storage.instance_collection(ctx)
}

fn holdings(storage: &dyn Storage, ctx: &StorageContext) -> Arc<dyn Collection<Holdings>> {
  storage.holdings_collection(ctx)
}

fn items(storage: &dyn Storage, ctx: &StorageContext) -> Arc<dyn Collection<Item>> {
  storage.item_collection(ctx)
}

impl<T> CollectionLoader<T> {
  /// Paging for match queries; the limit is raised to one so a single match fits the page.
  pub fn with_paging(mut self, paging: PagingParameters) -> Self {
    self.paging = PagingParameters::new(paging.limit.max(1), paging.offset);
    self
  }
}

impl CollectionLoader<Instance> {
  pub fn new(storage: Arc<dyn Storage>) -> Self {
    Self {
      entity_type: EntityType::Instance,
      storage,
      collection: instances,
      paging: PagingParameters::default(),
      _entity: PhantomData,
    }
  }
}

impl CollectionLoader<Holdings> {
  pub fn new(storage: Arc<dyn Storage>) -> Self {
    Self {
      entity_type: EntityType::Holdings,
      storage,
      collection: holdings,
      paging: PagingParameters::default(),
      _entity: PhantomData,
    }
  }
}

impl CollectionLoader<Item> {
  pub fn new(storage: Arc<dyn Storage>) -> Self {
    Self {
      entity_type: EntityType::Item,
      storage,
      collection: items,
      paging: PagingParameters::default(),
      _entity: PhantomData,
    }
  }
}

#[async_trait]
impl<T> MatchValueLoader for CollectionLoader<T>
where
  T: Serialize + Send + Sync + 'static,
{
  fn is_eligible_for_entity_type(&self, entity_type: EntityType) -> bool {
    entity_type == self.entity_type
  }

  async fn load(
    &self,
    query: &Query,
    payload: &DataImportEventPayload,
  ) -> Result<LoadResult, HandlerError> {
    let ctx = StorageContext::from_payload(payload);
    let collection = (self.collection)(self.storage.as_ref(), &ctx);
    let rendered = query.to_string();
    debug!(entity_type = %self.entity_type, query = %rendered, "loading existing records");
    let found = find_by_query(collection.as_ref(), &rendered, self.paging).await?;
    let records = found
      .records
      .iter()
      .map(serde_json::to_string)
      .collect::<Result<Vec<_>, _>>()?;
    Ok(LoadResult {
      entity_type: self.entity_type,
      records,
      total_records: found.total_records,
    })
  }
}
