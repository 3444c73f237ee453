//! # inventory-import
//!
//! Event handlers for a profile-driven inventory data-import pipeline.
//!
//! ## Architecture
//!
//! A [DataImportEventPayload] carries an incoming record through a profile snapshot
//! (job -> match/action -> mapping). For each node the [EventDispatcher] picks the
//! first eligible [EventHandler]:
//!
//! - [MatchEventHandler] reads match values through a [MatchValueRegistry] and queries
//!   the existing-record collection, emitting a matched or not-matched event.
//! - [CreateItemEventHandler] maps, validates and creates an item after a duplicate
//!   barcode check.
//!
//! [ImportRunner] walks the snapshot and follows match outcomes. Collection stores are
//! callback based ([storage::Collection]); [storage::find_by_query] and [storage::add]
//! bridge them into futures.

pub mod config;
pub mod error;
pub mod handlers;
pub mod mapping;
pub mod marc;
pub mod payload_io;
pub mod registry;
pub mod runner;
pub mod storage;
pub mod types;

pub use config::ImportConfig;
pub use error::{ErrorKind, HandlerError};
pub use handlers::{CreateItemEventHandler, EventDispatcher, EventHandler, MatchEventHandler};
pub use mapping::{EntityWriterFactory, MappingManager, MarcBibReaderFactory};
pub use registry::{
  HoldingsLoader, InstanceLoader, ItemLoader, MarcValueReader, MatchValueRegistry,
};
pub use runner::{ImportResult, ImportRunner, RunError};
pub use storage::{InMemoryStorage, StoreError, StoreSeed};
pub use types::{DataImportEventPayload, DataImportEventType, ProfileSnapshotWrapper};
