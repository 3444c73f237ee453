//! CLI: run an import event payload through its profile snapshot.
//!
//! Usage: `run_import --payload <payload.json> [--store <seed.json>] [--out <result.json>]`
//!
//! Uses an in-memory store seeded from `--store` and the MARC reference readers.
//! Set RUST_LOG=inventory_import=trace for TRACE-level spans.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use inventory_import::{
  CreateItemEventHandler, EntityWriterFactory, EventDispatcher, HoldingsLoader, ImportConfig,
  ImportRunner, InMemoryStorage, InstanceLoader, ItemLoader, MappingManager, MarcBibReaderFactory,
  MarcValueReader, MatchEventHandler, MatchValueRegistry, RunError, StoreSeed, payload_io,
  types::EntityType,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

#[derive(Parser, Debug)]
#[command(name = "run_import")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  INVENTORY_IMPORT_OKAPI_URL    Storage base URL passed to the store.
  INVENTORY_IMPORT_TENANT       Tenant id passed to the store.
  INVENTORY_IMPORT_TOKEN        Token passed to the store.
  INVENTORY_IMPORT_PAGE_LIMIT   Page size for match and duplicate queries (default 10).

Examples:
  run_import --payload payload.json
  run_import --payload payload.json --store seed.json --out result.json"#
)]
struct Args {
  /// Event payload JSON with profileSnapshot and context.
  #[arg(long, value_name = "FILE")]
  payload: PathBuf,

  /// Seed for the in-memory store (instances, holdings, items).
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Where to write the final payload.
  #[arg(long, value_name = "FILE")]
  out: Option<PathBuf>,

  #[arg(long, value_name = "URL")]
  okapi_url: Option<String>,

  #[arg(long)]
  tenant: Option<String>,

  #[arg(long)]
  token: Option<String>,

  #[arg(
    long,
    default_value_t = inventory_import::config::DEFAULT_PAGE_LIMIT,
    value_parser = clap::value_parser!(u32).range(1..)
  )]
  page_limit: u32,
}

fn fail(msg: impl std::fmt::Display) -> ! {
  eprintln!("{msg}");
  process::exit(1);
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .init();

  info!("run_import starting");
  let args = Args::parse();

  let config = ImportConfig {
    okapi_url: args.okapi_url.clone(),
    tenant: args.tenant.clone(),
    token: args.token.clone(),
    page_limit: args.page_limit,
  }
  .with_env()
  .unwrap_or_else(|e| fail(format!("Invalid configuration: {e}")));
  info!(tenant = ?config.tenant, page_limit = config.page_limit, "options (env or flags)");

  let mut payload = payload_io::load_payload(&args.payload)
    .unwrap_or_else(|e| fail(format!("Error reading {}: {}", args.payload.display(), e)));
  config.apply_to(&mut payload);

  let seed = match &args.store {
    Some(path) => payload_io::load_store_seed(path)
      .unwrap_or_else(|e| fail(format!("Error reading {}: {}", path.display(), e))),
    None => StoreSeed::default(),
  };
  let storage = Arc::new(InMemoryStorage::from_seed(seed));

  let mut registry = MatchValueRegistry::new();
  registry.register_reader(MarcValueReader::new());
  registry.register_loader(InstanceLoader::new(storage.clone()).with_paging(config.paging()));
  registry.register_loader(HoldingsLoader::new(storage.clone()).with_paging(config.paging()));
  registry.register_loader(ItemLoader::new(storage.clone()).with_paging(config.paging()));
  let registry = Arc::new(registry);

  let mut mapping = MappingManager::new();
  mapping.register_reader_factory(MarcBibReaderFactory);
  mapping.register_writer_factory(EntityWriterFactory::new(EntityType::Item));

  let mut dispatcher = EventDispatcher::new();
  dispatcher.register(MatchEventHandler::instance(registry.clone()));
  dispatcher.register(MatchEventHandler::holdings(registry.clone()));
  dispatcher.register(MatchEventHandler::item(registry));
  dispatcher.register(
    CreateItemEventHandler::new(Arc::new(mapping), storage.clone()).with_paging(config.paging()),
  );

  let result = match ImportRunner::new(Arc::new(dispatcher)).run(payload).await {
    Ok(r) => r,
    Err(RunError::Handler {
      node_id,
      source,
      partial,
    }) => {
      eprintln!("Import failed at node {node_id} ({:?}): {source}", source.kind());
      for s in &partial.log.steps {
        eprintln!("  step {} {} {}", s.step, s.node_id, s.status);
      }
      process::exit(1);
    }
    Err(e) => fail(format!("Import error: {e}")),
  };

  if let Some(out) = &args.out
    && let Err(e) = payload_io::save_payload(out, &result.payload)
  {
    fail(format!("Error writing {}: {}", out.display(), e));
  }

  info!(event_type = %result.payload.event_type, steps = result.log.steps.len(), "import completed");
  println!("Import completed.");
  println!("  Event type: {}", result.payload.event_type);
  println!("  Events chain: {:?}", result.payload.events_chain);
  for s in &result.log.steps {
    println!(
      "  Step {}: {} [{}] {} -> {} ({})",
      s.step,
      s.node_id,
      s.content_type,
      s.event_type_before,
      s.event_type_after,
      s.status
    );
  }
}
