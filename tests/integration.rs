//! Integration tests that run JSON payload fixtures in tests/fixtures/ through the
//! library and the run_import CLI.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use inventory_import::types::EntityType;
use inventory_import::{
  CreateItemEventHandler, EntityWriterFactory, ErrorKind, EventDispatcher, ImportRunner,
  InMemoryStorage, InstanceLoader, MappingManager, MarcBibReaderFactory, MarcValueReader,
  MatchEventHandler, MatchValueRegistry, RunError, payload_io,
};

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

fn runner(storage: &Arc<InMemoryStorage>) -> ImportRunner {
  let mut registry = MatchValueRegistry::new();
  registry.register_reader(MarcValueReader::new());
  registry.register_loader(InstanceLoader::new(storage.clone()));
  let mut mapping = MappingManager::new();
  mapping.register_reader_factory(MarcBibReaderFactory);
  mapping.register_writer_factory(EntityWriterFactory::new(EntityType::Item));

  let mut dispatcher = EventDispatcher::new();
  dispatcher.register(MatchEventHandler::instance(Arc::new(registry)));
  dispatcher.register(CreateItemEventHandler::new(Arc::new(mapping), storage.clone()));
  ImportRunner::new(Arc::new(dispatcher))
}

fn storage(seed: &str) -> Arc<InMemoryStorage> {
  Arc::new(InMemoryStorage::from_seed(
    payload_io::load_store_seed(&fixture(seed)).unwrap(),
  ))
}

#[tokio::test]
async fn fixture_matches_instance_and_creates_item() {
  let storage = storage("seed.json");
  let payload = payload_io::load_payload(&fixture("payload.json")).unwrap();

  let result = runner(&storage).run(payload).await.unwrap();

  assert_eq!(result.payload.event_type, "DI_INVENTORY_ITEM_CREATED");
  assert_eq!(
    result.payload.events_chain,
    vec![
      "DI_SRS_MARC_BIB_RECORD_CREATED".to_string(),
      "DI_INVENTORY_INSTANCE_MATCHED".to_string()
    ]
  );
  let instance: serde_json::Value =
    serde_json::from_str(result.payload.context_entity(EntityType::Instance).unwrap()).unwrap();
  assert_eq!(instance["id"], "7fbd5d84-62d1-44c6-9c45-6cb173998bbd");
  let item: serde_json::Value =
    serde_json::from_str(result.payload.context_entity(EntityType::Item).unwrap()).unwrap();
  assert_eq!(item["barcode"], "31234000123");
  assert_eq!(item["status"]["name"], "Available");
  assert_eq!(item["holdingId"], "957985c6-97e3-4038-b0e7-343ecd0b8120");
  assert_eq!(storage.items().len(), 1);
  assert_eq!(storage.instances().find_calls(), 1);
}

#[tokio::test]
async fn fixture_with_duplicate_barcode_fails_without_write() {
  let storage = storage("seed_duplicate_barcode.json");
  let payload = payload_io::load_payload(&fixture("payload.json")).unwrap();

  let err = runner(&storage).run(payload).await.unwrap_err();

  match err {
    RunError::Handler { source, partial, .. } => {
      assert_eq!(source.kind(), ErrorKind::Conflict);
      assert_eq!(partial.payload.event_type, "DI_INVENTORY_INSTANCE_MATCHED");
    }
    other => panic!("unexpected error: {other}"),
  }
  assert_eq!(storage.items().add_calls(), 0);
  assert_eq!(storage.items().len(), 1);
}

#[tokio::test]
async fn fixture_without_instance_takes_non_match_branch() {
  let storage = Arc::new(InMemoryStorage::new());
  let payload = payload_io::load_payload(&fixture("payload.json")).unwrap();

  let result = runner(&storage).run(payload).await.unwrap();

  assert_eq!(result.payload.event_type, "DI_INVENTORY_INSTANCE_NOT_MATCHED");
  assert_eq!(result.log.steps.len(), 1);
  assert!(storage.items().is_empty());
}

// ---- CLI ----

fn run_import(args: &[&str]) -> (String, String, bool) {
  let out = Command::new(env!("CARGO_BIN_EXE_run_import"))
    .args(args)
    .env_remove("INVENTORY_IMPORT_PAGE_LIMIT")
    .output()
    .expect("run_import");
  (
    String::from_utf8_lossy(&out.stdout).into_owned(),
    String::from_utf8_lossy(&out.stderr).into_owned(),
    out.status.success(),
  )
}

#[test]
fn cli_runs_fixture_and_writes_result() {
  let dir = tempfile::tempdir().unwrap();
  let out_path = dir.path().join("out").join("result.json");
  let payload = fixture("payload.json");
  let seed = fixture("seed.json");
  let (stdout, stderr, success) = run_import(&[
    "--payload",
    payload.to_str().unwrap(),
    "--store",
    seed.to_str().unwrap(),
    "--out",
    out_path.to_str().unwrap(),
  ]);
  assert!(success, "run_import should succeed: stderr={stderr}");
  assert!(stdout.contains("Import completed"));
  assert!(stdout.contains("DI_INVENTORY_ITEM_CREATED"));

  let written = payload_io::load_payload(&out_path).unwrap();
  assert_eq!(written.event_type, "DI_INVENTORY_ITEM_CREATED");
  assert!(written.context_entity(EntityType::Item).is_some());
}

#[test]
fn cli_reports_conflict_and_exits_non_zero() {
  let payload = fixture("payload.json");
  let seed = fixture("seed_duplicate_barcode.json");
  let (_, stderr, success) = run_import(&[
    "--payload",
    payload.to_str().unwrap(),
    "--store",
    seed.to_str().unwrap(),
  ]);
  assert!(!success);
  assert!(stderr.contains("duplicate key"), "stderr={stderr}");
}

#[test]
fn cli_rejects_zero_page_limit() {
  let payload = fixture("payload.json");
  let (_, stderr, success) = run_import(&[
    "--payload",
    payload.to_str().unwrap(),
    "--page-limit",
    "0",
  ]);
  assert!(!success);
  assert!(stderr.contains("page-limit"), "stderr={stderr}");
}

#[test]
fn cli_missing_payload_file_fails() {
  let (_, stderr, success) = run_import(&["--payload", "/nonexistent/payload.json"]);
  assert!(!success);
  assert!(stderr.contains("Error reading"));
}
