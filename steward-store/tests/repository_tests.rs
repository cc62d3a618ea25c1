use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steward_store::{Cluster, InMemoryLog, LogBackedRepository, LogRecord, LogTransport, StoreError, TransportFactory};
use steward_types::{EnvironmentId, Keyed};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    name: String,
    body: String,
}

impl Keyed for Note {
    fn key(&self) -> String {
        self.name.clone()
    }
}

fn make_note(name: &str, body: &str) -> Note {
    Note {
        name: name.to_string(),
        body: body.to_string(),
    }
}

async fn make_repository(log: &Arc<InMemoryLog>) -> LogBackedRepository<Note> {
    LogBackedRepository::new(
        EnvironmentId::from("dev"),
        "notes",
        Arc::clone(log) as Arc<dyn LogTransport>,
    )
    .await
}

const SHORT: Duration = Duration::from_millis(50);
const IDLE: Duration = Duration::from_millis(200);

// ── Basic CRUD ───────────────────────────────────────────────────

#[tokio::test]
async fn save_then_get() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    repo.save(make_note("n1", "hello")).await.unwrap();

    assert!(repo.contains_key("n1").await);
    assert_eq!(repo.get("n1").await, Some(make_note("n1", "hello")));
}

#[tokio::test]
async fn get_absent_key() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    assert!(!repo.contains_key("nope").await);
    assert_eq!(repo.get("nope").await, None);
}

#[tokio::test]
async fn save_is_write_your_own_reads() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    // The completion must not resolve before the writer's own view
    // reflects the record, so a get immediately after save always hits.
    for i in 0..20 {
        let name = format!("n{i}");
        repo.save(make_note(&name, "x")).await.unwrap();
        assert!(repo.contains_key(&name).await, "missing {name} after save");
    }
}

#[tokio::test]
async fn latest_record_wins() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    repo.save(make_note("n1", "first")).await.unwrap();
    repo.save(make_note("n1", "second")).await.unwrap();

    assert_eq!(repo.get("n1").await, Some(make_note("n1", "second")));
    assert_eq!(repo.get_all().await.len(), 1);
}

#[tokio::test]
async fn delete_removes_key() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    let note = make_note("n1", "hello");
    repo.save(note.clone()).await.unwrap();
    repo.delete(&note).await.unwrap();

    assert!(!repo.contains_key("n1").await);
    assert!(repo.get_all().await.is_empty());
}

#[tokio::test]
async fn delete_absent_key_is_noop() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    repo.delete(&make_note("ghost", "")).await.unwrap();
    assert!(repo.get_all().await.is_empty());
}

// ── Replay ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn replay_reflects_latest_record_per_key() {
    let log = Arc::new(InMemoryLog::new());

    // Pre-populate the log before any repository exists.
    let v = |note: &Note| serde_json::to_value(note).unwrap();
    log.append(LogRecord::upsert("a", v(&make_note("a", "1")))).await.unwrap();
    log.append(LogRecord::upsert("b", v(&make_note("b", "1")))).await.unwrap();
    log.append(LogRecord::upsert("a", v(&make_note("a", "2")))).await.unwrap();
    log.append(LogRecord::tombstone("b")).await.unwrap();
    log.append(LogRecord::upsert("c", v(&make_note("c", "1")))).await.unwrap();

    let repo = make_repository(&log).await;
    repo.wait_for_initialization(SHORT, IDLE).await;

    // Exactly the keys whose latest record was a save.
    let mut all = repo.get_all().await;
    all.sort_by(|x, y| x.name.cmp(&y.name));
    assert_eq!(all, vec![make_note("a", "2"), make_note("c", "1")]);
}

#[tokio::test(start_paused = true)]
async fn replay_skips_undeserializable_records() {
    let log = Arc::new(InMemoryLog::new());

    log.append(LogRecord::upsert("bad", serde_json::json!({"unexpected": true})))
        .await
        .unwrap();
    log.append(LogRecord::upsert("good", serde_json::to_value(make_note("good", "x")).unwrap()))
        .await
        .unwrap();

    let repo = make_repository(&log).await;
    repo.wait_for_initialization(SHORT, IDLE).await;

    assert!(!repo.contains_key("bad").await);
    assert_eq!(repo.get("good").await, Some(make_note("good", "x")));
}

// ── Initialization barrier ───────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn initialization_barrier_waits_out_activity() {
    let log = Arc::new(InMemoryLog::new());
    for i in 0..10 {
        let note = make_note(&format!("n{i}"), "x");
        log.append(LogRecord::upsert(note.key(), serde_json::to_value(&note).unwrap()))
            .await
            .unwrap();
    }

    let repo = make_repository(&log).await;
    repo.wait_for_initialization(SHORT, IDLE).await;

    // The barrier is a heuristic, but after it resolves the pre-existing
    // log must be fully materialized.
    assert_eq!(repo.get_all().await.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn initialization_barrier_on_empty_log() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    repo.wait_for_initialization(SHORT, IDLE).await;
    assert!(repo.get_all().await.is_empty());
}

// ── Failure propagation ──────────────────────────────────────────

#[tokio::test]
async fn save_propagates_transport_failure() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    log.set_fail_appends(true);
    let err = repo.save(make_note("n1", "x")).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));

    // Nothing reached the view.
    assert!(!repo.contains_key("n1").await);

    // The store keeps working once the transport recovers; no retries
    // happened in between.
    log.set_fail_appends(false);
    assert_eq!(log.len().await, 0);
    repo.save(make_note("n1", "x")).await.unwrap();
    assert!(repo.contains_key("n1").await);
}

#[tokio::test]
async fn delete_propagates_transport_failure() {
    let log = Arc::new(InMemoryLog::new());
    let repo = make_repository(&log).await;

    let note = make_note("n1", "x");
    repo.save(note.clone()).await.unwrap();

    log.set_fail_appends(true);
    let err = repo.delete(&note).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
    assert!(repo.contains_key("n1").await);
}

// ── Two repositories over one log ────────────────────────────────

#[tokio::test(start_paused = true)]
async fn second_repository_catches_up() {
    let log = Arc::new(InMemoryLog::new());
    let writer = make_repository(&log).await;

    writer.save(make_note("n1", "x")).await.unwrap();
    writer.save(make_note("n2", "y")).await.unwrap();

    let reader = make_repository(&log).await;
    reader.wait_for_initialization(SHORT, IDLE).await;

    assert_eq!(reader.get_all().await.len(), 2);
}

// ── Cluster ──────────────────────────────────────────────────────

#[derive(Default)]
struct SharedLogFactory {
    logs: Mutex<HashMap<String, Arc<InMemoryLog>>>,
}

impl TransportFactory for SharedLogFactory {
    fn transport_for(
        &self,
        environment: &EnvironmentId,
        store_name: &str,
    ) -> Arc<dyn LogTransport> {
        let mut logs = self.logs.lock().unwrap();
        let log = logs
            .entry(format!("{environment}/{store_name}"))
            .or_insert_with(|| Arc::new(InMemoryLog::new()));
        Arc::clone(log) as Arc<dyn LogTransport>
    }
}

#[tokio::test]
async fn cluster_memoizes_repositories() {
    let cluster = Cluster::new(
        EnvironmentId::from("dev"),
        Arc::new(SharedLogFactory::default()),
    );

    let first = cluster.repository::<Note>("notes").await.unwrap();
    let second = cluster.repository::<Note>("notes").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    first.save(make_note("n1", "x")).await.unwrap();
    assert!(second.contains_key("n1").await);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OtherRecord {
    name: String,
}

impl Keyed for OtherRecord {
    fn key(&self) -> String {
        self.name.clone()
    }
}

#[tokio::test]
async fn cluster_rejects_conflicting_value_type() {
    let cluster = Cluster::new(
        EnvironmentId::from("dev"),
        Arc::new(SharedLogFactory::default()),
    );

    cluster.repository::<Note>("notes").await.unwrap();
    let err = cluster.repository::<OtherRecord>("notes").await.unwrap_err();
    assert!(matches!(err, StoreError::WrongValueType(_)));
}

#[tokio::test]
async fn cluster_separates_stores_by_name() {
    let cluster = Cluster::new(
        EnvironmentId::from("dev"),
        Arc::new(SharedLogFactory::default()),
    );

    let notes = cluster.repository::<Note>("notes").await.unwrap();
    let drafts = cluster.repository::<Note>("drafts").await.unwrap();

    notes.save(make_note("n1", "x")).await.unwrap();
    assert!(!drafts.contains_key("n1").await);
}
