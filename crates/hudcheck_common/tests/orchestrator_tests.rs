//! Orchestrator tests with a scripted executor.
//!
//! Tests verify:
//! - Every probe is terminal once a run returns
//! - Observers only ever see whole batches (all Loading, or a complete set)
//! - A run finishing after a newer one started is discarded, not published
//! - Reset supersedes in-flight runs and previews are released with their set

use async_trait::async_trait;
use bytes::Bytes;
use hudcheck_common::preview::PreviewStore;
use hudcheck_common::probe::executor::ProbeExecutor;
use hudcheck_common::probe::{EndpointRegistry, ProbeOrchestrator, RunContext};
use hudcheck_common::{ProbeBody, ProbeDefinition, ProbeOutcome, ResourceKind};
use reqwest::Url;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Executor with per-probe outcomes and delays, plus a gate for stale runs
struct ScriptedExecutor {
    outcomes: HashMap<String, ProbeOutcome>,
    delays: HashMap<String, Duration>,
    previews: Option<PreviewStore>,
    blocking: AtomicBool,
    gate: Semaphore,
    waiting: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            delays: HashMap::new(),
            previews: None,
            blocking: AtomicBool::new(false),
            gate: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    fn outcome(mut self, id: &str, outcome: ProbeOutcome) -> Self {
        self.outcomes.insert(id.to_string(), outcome);
        self
    }

    fn delay(mut self, id: &str, ms: u64) -> Self {
        self.delays.insert(id.to_string(), Duration::from_millis(ms));
        self
    }

    fn with_previews(mut self, store: PreviewStore) -> Self {
        self.previews = Some(store);
        self
    }
}

#[async_trait]
impl ProbeExecutor for ScriptedExecutor {
    async fn execute(&self, probe: &ProbeDefinition, _url: &Url) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.blocking.load(Ordering::SeqCst) {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let permit = self.gate.acquire().await.expect("gate closed");
            permit.forget();
            return ProbeOutcome::Error {
                status: Some(500),
                message: "stale".to_string(),
                elapsed_ms: 1,
                details: None,
            };
        }

        if let Some(delay) = self.delays.get(&probe.id) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(store) = &self.previews {
            return ProbeOutcome::Success {
                status: 200,
                elapsed_ms: 1,
                body: ProbeBody::Preview(Arc::new(
                    store.acquire("image/png", Bytes::from_static(b"img")),
                )),
            };
        }

        self.outcomes
            .get(&probe.id)
            .cloned()
            .unwrap_or(ProbeOutcome::Success {
                status: 200,
                elapsed_ms: 1,
                body: ProbeBody::Empty,
            })
    }
}

fn registry(ids: &[&str]) -> EndpointRegistry {
    EndpointRegistry::from_definitions(
        ids.iter()
            .map(|id| {
                ProbeDefinition::new(
                    *id,
                    id.to_uppercase(),
                    format!("https://example.test/{}", id),
                    ResourceKind::Image,
                )
            })
            .collect(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_every_probe_terminal_after_run() {
    let executor = ScriptedExecutor::new()
        .outcome(
            "b",
            ProbeOutcome::Error {
                status: None,
                message: "connection reset".to_string(),
                elapsed_ms: 9,
                details: None,
            },
        )
        .delay("a", 20)
        .delay("c", 5);
    let executor = Arc::new(executor);
    let orchestrator = ProbeOrchestrator::new(&registry(&["a", "b", "c"]), executor.clone());

    let run = orchestrator.run(&RunContext::anonymous()).await.unwrap();

    assert!(!run.superseded);
    assert!(run.outcomes.is_complete());
    assert_eq!(run.outcomes.success_count(), 2);
    assert_eq!(run.outcomes.error_count(), 1);
    assert!(run.outcomes.iter().all(|(_, o)| o.elapsed_ms().is_some()));
    assert_eq!(executor.calls.load(Ordering::SeqCst), 3);

    // Registry order, not completion order
    let ids: Vec<&str> = run.outcomes.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.run_id, run.run_id);
    assert!(Arc::ptr_eq(&snapshot.outcomes, &run.outcomes));
}

#[tokio::test]
async fn test_observers_only_see_whole_batches() {
    let executor = ScriptedExecutor::new()
        .delay("a", 30)
        .delay("b", 10)
        .delay("c", 20)
        .delay("d", 1);
    let orchestrator = ProbeOrchestrator::new(&registry(&["a", "b", "c", "d"]), Arc::new(executor));

    let mut rx = orchestrator.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let done = snapshot.outcomes.is_complete();
            seen.push(snapshot);
            if done {
                break;
            }
        }
        seen
    });

    let run = orchestrator.run(&RunContext::anonymous()).await.unwrap();
    let seen = observer.await.unwrap();

    assert!(!seen.is_empty());
    for snapshot in &seen {
        assert_eq!(snapshot.run_id, run.run_id);
        let all_loading = snapshot.outcomes.iter().all(|(_, o)| o.is_loading());
        assert!(all_loading || snapshot.outcomes.is_complete());
    }
    assert!(seen.last().unwrap().outcomes.is_complete());
}

#[tokio::test]
async fn test_stale_run_is_discarded() {
    let executor = Arc::new(ScriptedExecutor::new());
    executor.blocking.store(true, Ordering::SeqCst);
    let orchestrator = Arc::new(ProbeOrchestrator::new(
        &registry(&["a", "b", "c"]),
        executor.clone(),
    ));

    let stale = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run(&RunContext::anonymous()).await.unwrap() }
    });

    while executor.waiting.load(Ordering::SeqCst) < 3 {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert!(orchestrator.snapshot().outcomes.any_loading());

    executor.blocking.store(false, Ordering::SeqCst);
    let fresh = orchestrator.run(&RunContext::anonymous()).await.unwrap();
    assert!(!fresh.superseded);

    executor.gate.add_permits(3);
    let stale = stale.await.unwrap();

    assert!(stale.superseded);
    assert!(stale.run_id < fresh.run_id);
    assert_eq!(stale.outcomes.error_count(), 3);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.run_id, fresh.run_id);
    assert_eq!(snapshot.outcomes.success_count(), 3);
}

#[tokio::test]
async fn test_reset_supersedes_and_releases_previews() {
    let store = PreviewStore::new();
    let executor = ScriptedExecutor::new().with_previews(store.clone());
    let orchestrator = ProbeOrchestrator::new(&registry(&["a", "b"]), Arc::new(executor));

    let run = orchestrator.run(&RunContext::anonymous()).await.unwrap();
    assert_eq!(store.live_count(), 2);

    let reset_id = orchestrator.reset();
    assert!(reset_id > run.run_id);
    assert!(orchestrator.snapshot().outcomes.all_idle());

    // The caller's copy is the last owner
    assert_eq!(store.live_count(), 2);
    drop(run);
    assert_eq!(store.live_count(), 0);
}

#[tokio::test]
async fn test_new_run_replaces_previous_previews() {
    let store = PreviewStore::new();
    let executor = ScriptedExecutor::new().with_previews(store.clone());
    let orchestrator = ProbeOrchestrator::new(&registry(&["a", "b", "c"]), Arc::new(executor));

    drop(orchestrator.run(&RunContext::anonymous()).await.unwrap());
    assert_eq!(store.live_count(), 3);

    drop(orchestrator.run(&RunContext::anonymous()).await.unwrap());
    assert_eq!(store.live_count(), 3);
}
