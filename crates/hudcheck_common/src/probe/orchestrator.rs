//! Probe orchestrator - concurrent fan-out, barrier fan-in, atomic publication
//!
//! A run publishes exactly two snapshots: all probes `Loading`, then the
//! complete outcome set. Snapshots carry a run id that doubles as the run
//! token: a finished run publishes only if the current snapshot still carries
//! its id. Newer runs and `reset()` take the token inside the channel's write
//! lock, so a stale result can never land over newer state.

use super::context::RunContext;
use super::executor::{round_ms, ProbeExecutor};
use super::registry::{resolve_url, EndpointRegistry};
use crate::{OutcomeSet, ProbeDefinition, ProbeOutcome, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Published state: which run produced it, and the outcomes
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub run_id: u64,
    pub outcomes: Arc<OutcomeSet>,
}

/// Result handed back to the caller of `run`
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub run_id: u64,
    pub outcomes: Arc<OutcomeSet>,
    /// A newer run or reset took over; these outcomes were not published
    pub superseded: bool,
}

pub struct ProbeOrchestrator {
    executor: Arc<dyn ProbeExecutor>,
    definitions: Arc<Vec<ProbeDefinition>>,
    state: watch::Sender<Snapshot>,
}

impl ProbeOrchestrator {
    pub fn new(registry: &EndpointRegistry, executor: Arc<dyn ProbeExecutor>) -> Self {
        let definitions = Arc::new(registry.definitions().to_vec());
        let (state, _) = watch::channel(Snapshot {
            run_id: 0,
            outcomes: Arc::new(OutcomeSet::uniform(&definitions, ProbeOutcome::Idle)),
        });

        Self {
            executor,
            definitions,
            state,
        }
    }

    pub fn definitions(&self) -> &[ProbeDefinition] {
        &self.definitions
    }

    /// Current published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Observe whole-batch transitions
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Publish an all-idle snapshot, superseding any in-flight run
    pub fn reset(&self) -> u64 {
        let run_id = self.publish_fresh(ProbeOutcome::Idle);
        debug!("Reset probes (run {})", run_id);
        run_id
    }

    /// Run every probe concurrently and publish the complete set
    pub async fn run(&self, context: &RunContext) -> Result<CompletedRun> {
        // Resolve before touching state so a bad context changes nothing
        let resolved = self
            .definitions
            .iter()
            .map(|def| resolve_url(def, context.secret.as_ref()).map(|url| (def.clone(), url)))
            .collect::<Result<Vec<_>>>()?;

        let run_id = self.publish_fresh(ProbeOutcome::Loading);
        info!("Run {}: dispatching {} probes", run_id, resolved.len());
        let start = Instant::now();

        let mut join_set = JoinSet::new();
        for (index, (def, url)) in resolved.into_iter().enumerate() {
            let executor = Arc::clone(&self.executor);
            join_set.spawn(async move {
                let outcome = executor.execute(&def, &url).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<ProbeOutcome>> = vec![None; self.definitions.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("Run {}: probe task failed: {}", run_id, e),
            }
        }

        let aborted_ms = round_ms(start);
        let outcomes: OutcomeSet = self
            .definitions
            .iter()
            .zip(slots)
            .map(|(def, slot)| {
                let outcome = slot.unwrap_or_else(|| ProbeOutcome::Error {
                    status: None,
                    message: "probe task aborted".to_string(),
                    elapsed_ms: aborted_ms,
                    details: None,
                });
                (def.id.clone(), outcome)
            })
            .collect();
        let outcomes = Arc::new(outcomes);

        let published = self.state.send_if_modified(|snapshot| {
            if snapshot.run_id != run_id {
                return false;
            }
            snapshot.outcomes = Arc::clone(&outcomes);
            true
        });

        if published {
            info!(
                "Run {}: {} ok, {} failed",
                run_id,
                outcomes.success_count(),
                outcomes.error_count()
            );
        } else {
            debug!("Run {}: superseded, discarding results", run_id);
        }

        Ok(CompletedRun {
            run_id,
            outcomes,
            superseded: !published,
        })
    }

    /// Replace every outcome with `outcome` under a new run id
    fn publish_fresh(&self, outcome: ProbeOutcome) -> u64 {
        let outcomes = Arc::new(OutcomeSet::uniform(&self.definitions, outcome));
        let mut run_id = 0;
        self.state.send_modify(|snapshot| {
            run_id = snapshot.run_id + 1;
            *snapshot = Snapshot {
                run_id,
                outcomes: Arc::clone(&outcomes),
            };
        });
        run_id
    }
}
