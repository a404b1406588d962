//! Probe engine: registry, executor and orchestrator

pub mod context;
pub mod executor;
pub mod orchestrator;
pub mod registry;

pub use context::{RunContext, Secret};
pub use executor::{HttpProbeExecutor, ProbeExecutor};
pub use orchestrator::{CompletedRun, ProbeOrchestrator, Snapshot};
pub use registry::EndpointRegistry;
