//! hudcheck common - probe-and-classify engine behind the troubleshooting tools
//!
//! Registry -> executor (concurrent) -> orchestrator (fan-in) -> classifier / report.

pub mod classify;
pub mod config;
pub mod error;
pub mod preview;
pub mod probe;
pub mod report;
pub mod types;

pub use error::{HudcheckError, Result};
pub use types::*;
