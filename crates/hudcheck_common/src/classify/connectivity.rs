//! Connectivity sweep: independent probes, one badge each, no combined verdict

use crate::{OutcomeSet, ProbeDefinition, ProbeOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeBadge {
    Ok,
    Fail,
    Pending,
    Idle,
}

impl ProbeBadge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
            Self::Pending => "...",
            Self::Idle => "IDLE",
        }
    }

    pub fn for_outcome(outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Success { .. } => Self::Ok,
            ProbeOutcome::Error { .. } => Self::Fail,
            ProbeOutcome::Loading => Self::Pending,
            ProbeOutcome::Idle => Self::Idle,
        }
    }
}

/// Everything a renderer needs for one probe row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeBadgeLine {
    pub id: String,
    pub name: String,
    pub url: String,
    pub badge: ProbeBadge,
    /// "123ms", "Testing…" while loading, empty when idle
    pub latency: String,
    /// "{message} (Status: {code|N/A})" for failures
    pub error: Option<String>,
}

/// Describe each probe in registry order
pub fn describe(outcomes: &OutcomeSet, definitions: &[ProbeDefinition]) -> Vec<ProbeBadgeLine> {
    let idle = ProbeOutcome::Idle;
    definitions
        .iter()
        .map(|def| {
            let outcome = outcomes.get(&def.id).unwrap_or(&idle);
            let latency = match outcome {
                ProbeOutcome::Loading => "Testing…".to_string(),
                ProbeOutcome::Idle => String::new(),
                other => other
                    .elapsed_ms()
                    .map(|ms| format!("{}ms", ms))
                    .unwrap_or_default(),
            };
            let error = match outcome {
                ProbeOutcome::Error {
                    status, message, ..
                } => Some(format!("{} (Status: {})", message, status_text(*status))),
                _ => None,
            };

            ProbeBadgeLine {
                id: def.id.clone(),
                name: def.name.clone(),
                url: def.url_template.clone(),
                badge: ProbeBadge::for_outcome(outcome),
                latency,
                error,
            }
        })
        .collect()
}

/// Status code text, "N/A" when no response was received
pub fn status_text(status: Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
