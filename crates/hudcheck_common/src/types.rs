//! Core types shared by the probe engine, classifier and report formatter.

use crate::preview::PreviewHandle;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// What a probe downloads, which decides how its body is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Json,
    Image,
    Binary,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Image => write!(f, "image"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// One monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDefinition {
    /// Unique key within a registry (e.g., "tokeninfo", "img_1")
    pub id: String,
    /// Display name
    pub name: String,
    /// Fully qualified URL; a `{key}` query value is replaced by the secret
    #[serde(rename = "url")]
    pub url_template: String,
    pub kind: ResourceKind,
}

impl ProbeDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url_template: impl Into<String>,
        kind: ResourceKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url_template: url_template.into(),
            kind,
        }
    }
}

/// Payload of a successful probe
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProbeBody {
    /// Parsed JSON document
    Json(serde_json::Value),
    /// Textual body that is not valid JSON
    Text(String),
    Empty,
    /// Downloaded image kept for display
    Preview(Arc<PreviewHandle>),
    /// Body read to the end and discarded
    Drained { bytes: u64 },
}

/// State of one probe within a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ProbeOutcome {
    Idle,
    Loading,
    Success {
        status: u16,
        elapsed_ms: u64,
        body: ProbeBody,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        message: String,
        elapsed_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
    },
}

impl ProbeOutcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Success or Error
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_error()
    }

    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } => Some(*status),
            Self::Error { status, .. } => *status,
            _ => None,
        }
    }

    /// Present only once the probe reached a terminal state
    pub fn elapsed_ms(&self) -> Option<u64> {
        match self {
            Self::Success { elapsed_ms, .. } | Self::Error { elapsed_ms, .. } => Some(*elapsed_ms),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }
}

/// Outcomes of one run keyed by probe id, in registry order
#[derive(Debug, Clone, Default)]
pub struct OutcomeSet {
    entries: Vec<(String, ProbeOutcome)>,
}

impl OutcomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every definition mapped to a copy of `outcome`
    pub fn uniform(definitions: &[ProbeDefinition], outcome: ProbeOutcome) -> Self {
        Self {
            entries: definitions
                .iter()
                .map(|def| (def.id.clone(), outcome.clone()))
                .collect(),
        }
    }

    /// Insert or replace, keeping the original position of an existing id
    pub fn insert(&mut self, id: impl Into<String>, outcome: ProbeOutcome) {
        let id = id.into();
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((id, outcome)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ProbeOutcome> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProbeOutcome)> {
        self.entries
            .iter()
            .map(|(id, outcome)| (id.as_str(), outcome))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every probe reached Success or Error
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(_, o)| o.is_terminal())
    }

    pub fn any_loading(&self) -> bool {
        self.entries.iter().any(|(_, o)| o.is_loading())
    }

    pub fn all_idle(&self) -> bool {
        self.entries.iter().all(|(_, o)| o.is_idle())
    }

    /// At least one probe has a result worth reporting
    pub fn has_results(&self) -> bool {
        self.entries.iter().any(|(_, o)| o.is_terminal())
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_error()).count()
    }
}

impl FromIterator<(String, ProbeOutcome)> for OutcomeSet {
    fn from_iter<I: IntoIterator<Item = (String, ProbeOutcome)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (id, outcome) in iter {
            set.insert(id, outcome);
        }
        set
    }
}

impl Serialize for OutcomeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, outcome) in &self.entries {
            map.serialize_entry(id, outcome)?;
        }
        map.end()
    }
}

/// Severity of a verdict (stable ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Short badge label
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "OK",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.badge())
    }
}

/// Human-facing diagnostic conclusion over an outcome set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub severity: Severity,
    pub title: String,
    pub remediation: Vec<String>,
}

impl Verdict {
    pub fn new(severity: Severity, title: &str, remediation: &[&str]) -> Self {
        Self {
            severity,
            title: title.to_string(),
            remediation: remediation.iter().map(|s| s.to_string()).collect(),
        }
    }
}
