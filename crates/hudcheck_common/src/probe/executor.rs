//! Probe executor - one GET per definition, normalized into a `ProbeOutcome`
//!
//! The executor never returns an error: transport failures, non-2xx statuses
//! and unparsable bodies all end up inside `ProbeOutcome::Error` or as raw
//! text, so one failing probe cannot disturb its siblings.

use crate::preview::PreviewStore;
use crate::{ProbeBody, ProbeDefinition, ProbeOutcome, ResourceKind, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fallback message when nothing better is available
const REQUEST_FAILED: &str = "Request failed";
const NETWORK_ERROR: &str = "Network error";

/// Trait abstraction over probe execution
///
/// Production code uses `HttpProbeExecutor`; tests plug in fakes with
/// scripted outcomes and delays.
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// Run one probe against its resolved URL
    async fn execute(&self, probe: &ProbeDefinition, url: &Url) -> ProbeOutcome;
}

/// Real executor backed by reqwest
#[derive(Clone)]
pub struct HttpProbeExecutor {
    http: reqwest::Client,
    previews: PreviewStore,
}

impl HttpProbeExecutor {
    /// Build with a fresh client; idle connections are not kept so every run
    /// measures current network conditions
    pub fn new(user_agent: &str, previews: PreviewStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { http, previews })
    }

    fn outcome_for_response(
        &self,
        probe: &ProbeDefinition,
        status: StatusCode,
        content_type: Option<String>,
        body: Bytes,
        elapsed_ms: u64,
    ) -> ProbeOutcome {
        if !status.is_success() {
            let details = parse_text_body(&body);
            let message = error_message(details.as_ref(), status);
            return ProbeOutcome::Error {
                status: Some(status.as_u16()),
                message,
                elapsed_ms,
                details,
            };
        }

        let body = match probe.kind {
            ResourceKind::Image => {
                let content_type =
                    content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                ProbeBody::Preview(std::sync::Arc::new(self.previews.acquire(content_type, body)))
            }
            ResourceKind::Binary => ProbeBody::Drained {
                bytes: body.len() as u64,
            },
            ResourceKind::Json => json_body(&body),
        };

        ProbeOutcome::Success {
            status: status.as_u16(),
            elapsed_ms,
            body,
        }
    }
}

#[async_trait]
impl ProbeExecutor for HttpProbeExecutor {
    async fn execute(&self, probe: &ProbeDefinition, url: &Url) -> ProbeOutcome {
        debug!("Dispatching probe {} ({})", probe.id, probe.kind);
        let start = Instant::now();

        let mut request = self.http.get(url.clone());
        if probe.kind == ResourceKind::Json {
            request = request.header(ACCEPT, "application/json");
        }

        // Headers and body both count towards latency
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, content_type, body))
        }
        .await;

        let elapsed_ms = round_ms(start);

        let outcome = match result {
            Ok((status, content_type, body)) => {
                self.outcome_for_response(probe, status, content_type, body, elapsed_ms)
            }
            Err(e) => {
                // Never echo the URL: it may carry the API key
                let e = e.without_url();
                warn!("Probe {} failed without a response: {}", probe.id, e);
                transport_error(&e, elapsed_ms)
            }
        };

        debug!(
            "Probe {} finished: {} status={:?} in {}ms",
            probe.id,
            outcome.label(),
            outcome.status(),
            elapsed_ms
        );
        outcome
    }
}

/// Elapsed wall clock, rounded to the nearest millisecond
pub(crate) fn round_ms(start: Instant) -> u64 {
    duration_ms(start.elapsed())
}

fn duration_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// Success body of a JSON probe: parsed JSON, raw text, or empty.
/// Bytes that are not UTF-8 are kept as lossy text.
fn json_body(body: &[u8]) -> ProbeBody {
    match parse_text_body(body) {
        Some(serde_json::Value::String(text)) if !looks_like_json_string(body) => {
            ProbeBody::Text(text)
        }
        Some(value) => ProbeBody::Json(value),
        None if std::str::from_utf8(body).is_err() => {
            ProbeBody::Text(String::from_utf8_lossy(body).into_owned())
        }
        None => ProbeBody::Empty,
    }
}

/// Body as JSON when it parses, as a JSON string when it is other text,
/// `None` when empty or not UTF-8
fn parse_text_body(body: &[u8]) -> Option<serde_json::Value> {
    let text = std::str::from_utf8(body).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}

/// A body like `"hello"` is a JSON string, not raw text
fn looks_like_json_string(body: &[u8]) -> bool {
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'"')
}

/// Message preference: JSON text/error/message field, raw text, reason phrase
fn error_message(details: Option<&serde_json::Value>, status: StatusCode) -> String {
    let from_body = details.and_then(|body| match body {
        serde_json::Value::Object(map) => ["text", "error", "message"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .find(|s| !s.is_empty())
            .map(str::to_string),
        serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    });

    from_body
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| REQUEST_FAILED.to_string())
}

fn transport_error(e: &reqwest::Error, elapsed_ms: u64) -> ProbeOutcome {
    let description = e.to_string();
    let message = if description.trim().is_empty() {
        NETWORK_ERROR.to_string()
    } else {
        description
    };

    let mut chain = Vec::new();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        chain.push(serde_json::Value::String(cause.to_string()));
        source = cause.source();
    }

    ProbeOutcome::Error {
        status: None,
        message,
        elapsed_ms,
        details: Some(serde_json::json!({
            "kind": transport_kind(e),
            "causes": chain,
        })),
    }
}

fn transport_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_body() || e.is_decode() {
        "body"
    } else if e.is_request() {
        "request"
    } else {
        "other"
    }
}
