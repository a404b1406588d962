//! Shareable connectivity report.
//!
//! Plain text meant to be pasted into a chat: literal glyphs, `**bold**`
//! names, inline code for figures and `<url>` so link previews stay folded.
//! Output is fully determined by the outcomes, the definitions and the clock.

use crate::classify::connectivity::status_text;
use crate::config::ReportConfig;
use crate::{OutcomeSet, ProbeDefinition, ProbeOutcome};
use chrono::{DateTime, Utc};

pub const GLYPH_OK: &str = "✅";
pub const GLYPH_FAIL: &str = "❌";
pub const GLYPH_PENDING: &str = "⚪";

/// Source of "now" for the relative-time marker
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed instant, for reproducible output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format the report (pure function, deterministic)
pub fn format_report(
    outcomes: &OutcomeSet,
    definitions: &[ProbeDefinition],
    clock: &dyn Clock,
    config: &ReportConfig,
) -> String {
    let mut lines = vec![
        format!(
            "[{}]({}) - <t:{}:R>",
            config.title,
            config.link,
            clock.now().timestamp()
        ),
        String::new(),
    ];

    for def in definitions {
        match outcomes.get(&def.id) {
            Some(ProbeOutcome::Success {
                status, elapsed_ms, ..
            }) => lines.push(format!(
                "{} **{}** | Latency: `{}ms` | Status: `{}`",
                GLYPH_OK, def.name, elapsed_ms, status
            )),
            Some(ProbeOutcome::Error {
                status,
                message,
                elapsed_ms,
                ..
            }) => {
                lines.push(format!(
                    "{} **{}** | Latency: `{}ms` | Status: `{}`",
                    GLYPH_FAIL,
                    def.name,
                    elapsed_ms,
                    status_text(*status)
                ));
                lines.push(format!("> Error: {}", single_line(message)));
            }
            Some(ProbeOutcome::Loading) => {
                lines.push(format!("{} **{}** | Status: Pending", GLYPH_PENDING, def.name))
            }
            Some(ProbeOutcome::Idle) | None => {
                lines.push(format!("{} **{}** (Skipped)", GLYPH_PENDING, def.name))
            }
        }

        lines.push(format!("<{}>", def.url_template));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Collapse line breaks so one error stays on one report line
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
