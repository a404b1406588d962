//! Terminal rendering for verdicts, endpoint blocks and badge lines.
//!
//! Every renderer returns a `String`; callers decide where it goes.

use hudcheck_common::classify::connectivity::status_text;
use hudcheck_common::classify::{ProbeBadge, ProbeBadgeLine};
use hudcheck_common::{OutcomeSet, ProbeBody, ProbeDefinition, ProbeOutcome, Severity, Verdict};
use owo_colors::{OwoColorize, Style};
use std::fmt::Write;
use std::io::IsTerminal;

/// Applies colors only when enabled
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Color when stdout is a terminal, unless `--no-color` or `NO_COLOR`
    pub fn detect(no_color: bool) -> Self {
        let color =
            !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Self::new(color)
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

fn severity_style(severity: Severity) -> Style {
    let style = Style::new().bold();
    match severity {
        Severity::Info => style.blue(),
        Severity::Success => style.green(),
        Severity::Warning => style.yellow(),
        Severity::Error => style.red(),
    }
}

fn badge_style(badge: ProbeBadge) -> Style {
    match badge {
        ProbeBadge::Ok => Style::new().green().bold(),
        ProbeBadge::Fail => Style::new().red().bold(),
        ProbeBadge::Pending => Style::new().yellow(),
        ProbeBadge::Idle => Style::new().dimmed(),
    }
}

/// Verdict banner: badge and title, then one bullet per remediation step
pub fn render_verdict(verdict: &Verdict, painter: &Painter) -> String {
    let style = severity_style(verdict.severity);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        painter.paint(&format!("[{}]", verdict.severity.badge()), style),
        painter.paint(&verdict.title, Style::new().bold())
    );
    for bullet in &verdict.remediation {
        let _ = writeln!(out, "  - {}", bullet);
    }
    out
}

/// Short description of a success body for `--details`
pub fn describe_body(body: &ProbeBody) -> Option<String> {
    match body {
        ProbeBody::Json(value) => serde_json::to_string_pretty(value).ok(),
        ProbeBody::Text(text) => Some(text.clone()),
        ProbeBody::Empty => None,
        ProbeBody::Preview(preview) => Some(format!(
            "<{} preview, {} bytes>",
            preview.content_type(),
            preview.len()
        )),
        ProbeBody::Drained { bytes } => Some(format!("<{} bytes discarded>", bytes)),
    }
}

fn push_indented(out: &mut String, text: &str, indent: usize) {
    for line in text.lines() {
        let _ = writeln!(out, "{:indent$}{}", "", line, indent = indent);
    }
}

/// One block per endpoint: name and URL, status and latency, error and details
pub fn render_endpoints(
    outcomes: &OutcomeSet,
    definitions: &[ProbeDefinition],
    details: bool,
    painter: &Painter,
) -> String {
    let idle = ProbeOutcome::Idle;
    let mut out = String::new();

    for def in definitions {
        let outcome = outcomes.get(&def.id).unwrap_or(&idle);
        let badge = ProbeBadge::for_outcome(outcome);

        let _ = writeln!(
            out,
            "{} {}  {}",
            painter.paint(&format!("[{:^4}]", badge.label()), badge_style(badge)),
            painter.paint(&def.name, Style::new().bold()),
            painter.paint(&def.url_template, Style::new().dimmed())
        );

        match outcome {
            ProbeOutcome::Success {
                status,
                elapsed_ms,
                body,
            } => {
                let _ = writeln!(out, "       Status: {}  Latency: {}ms", status, elapsed_ms);
                if details {
                    if let Some(text) = describe_body(body) {
                        push_indented(&mut out, &text, 7);
                    }
                }
            }
            ProbeOutcome::Error {
                status,
                message,
                elapsed_ms,
                details: error_details,
            } => {
                let _ = writeln!(
                    out,
                    "       Status: {}  Latency: {}ms",
                    status_text(*status),
                    elapsed_ms
                );
                let _ = writeln!(
                    out,
                    "       {} {}",
                    painter.paint("Error:", Style::new().red()),
                    message
                );
                if details {
                    if let Some(text) = error_details
                        .as_ref()
                        .and_then(|v| serde_json::to_string_pretty(v).ok())
                    {
                        push_indented(&mut out, &text, 7);
                    }
                }
            }
            ProbeOutcome::Loading => {
                let _ = writeln!(out, "       Status: Pending");
            }
            ProbeOutcome::Idle => {
                let _ = writeln!(out, "       (Skipped)");
            }
        }
    }
    out
}

/// Badge lines for the connectivity sweep
pub fn render_badges(lines: &[ProbeBadgeLine], painter: &Painter) -> String {
    let width = lines.iter().map(|l| l.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();

    for line in lines {
        let _ = writeln!(
            out,
            "{} {:width$}  {}",
            painter.paint(&format!("[{:^4}]", line.badge.label()), badge_style(line.badge)),
            line.name,
            painter.paint(&line.latency, Style::new().dimmed()),
            width = width
        );
        if let Some(error) = &line.error {
            let _ = writeln!(out, "       {}", painter.paint(error, Style::new().red()));
        }
    }
    out
}

/// "N of M endpoints reachable"
pub fn render_summary(outcomes: &OutcomeSet, painter: &Painter) -> String {
    let reachable = outcomes.success_count();
    let total = outcomes.len();
    let style = if reachable == total {
        Style::new().green().bold()
    } else {
        Style::new().red().bold()
    };
    painter.paint(
        &format!("{} of {} endpoints reachable", reachable, total),
        style,
    )
}
