//! `hudcheck network` - connectivity sweep and shareable report

use super::{build_orchestrator, run_with_spinner, RunStatus};
use crate::cli::NetworkArgs;
use crate::display::{self, Painter};
use anyhow::{Context, Result};
use hudcheck_common::classify::describe;
use hudcheck_common::config::HudcheckConfig;
use hudcheck_common::preview::PreviewStore;
use hudcheck_common::probe::RunContext;
use hudcheck_common::report::{format_report, SystemClock};
use hudcheck_common::{OutcomeSet, ProbeBody, ProbeDefinition, ProbeOutcome};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub async fn run(
    args: NetworkArgs,
    config: &HudcheckConfig,
    painter: &Painter,
) -> Result<RunStatus> {
    let registry = config.connectivity_registry()?;
    let previews = PreviewStore::new();
    let orchestrator = build_orchestrator(&registry, config, previews.clone())?;

    let run = run_with_spinner(
        &orchestrator,
        &RunContext::anonymous(),
        &format!("Testing {} endpoints", registry.count()),
        args.json,
    )
    .await?;
    debug!(
        previews = previews.live_count(),
        bytes = previews.live_bytes(),
        "Previews held"
    );

    let lines = describe(&run.outcomes, registry.definitions());
    let report = (args.report && run.outcomes.has_results()).then(|| {
        format_report(
            &run.outcomes,
            registry.definitions(),
            &SystemClock,
            &config.report,
        )
    });

    let saved = match &args.save_previews {
        Some(dir) => save_previews(&run.outcomes, dir)?,
        None => Vec::new(),
    };

    if args.json {
        let doc = json!({
            "probes": lines,
            "report": report,
            "saved_previews": saved,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("failed to encode JSON output")?
        );
    } else {
        print!("{}", display::render_badges(&lines, painter));
        if args.details {
            print!(
                "{}",
                display::render_endpoints(
                    &run.outcomes,
                    &failed_definitions(&run.outcomes, registry.definitions()),
                    true,
                    painter
                )
            );
        }
        println!();
        println!("{}", display::render_summary(&run.outcomes, painter));
        for path in &saved {
            println!("Saved preview {}", path.display());
        }
        if let Some(report) = report {
            println!();
            println!("{}", report);
        }
    }

    Ok(if run.outcomes.error_count() > 0 {
        RunStatus::Failed
    } else {
        RunStatus::Clean
    })
}

/// Definitions whose probe ended in an error, in registry order
fn failed_definitions(
    outcomes: &OutcomeSet,
    definitions: &[ProbeDefinition],
) -> Vec<ProbeDefinition> {
    definitions
        .iter()
        .filter(|def| outcomes.get(&def.id).is_some_and(ProbeOutcome::is_error))
        .cloned()
        .collect()
}

/// Write every image preview as `<dir>/<probe id>.<ext>`
pub fn save_previews(outcomes: &OutcomeSet, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut saved = Vec::new();
    for (id, outcome) in outcomes.iter() {
        if let ProbeOutcome::Success {
            body: ProbeBody::Preview(preview),
            ..
        } = outcome
        {
            let path = preview
                .save_to(dir, id)
                .with_context(|| format!("failed to save preview for {}", id))?;
            info!(probe = id, path = %path.display(), "Saved preview");
            saved.push(path);
        }
    }
    Ok(saved)
}
