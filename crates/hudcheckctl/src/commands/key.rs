//! `hudcheck key` - API key troubleshooter

use super::{build_orchestrator, run_with_spinner, RunStatus};
use crate::cli::KeyArgs;
use crate::display::{self, Painter};
use anyhow::{Context, Result};
use hudcheck_common::classify::classify;
use hudcheck_common::config::HudcheckConfig;
use hudcheck_common::preview::PreviewStore;
use hudcheck_common::probe::RunContext;
use hudcheck_common::Severity;
use serde_json::json;
use tracing::info;

pub async fn run(args: KeyArgs, config: &HudcheckConfig, painter: &Painter) -> Result<RunStatus> {
    let api_key = args
        .api_key
        .context("no API key given; pass it as an argument or set HUDCHECK_API_KEY")?;
    let context = RunContext::with_api_key(&api_key)?;

    let registry = config.credential_registry();
    let orchestrator = build_orchestrator(&registry, config, PreviewStore::new())?;

    let run = run_with_spinner(
        &orchestrator,
        &context,
        &format!("Checking key against {} endpoints", registry.count()),
        args.json,
    )
    .await?;

    let verdict = classify(&run.outcomes);
    info!(severity = %verdict.severity, title = %verdict.title, "Key classified");

    if args.json {
        let doc = json!({
            "checked_at": chrono::Utc::now().to_rfc3339(),
            "verdict": verdict,
            "outcomes": &*run.outcomes,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("failed to encode JSON output")?
        );
    } else {
        println!("{}", display::render_verdict(&verdict, painter));
        print!(
            "{}",
            display::render_endpoints(&run.outcomes, registry.definitions(), args.details, painter)
        );
    }

    Ok(if verdict.severity == Severity::Error {
        RunStatus::Failed
    } else {
        RunStatus::Clean
    })
}
