//! Command implementations for hudcheck

pub mod key;
pub mod network;

use crate::cli::Command;
use crate::display::Painter;
use anyhow::{Context, Result};
use hudcheck_common::config::HudcheckConfig;
use hudcheck_common::preview::PreviewStore;
use hudcheck_common::probe::{
    CompletedRun, EndpointRegistry, HttpProbeExecutor, ProbeOrchestrator, RunContext,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How a command finished, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every check passed (or only warned)
    Clean,
    /// The key verdict is an error, or a probe failed
    Failed,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Failed => 1,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Run the selected subcommand
pub async fn dispatch(
    command: Command,
    config: &HudcheckConfig,
    painter: &Painter,
) -> Result<RunStatus> {
    match command {
        Command::Key(args) => key::run(args, config, painter).await,
        Command::Network(args) => network::run(args, config, painter).await,
    }
}

/// Orchestrator over `registry` backed by the HTTP executor
pub fn build_orchestrator(
    registry: &EndpointRegistry,
    config: &HudcheckConfig,
    previews: PreviewStore,
) -> Result<ProbeOrchestrator> {
    let executor = HttpProbeExecutor::new(&config.http.user_agent, previews)
        .context("failed to build HTTP client")?;
    Ok(ProbeOrchestrator::new(registry, Arc::new(executor)))
}

/// Run once with a spinner on stderr (hidden when `quiet` or not a terminal)
pub async fn run_with_spinner(
    orchestrator: &ProbeOrchestrator,
    context: &RunContext,
    message: &str,
    quiet: bool,
) -> Result<CompletedRun> {
    let spinner = if quiet || !std::io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };
    spinner.set_message(message.to_string());

    let result = orchestrator.run(context).await;
    spinner.finish_and_clear();

    let run = result?;
    if run.superseded {
        warn!(run_id = run.run_id, "Run was superseded before it finished");
    }
    Ok(run)
}
