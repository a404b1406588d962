//! hudcheck - API key troubleshooter and network health check

use anyhow::Result;
use clap::Parser;
use hudcheck_common::config::HudcheckConfig;
use hudcheckctl::cli::Cli;
use hudcheckctl::display::Painter;
use hudcheckctl::{commands, logging};
use std::process::ExitCode;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match HudcheckConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.code(), "{}", e);
            return Err(e.into());
        }
    };
    debug!(source = ?config.source, "Configuration ready");

    let painter = Painter::detect(cli.no_color);
    let status = commands::dispatch(cli.command, &config, &painter).await?;
    Ok(status.exit_code())
}
