//! Command line definition

use clap::{Args, Parser, Subcommand};
use hudcheck_common::config::CONFIG_ENV;
use std::path::PathBuf;

// Version is embedded at build time
const VERSION: &str = env!("HUDCHECK_VERSION");

#[derive(Debug, Parser)]
#[command(name = "hudcheck")]
#[command(about = "Troubleshoot Guild Wars 2 API keys and network reachability", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check an API key against tokeninfo, account and characters
    Key(KeyArgs),

    /// Check reachability of the assets and services the addon depends on
    Network(NetworkArgs),
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// API key to test
    #[arg(env = "HUDCHECK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Show response and error bodies
    #[arg(long)]
    pub details: bool,

    /// Print the verdict and outcomes as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct NetworkArgs {
    /// Print the shareable report once results are in
    #[arg(long)]
    pub report: bool,

    /// Show error bodies for failed probes
    #[arg(long)]
    pub details: bool,

    /// Write downloaded image previews into this directory
    #[arg(long, value_name = "DIR")]
    pub save_previews: Option<PathBuf>,

    /// Print badges (and the report, if requested) as JSON
    #[arg(long)]
    pub json: bool,
}
