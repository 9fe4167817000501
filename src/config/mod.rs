pub mod cli;
pub mod mtrain;
pub mod session_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "glo-stim")]
#[command(about = "Build a flash/grating stimulus session and hand it to the stimulus runner")]
pub struct CliConfig {
    /// JSON parameter file provided by mtrain
    pub params_path: Option<String>,

    #[arg(short, long, default_value = "configs/session.toml")]
    pub config: String,

    /// Override output.output_path from the session config
    #[arg(long)]
    pub output_path: Option<String>,

    /// Session ID used in the plan (default: timestamp)
    #[arg(long)]
    pub session_id: Option<String>,

    /// Build the session and show the plan without handing it off
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}
